use std::fs;
use std::path::Path;

use image::{Delay, Frame, Rgba, RgbaImage};
use reelkit::{
    DialoguePage, Director, DirectorConfig, FfmpegSink, FfmpegSinkOpts, PngSequenceSink, Side,
    encode_png_sequence, is_ffmpeg_on_path,
};

fn write_png(root: &Path, rel: &str, img: &RgbaImage) -> anyhow::Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    img.save(&path)?;
    Ok(())
}

/// Two-frame "breathing" sprite; the second frame is shifted down a pixel.
fn write_gif(root: &Path, rel: &str, w: u32, h: u32, color: [u8; 4]) -> anyhow::Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = |dy: u32| {
        RgbaImage::from_fn(w, h, |x, y| {
            let inside = y >= 8 + dy && x >= w / 4 && x < w - w / 4;
            if inside { Rgba(color) } else { Rgba([0, 0, 0, 0]) }
        })
    };
    let mut enc = image::codecs::gif::GifEncoder::new(fs::File::create(&path)?);
    enc.encode_frames([0, 1].map(|dy| {
        Frame::from_parts(body(dy), 0, 0, Delay::from_numer_denom_ms(400, 1))
    }))?;
    Ok(())
}

fn write_placeholder_assets(root: &Path) -> anyhow::Result<()> {
    let bg = RgbaImage::from_fn(1290, 192, |x, y| {
        let t = (x * 255 / 1290) as u8;
        if y > 150 {
            Rgba([90, 60, 30, 255])
        } else {
            Rgba([40, 40 + t / 4, 80 + t / 3, 255])
        }
    });
    write_png(root, "bg/courtroom.png", &bg)?;

    write_gif(root, "characters/left-idle.gif", 96, 150, [40, 70, 200, 255])?;
    write_gif(root, "characters/left-talk.gif", 96, 150, [70, 110, 230, 255])?;
    write_gif(root, "characters/left-deskslam.gif", 96, 150, [20, 40, 150, 255])?;
    write_gif(root, "characters/right-idle.gif", 96, 150, [150, 30, 60, 255])?;
    write_gif(root, "characters/right-talk.gif", 96, 150, [200, 60, 90, 255])?;
    write_gif(root, "characters/right-deskslam.gif", 96, 150, [110, 20, 40, 255])?;
    write_gif(root, "exclamations/objection.gif", 256, 192, [230, 40, 30, 255])?;
    write_gif(root, "textbox/arrow.gif", 15, 15, [255, 255, 255, 255])?;

    let mainbox = RgbaImage::from_pixel(256, 64, Rgba([10, 10, 40, 210]));
    write_png(root, "textbox/mainbox.png", &mainbox)?;

    // The director only checks that clips exist; an external mixer would read them.
    for rel in [
        "music/cross-moderato.mp3",
        "sound/sfx-blipmale.wav",
        "sound/sfx-deskslam.wav",
        "sound/sfx-pichoop.wav",
        "exclamations/objection-generic.wav",
    ] {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, b"")?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let out_dir = Path::new("target/reelkit_demos/courtroom");
    let assets = out_dir.join("assets");
    write_placeholder_assets(&assets)?;

    let cfg = DirectorConfig {
        assets_root: assets.clone(),
        ..DirectorConfig::default()
    };
    let mut director = Director::new(cfg)?;

    director.start_music("cross-moderato")?;
    director.text_box(
        "Phoenix",
        [DialoguePage::builder()
            .directive("startblip", ["male"])
            .directive("sprite", ["left", "characters/left-talk.gif"])
            .text("I am going to ")
            .styled("slam the desk", ["red"])
            .directive("sprite", ["left", "characters/left-idle.gif"])
            .marker("stopblip")
            .directive("wait", ["0.5"])
            .directive("deskslam", ["left"])
            .directive("shake", ["0.3"])
            .directive("wait", ["0.8"])
            .marker("showarrow")
            .directive("wait", ["1"])
            .marker("hidearrow")
            .directive("playsound", ["pichoop"])
            .build()],
    )?;
    director.hide_text_box();
    director.pan_to(Side::Right)?;
    director.text_box(
        "Edgeworth",
        [DialoguePage::builder()
            .directive("objection", ["edgeworth"])
            .directive("wait", ["0.8"])
            .directive("startblip", ["male"])
            .directive("sprite", ["right", "characters/right-talk.gif"])
            .text("Updated ")
            .styled("autopsy report", ["green"])
            .text(".")
            .line_break()
            .text("I've got you now!")
            .directive("sprite", ["right", "characters/right-idle.gif"])
            .marker("stopblip")
            .directive("flash", ["0.15"])
            .directive("wait", ["1"])
            .build()],
    )?;
    director.hide_text_box();
    director.cut_to(Side::Left);
    director.stop_music();

    let frames_dir = out_dir.join("frames");
    let mp4 = out_dir.join("courtroom.mp4");
    let use_ffmpeg = is_ffmpeg_on_path() && std::env::args().any(|a| a == "--mp4");
    let stats = if use_ffmpeg {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&mp4));
        director.render_movie(&mut sink, -15)?
    } else {
        let mut sink = PngSequenceSink::new(&frames_dir);
        director.render_movie(&mut sink, -15)?
    };

    let audio_path = out_dir.join("audio.json");
    director.audio_log().write_json(&audio_path)?;

    if !use_ffmpeg && is_ffmpeg_on_path() {
        encode_png_sequence(&frames_dir, director.config().fps, &mp4)?;
        eprintln!("wrote {}", mp4.display());
    }
    eprintln!(
        "rendered {} frames ({:.2}s), audio log at {}",
        stats.frames,
        stats.duration_secs,
        audio_path.display()
    );
    Ok(())
}
