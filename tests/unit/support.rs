//! Fixture helpers shared by the in-crate unit tests.

use std::io::Cursor;
use std::path::{Path, PathBuf};

pub(crate) fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "reelkit_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub(crate) fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Two-frame GIF, 100 ms per frame.
pub(crate) fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
    use image::{Delay, Frame};

    let mut buf = Vec::new();
    {
        let mut enc = image::codecs::gif::GifEncoder::new(&mut buf);
        let frames = [[255u8, 0, 0, 255], [0u8, 0, 255, 255]].map(|c| {
            Frame::from_parts(
                image::RgbaImage::from_pixel(width, height, image::Rgba(c)),
                0,
                0,
                Delay::from_numer_denom_ms(100, 1),
            )
        });
        enc.encode_frames(frames).unwrap();
    }
    buf
}

pub(crate) fn write_file(root: &Path, rel: &str, bytes: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

pub(crate) fn write_png(root: &Path, rel: &str, width: u32, height: u32, rgba: [u8; 4]) {
    write_file(root, rel, &png_bytes(width, height, rgba));
}

/// Default stage art plus the clips the director tests reference. Audio files are placeholders;
/// only their existence is checked.
pub(crate) fn write_stage(root: &Path) {
    write_png(root, "bg/courtroom.png", 64, 24, [40, 40, 90, 255]);
    for rel in [
        "characters/left-idle.gif",
        "characters/right-idle.gif",
        "characters/left-deskslam.gif",
        "characters/right-deskslam.gif",
        "characters/left-talk.gif",
        "textbox/arrow.gif",
        "exclamations/objection.gif",
        "exclamations/holdit.gif",
    ] {
        write_file(root, rel, &gif_bytes(4, 4));
    }
    write_png(root, "textbox/mainbox.png", 32, 8, [0, 0, 0, 200]);
    for rel in [
        "sound/sfx-blipmale.wav",
        "sound/sfx-pichoop.wav",
        "sound/sfx-deskslam.wav",
        "music/theme.mp3",
        "exclamations/objection-generic.wav",
    ] {
        write_file(root, rel, b"RIFF");
    }
}
