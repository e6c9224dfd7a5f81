use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use image::AnimationDecoder;

use crate::foundation::error::{ReelError, ReelResult};

/// GIF frames that declare no delay are shown for this long, matching common viewers.
const DEFAULT_GIF_FRAME_MS: f64 = 100.0;

/// One decoded raster frame in premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct SpriteFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    pub(crate) rgba8_premul: Arc<Vec<u8>>,
    /// Cumulative end time of this frame within the animation loop, in seconds.
    pub(crate) end_secs: f64,
}

/// A decoded image asset: a single still frame or a looping animation.
#[derive(Clone, Debug)]
pub struct Sprite {
    path: String,
    frames: Vec<SpriteFrame>,
    duration_secs: Option<f64>,
}

impl Sprite {
    /// Normalized asset path this sprite was loaded from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Return `true` for multi-frame animations.
    pub fn is_animated(&self) -> bool {
        self.duration_secs.is_some()
    }

    /// Total loop duration of an animated sprite.
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    /// Number of decoded frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Select the frame shown at animation clock `t` (seconds, wraps around the loop).
    pub fn frame_at(&self, t: f64) -> &SpriteFrame {
        let Some(total) = self.duration_secs else {
            return &self.frames[0];
        };
        let t = t.max(0.0) % total;
        self.frames
            .iter()
            .find(|f| f.end_secs > t)
            .unwrap_or(&self.frames[self.frames.len() - 1])
    }
}

pub(crate) fn decode_sprite(path: &str, bytes: &[u8]) -> ReelResult<Sprite> {
    let ext = path
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    let frames = match ext.as_str() {
        "gif" => decode_gif_frames(bytes)?,
        "svg" => vec![decode_svg_frame(bytes)?],
        _ => vec![decode_still_frame(bytes)?],
    };
    if frames.is_empty() {
        return Err(ReelError::asset(format!("image '{path}' has no frames")));
    }
    let duration_secs = if frames.len() > 1 {
        frames.last().map(|f| f.end_secs)
    } else {
        None
    };
    Ok(Sprite {
        path: path.to_owned(),
        frames,
        duration_secs,
    })
}

fn decode_still_frame(bytes: &[u8]) -> ReelResult<SpriteFrame> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut data = rgba.into_raw();
    premultiply_rgba8_in_place(&mut data);
    Ok(SpriteFrame {
        width,
        height,
        rgba8_premul: Arc::new(data),
        end_secs: f64::INFINITY,
    })
}

fn decode_gif_frames(bytes: &[u8]) -> ReelResult<Vec<SpriteFrame>> {
    let decoder =
        image::codecs::gif::GifDecoder::new(Cursor::new(bytes)).context("open gif decoder")?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .context("decode gif frames")?;

    let mut out = Vec::with_capacity(frames.len());
    let mut time_so_far = 0.0;
    for frame in frames {
        let (num, den) = frame.delay().numer_denom_ms();
        let mut ms = if den == 0 {
            0.0
        } else {
            f64::from(num) / f64::from(den)
        };
        if ms <= 0.0 {
            ms = DEFAULT_GIF_FRAME_MS;
        }
        time_so_far += ms / 1000.0;

        let rgba = frame.into_buffer();
        let (width, height) = rgba.dimensions();
        let mut data = rgba.into_raw();
        premultiply_rgba8_in_place(&mut data);
        out.push(SpriteFrame {
            width,
            height,
            rgba8_premul: Arc::new(data),
            end_secs: time_so_far,
        });
    }
    if out.len() == 1 {
        out[0].end_secs = f64::INFINITY;
    }
    Ok(out)
}

fn decode_svg_frame(bytes: &[u8]) -> ReelResult<SpriteFrame> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    let to_px = |v: f32| -> ReelResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(ReelError::asset("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    };
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ReelError::asset("failed to allocate svg pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(SpriteFrame {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
        end_secs: f64::INFINITY,
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
