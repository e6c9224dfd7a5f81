use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;

/// Writes each frame to `<dir>/frame_NNNNNN.png`.
///
/// Indices are zero-padded to six digits so lexicographic file order equals frame order. Frames
/// are stored with straight alpha.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    written: u64,
}

impl PngSequenceSink {
    /// Name of the file holding frame `idx`.
    pub fn file_name(idx: FrameIndex) -> String {
        format!("frame_{:06}.png", idx.0)
    }

    /// `ffmpeg` input pattern matching [`file_name`](Self::file_name).
    pub const PATTERN: &'static str = "frame_%06d.png";

    /// Write frames into `dir`, created on `begin` if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            last_idx: None,
            written: 0,
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Frames written since the last `begin`.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation(
                "png sink width/height must be non-zero",
            ));
        }
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create frame directory '{}'", self.dir.display())
        })?;
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::evaluation("png sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(ReelError::evaluation(
                "png sink received out-of-order frame index",
            ));
        }
        cfg.check_frame(frame)?;

        let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba())
            .ok_or_else(|| ReelError::evaluation("frame buffer does not match its dimensions"))?;
        let path = self.dir.join(Self::file_name(idx));
        img.save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write frame '{}'", path.display()))?;

        tracing::trace!(frame = idx.0, "wrote png frame");
        self.last_idx = Some(idx);
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        if self.cfg.take().is_none() {
            return Err(ReelError::evaluation("png sink not started"));
        }
        tracing::debug!(frames = self.written, dir = %self.dir.display(), "png sequence done");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
