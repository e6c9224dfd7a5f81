use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::dialogue::directive::Side;
use crate::dialogue::interpreter::InterpreterConfig;
use crate::foundation::core::{Canvas, Fps, Rgba8, ensure_positive};
use crate::foundation::error::{ReelError, ReelResult};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Everything a [`Director`](crate::Director) needs besides the script itself.
///
/// Every field has a default, so a JSON config only lists what it overrides:
///
/// ```
/// let cfg = reelkit::DirectorConfig::from_json_str(r#"{ "chars_per_second": 45 }"#).unwrap();
/// assert_eq!(cfg.canvas.width, 256);
/// ```
pub struct DirectorConfig {
    /// Output canvas.
    pub canvas: Canvas,
    /// Fixed frame rate of the render loop.
    pub fps: Fps,
    /// Typewriter speed.
    pub chars_per_second: f64,
    /// Hold after a page is fully revealed.
    pub post_reveal_hold_secs: f64,
    /// Duration of eased camera pans.
    pub pan_secs: f64,
    /// Background x when the camera is on the left stand.
    pub left_x: i32,
    /// Background x when the camera is on the right stand.
    pub right_x: i32,
    /// Silence between voice-blip repetitions.
    pub blip_loop_delay_secs: f64,
    /// Text color per markup tag.
    pub palette: BTreeMap<String, Rgba8>,
    /// Directory every asset path is resolved against.
    pub assets_root: PathBuf,
    /// How long an exclamation bubble stays up.
    pub exclamation_secs: f64,
    /// How long a desk-slam sprite shows before reverting.
    pub desk_slam_secs: f64,
    /// Upper bound on rendered frames; a script still running past it is an error.
    pub max_frames: u64,
    /// Stage art and fonts.
    pub stage: StageConfig,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        let palette = [
            ("red", Rgba8::rgb(247, 56, 41)),
            ("green", Rgba8::rgb(0, 240, 0)),
            ("blue", Rgba8::rgb(107, 198, 247)),
            ("orange", Rgba8::rgb(247, 115, 57)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            chars_per_second: 30.0,
            post_reveal_hold_secs: 1.0,
            pan_secs: 1.0,
            left_x: 0,
            right_x: -1034,
            blip_loop_delay_secs: 0.06,
            palette,
            assets_root: PathBuf::from("assets"),
            exclamation_secs: 0.7,
            desk_slam_secs: 0.8,
            max_frames: 18_000,
            stage: StageConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Asset paths (relative to `assets_root`) and layout of the fixed cast.
pub struct StageConfig {
    /// Panorama behind both stands.
    pub background: String,
    /// Initial sprite of the left stand.
    pub left_sprite: String,
    /// Initial sprite of the right stand.
    pub right_sprite: String,
    /// Desk-slam sprite of the left stand.
    pub left_slam_sprite: String,
    /// Desk-slam sprite of the right stand.
    pub right_slam_sprite: String,
    /// Right stand x offset inside the background.
    pub right_stand_x: i32,
    /// Dialogue box frame.
    pub dialogue_box: String,
    /// Dialogue box y on the canvas.
    pub dialogue_box_y: i32,
    /// "Continue" arrow.
    pub arrow: String,
    /// Dialogue font; text is not drawn without one.
    pub font: Option<String>,
    /// Nametag font; falls back to `font`.
    pub name_font: Option<String>,
    /// Dialogue font size in pixels.
    pub text_size_px: f32,
    /// Nametag font size in pixels.
    pub name_size_px: f32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            background: "bg/courtroom.png".to_owned(),
            left_sprite: "characters/left-idle.gif".to_owned(),
            right_sprite: "characters/right-idle.gif".to_owned(),
            left_slam_sprite: "characters/left-deskslam.gif".to_owned(),
            right_slam_sprite: "characters/right-deskslam.gif".to_owned(),
            right_stand_x: 1034,
            dialogue_box: "textbox/mainbox.png".to_owned(),
            dialogue_box_y: 128,
            arrow: "textbox/arrow.gif".to_owned(),
            font: None,
            name_font: None,
            text_size_px: 16.0,
            name_size_px: 8.0,
        }
    }
}

impl DirectorConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| ReelError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject out-of-domain values.
    pub fn validate(&self) -> ReelResult<()> {
        self.canvas.validate()?;
        self.fps.validate()?;
        self.interpreter().validate()?;
        ensure_positive("pan_secs", self.pan_secs)?;
        ensure_positive("exclamation_secs", self.exclamation_secs)?;
        ensure_positive("desk_slam_secs", self.desk_slam_secs)?;
        if !self.blip_loop_delay_secs.is_finite() || self.blip_loop_delay_secs < 0.0 {
            return Err(ReelError::validation(format!(
                "blip_loop_delay_secs must be finite and >= 0 (got {})",
                self.blip_loop_delay_secs
            )));
        }
        if self.max_frames == 0 {
            return Err(ReelError::validation("max_frames must be > 0"));
        }
        for size in [self.stage.text_size_px, self.stage.name_size_px] {
            ensure_positive("font size", f64::from(size))?;
        }
        Ok(())
    }

    /// Reveal pacing handed to the dialogue interpreter.
    pub fn interpreter(&self) -> InterpreterConfig {
        InterpreterConfig {
            chars_per_second: self.chars_per_second,
            post_reveal_hold_secs: self.post_reveal_hold_secs,
        }
    }

    /// Camera stop for `side`.
    pub fn camera_x(&self, side: Side) -> i32 {
        match side {
            Side::Left => self.left_x,
            Side::Right => self.right_x,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/director/config.rs"]
mod tests;
