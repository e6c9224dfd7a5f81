use crate::foundation::error::{ReelError, ReelResult};

/// Easing functions used to map normalized animation progress.
#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Linear interpolation (identity).
    #[default]
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
    /// Caller-supplied curve. Receives progress clamped to `[0, 1]`.
    #[serde(skip)]
    Custom(fn(f64) -> f64),
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::Custom(f) => f(t),
        }
    }

    /// Reject curves that never reach `1.0`; an eased animation using them would never finish.
    pub(crate) fn validate_terminates(self) -> ReelResult<()> {
        let end = self.apply(1.0);
        if !end.is_finite() || end < 1.0 {
            return Err(ReelError::validation(format!(
                "easing curve must reach 1.0 at t=1 (got {end})"
            )));
        }
        Ok(())
    }
}

/// Interpolate between two integer coordinates, truncating toward zero.
pub(crate) fn lerp_i32(from: i32, to: i32, t: f64) -> i32 {
    let v = f64::from(from) + (f64::from(to) - f64::from(from)) * t;
    v as i32
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
