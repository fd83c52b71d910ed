//! Easing curves for the fold animation.
//!
//! The tree advances `unfoldedness` linearly so that folding and unfolding
//! take the same time in both directions; easing is applied only when the
//! value is read for drawing.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Curve applied to linear fold progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Output equals input.
    Linear,
    /// Quadratic, slow at both ends.
    #[default]
    EaseInOut,
    /// Cubic, fast start and long settle.
    EaseOutCubic,
    /// Cubic, slow at both ends.
    EaseInOutCubic,
    /// Sinusoidal, slow at both ends.
    EaseInOutSine,
}

impl Easing {
    /// Map linear progress `t` to eased progress. `t` is clamped to `[0, 1]`
    /// and both endpoints map to themselves.
    ///
    /// ```
    /// use horizon_inspector::Easing;
    ///
    /// assert_eq!(Easing::Linear.apply(0.25), 0.25);
    /// assert!(Easing::EaseInOut.apply(0.25) < 0.25);
    /// assert_eq!(Easing::EaseOutCubic.apply(1.0), 1.0);
    /// ```
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (2.0 - 2.0 * t).powi(2) / 2.0
                }
            }
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (2.0 - 2.0 * t).powi(3) / 2.0
                }
            }
            Self::EaseInOutSine => (1.0 - (PI * t).cos()) / 2.0,
        }
    }
}
