//! Keyframed height remapping curve.
//!
//! Applied to normalized noise values before the height multiplier, e.g. to
//! flatten water level or exaggerate peaks. The curve is a plain owned value
//! so each worker thread evaluates its own frozen copy.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// One curve keyframe.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Piecewise-linear curve through a list of keys sorted by time.
///
/// Inputs before the first key or after the last key clamp to the end values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightCurve {
    keys: Vec<CurveKey>,
}

impl HeightCurve {
    /// Build a curve from keys; they must be finite and sorted by time.
    pub fn new(keys: Vec<CurveKey>) -> Result<Self, SettingsError> {
        let curve = Self { keys };
        curve.validate()?;
        Ok(curve)
    }

    /// The identity curve on `[0, 1]`.
    pub fn linear() -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)],
        }
    }

    /// A curve that returns `value` everywhere.
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, value)],
        }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.keys.is_empty() {
            return Err(SettingsError::EmptyCurve);
        }
        for (index, key) in self.keys.iter().enumerate() {
            let sorted = index == 0 || self.keys[index - 1].time <= key.time;
            if !key.time.is_finite() || !key.value.is_finite() || !sorted {
                return Err(SettingsError::InvalidCurveKey { index });
            }
        }
        Ok(())
    }

    /// Evaluate the curve at `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return t;
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }
        // First key strictly after t; t > first.time guarantees i >= 1.
        let i = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[i - 1];
        let b = self.keys[i];
        let span = b.time - a.time;
        if span <= 0.0 {
            return b.value;
        }
        ridge_math::lerp(a.value, b.value, (t - a.time) / span)
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_is_identity_inside_range() {
        let curve = HeightCurve::linear();
        for t in [0.0, 0.25, 0.5, 0.9, 1.0] {
            assert!((curve.evaluate(t) - t).abs() < 1e-6);
        }
    }

    #[test]
    fn test_clamps_outside_key_range() {
        let curve = HeightCurve::linear();
        assert_eq!(curve.evaluate(-3.0), 0.0);
        assert_eq!(curve.evaluate(1.7), 1.0);
    }

    #[test]
    fn test_piecewise_interpolation() {
        // Flat "water" up to 0.3, then a ramp to 1.
        let curve = HeightCurve::new(vec![
            CurveKey::new(0.0, 0.0),
            CurveKey::new(0.3, 0.0),
            CurveKey::new(1.0, 1.0),
        ])
        .unwrap();
        assert_eq!(curve.evaluate(0.1), 0.0);
        assert_eq!(curve.evaluate(0.3), 0.0);
        assert!((curve.evaluate(0.65) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_constant_curve() {
        let curve = HeightCurve::constant(0.4);
        assert_eq!(curve.evaluate(-1.0), 0.4);
        assert_eq!(curve.evaluate(5.0), 0.4);
    }

    #[test]
    fn test_rejects_unsorted_and_empty() {
        assert_eq!(HeightCurve::new(vec![]), Err(SettingsError::EmptyCurve));
        let err = HeightCurve::new(vec![CurveKey::new(0.5, 0.0), CurveKey::new(0.2, 1.0)]);
        assert_eq!(err, Err(SettingsError::InvalidCurveKey { index: 1 }));
    }
}
