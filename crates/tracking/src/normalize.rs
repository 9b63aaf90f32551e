//! Bounds-based normalization of raw metric values.

use serde::{Deserialize, Serialize};

/// Minimum and maximum of one overlay mode's color scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub minimum: f32,
    pub maximum: f32,
}

impl Bounds {
    pub const fn new(minimum: f32, maximum: f32) -> Self {
        Self { minimum, maximum }
    }

    /// Maps `value` to a fraction in `[0, 1]`.
    ///
    /// Values at or below the minimum map to 0 and values at or above the
    /// maximum map to 1. Equal bounds act as a step at the minimum. NaN maps
    /// to 0.
    pub fn normalize(&self, value: f64) -> f32 {
        let min = f64::from(self.minimum);
        let max = f64::from(self.maximum);

        if value.is_nan() || value <= min {
            if max == min && value == min {
                return 1.0;
            }
            return 0.0;
        }
        if value >= max {
            return 1.0;
        }
        ((value - min) / (max - min)) as f32
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_maps_to_zero() {
        assert_eq!(Bounds::new(0.0, 30.0).normalize(0.0), 0.0);
        assert_eq!(Bounds::new(5.0, 30.0).normalize(-3.0), 0.0);
    }

    #[test]
    fn test_maximum_maps_to_one() {
        assert_eq!(Bounds::new(0.0, 30.0).normalize(30.0), 1.0);
        assert_eq!(Bounds::new(0.0, 30.0).normalize(1000.0), 1.0);
    }

    #[test]
    fn test_linear_between_bounds() {
        let b = Bounds::new(10.0, 30.0);
        assert!((b.normalize(15.0) - 0.25).abs() < 1e-6);
        assert!((b.normalize(20.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_equal_bounds_step_at_minimum() {
        let b = Bounds::new(4.0, 4.0);
        assert_eq!(b.normalize(4.0), 1.0);
        assert_eq!(b.normalize(9.0), 1.0);
        assert_eq!(b.normalize(3.99), 0.0);
    }

    #[test]
    fn test_nan_maps_to_zero() {
        assert_eq!(Bounds::new(0.0, 1.0).normalize(f64::NAN), 0.0);
    }

    #[test]
    fn test_bounds_serde_field_names() {
        let json = serde_json::to_string(&Bounds::new(0.0, 80.0)).expect("serialize");
        assert!(json.contains("\"minimum\""), "got: {json}");
        assert!(json.contains("\"maximum\""), "got: {json}");
        let back: Bounds = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Bounds::new(0.0, 80.0));
    }
}
