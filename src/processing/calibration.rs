//! Soil moisture calibration: raw ADC counts to a 0 (dry) .. 1 (wet) scale
use crate::models::Calibration;

/// Convert a raw ADC value to a wetness between 0 (dry) and 1 (wet)
///
/// Readings at or below `wet` saturate at 1.0, readings at or above `dry`
/// at 0.0. `dry` and `wet` must differ; see [`Calibration::validate`].
pub fn scale_moisture(raw: f64, dry: f64, wet: f64) -> f64 {
    1.0 - ((raw - wet) / (dry - wet)).clamp(0.0, 1.0)
}

impl Calibration {
    pub fn scale(&self, raw: f64) -> f64 {
        scale_moisture(raw, self.dry, self.wet)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.dry.is_finite() || !self.wet.is_finite() {
            return Err(format!(
                "calibration points must be finite (dry={}, wet={})",
                self.dry, self.wet
            ));
        }
        if self.dry == self.wet {
            return Err(format!("dry and wet points are both {}", self.dry));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DRY: f64 = 14500.0;
    const WET: f64 = 6000.0;

    fn raw_from_scaled(scaled: f64, dry: f64, wet: f64) -> f64 {
        dry - scaled * (dry - wet)
    }

    #[test]
    fn saturates_at_calibration_points() {
        assert_eq!(scale_moisture(WET, DRY, WET), 1.0);
        assert_eq!(scale_moisture(DRY, DRY, WET), 0.0);
        assert_eq!(scale_moisture(0.0, DRY, WET), 1.0);
        assert_eq!(scale_moisture(30000.0, DRY, WET), 0.0);
    }

    #[test]
    fn midpoint_is_half() {
        let mid = (DRY + WET) / 2.0;
        assert!((scale_moisture(mid, DRY, WET) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_degenerate_pairs() {
        assert!(Calibration { dry: 1.0, wet: 1.0 }.validate().is_err());
        assert!(Calibration { dry: f64::NAN, wet: 1.0 }.validate().is_err());
        assert!(Calibration { dry: DRY, wet: WET }.validate().is_ok());
    }

    proptest! {
        #[test]
        fn wet_side_is_one(raw in -1.0e5f64..=WET) {
            prop_assert_eq!(scale_moisture(raw, DRY, WET), 1.0);
        }

        #[test]
        fn dry_side_is_zero(raw in DRY..1.0e6f64) {
            prop_assert_eq!(scale_moisture(raw, DRY, WET), 0.0);
        }

        #[test]
        fn non_increasing(a in 0.0f64..20000.0, b in 0.0f64..20000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(scale_moisture(lo, DRY, WET) >= scale_moisture(hi, DRY, WET));
        }

        #[test]
        fn inverse_recovers_raw(raw in 6000.5f64..14499.5) {
            let scaled = scale_moisture(raw, DRY, WET);
            prop_assert!(scaled > 0.0 && scaled < 1.0);
            prop_assert!((raw_from_scaled(scaled, DRY, WET) - raw).abs() < 1e-6);
        }
    }
}
