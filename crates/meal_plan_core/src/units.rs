//! crates/meal_plan_core/src/units.rs
//!
//! Mass and length conversions between the canonical metric storage units and the
//! imperial display units. Imperial values are display approximations: a weight entered
//! in pounds and read back may differ by up to one pound.

use serde::Serialize;

const KG_PER_LB: f64 = 0.453592;
const CM_PER_FOOT: f64 = 30.48;
const CM_PER_INCH: f64 = 2.54;
const INCHES_PER_FOOT: u32 = 12;

pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs * KG_PER_LB
}

/// Whole pounds for display.
pub fn kg_to_lbs(kg: f64) -> i64 {
    (kg / KG_PER_LB).round() as i64
}

pub fn ft_in_to_cm(feet: f64, inches: f64) -> f64 {
    feet * CM_PER_FOOT + inches * CM_PER_INCH
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeetInches {
    pub feet: u32,
    pub inches: u32,
}

/// Converts centimeters to whole feet and rounded inches.
///
/// Total inches are rounded before the split, so the result never shows `5' 12"`.
/// Feet saturate at `u32::MAX` for heights beyond any display range.
pub fn cm_to_ft_in(cm: f64) -> FeetInches {
    let total_inches = (cm / CM_PER_INCH).max(0.0).round() as u64;
    let per_foot = u64::from(INCHES_PER_FOOT);
    FeetInches {
        feet: u32::try_from(total_inches / per_foot).unwrap_or(u32::MAX),
        inches: (total_inches % per_foot) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pounds_to_kilograms() {
        assert!((lbs_to_kg(100.0) - 45.3592).abs() < 1e-9);
        assert_eq!(lbs_to_kg(0.0), 0.0);
    }

    #[test]
    fn kilograms_to_whole_pounds() {
        assert_eq!(kg_to_lbs(80.0), 176);
        assert_eq!(kg_to_lbs(65.0), 143);
    }

    #[test]
    fn pound_round_trip_drifts_by_at_most_one() {
        let mut lbs = 80.0;
        while lbs <= 400.0 {
            let back = kg_to_lbs(lbs_to_kg(lbs)) as f64;
            assert!(
                (back - lbs).abs() <= 1.0,
                "{} lbs came back as {}",
                lbs,
                back
            );
            lbs += 0.1;
        }
    }

    #[test]
    fn whole_pounds_survive_the_round_trip() {
        for lbs in 50..=400 {
            assert_eq!(kg_to_lbs(lbs_to_kg(f64::from(lbs))), i64::from(lbs));
        }
    }

    #[test]
    fn feet_and_inches_to_centimeters() {
        assert!((ft_in_to_cm(5.0, 5.0) - 165.1).abs() < 1e-9);
        assert!((ft_in_to_cm(6.0, 0.0) - 182.88).abs() < 1e-9);
    }

    #[test]
    fn centimeters_to_feet_and_inches() {
        assert_eq!(cm_to_ft_in(180.0), FeetInches { feet: 5, inches: 11 });
        assert_eq!(cm_to_ft_in(165.0), FeetInches { feet: 5, inches: 5 });
        assert_eq!(cm_to_ft_in(0.0), FeetInches { feet: 0, inches: 0 });
    }

    #[test]
    fn twelve_inches_roll_over_into_a_foot() {
        // 182.8 cm is 71.97 in, which rounds to 72 before the split.
        assert_eq!(cm_to_ft_in(182.8), FeetInches { feet: 6, inches: 0 });
    }

    #[test]
    fn imperial_height_round_trip_is_within_half_an_inch() {
        for cm in 120..=220 {
            let FeetInches { feet, inches } = cm_to_ft_in(f64::from(cm));
            assert!(inches < 12);
            let back = ft_in_to_cm(f64::from(feet), f64::from(inches));
            assert!((back - f64::from(cm)).abs() <= CM_PER_INCH / 2.0 + 1e-9);
        }
    }

    #[test]
    fn huge_heights_saturate_instead_of_overflowing() {
        let cm = (12.0 * 4_294_967_296.0 + 11.7) * CM_PER_INCH;
        let FeetInches { feet, inches } = cm_to_ft_in(cm);
        assert_eq!(feet, u32::MAX);
        assert!(inches < INCHES_PER_FOOT);

        assert_eq!(cm_to_ft_in(f64::MAX).feet, u32::MAX);
    }
}
