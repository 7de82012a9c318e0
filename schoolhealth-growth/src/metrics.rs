use log::warn;
use schoolhealth_model::Gender;

use crate::reference::ReferenceTable;

/// Rounds half away from zero to `decimals` places. Negative zero is
/// folded into zero so it never shows up as "-0" downstream.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Body mass index, rounded to one decimal.
pub fn bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    round_to(weight_kg / (height_m * height_m), 1)
}

/// WHO BMI-for-age Z-score rounded to two decimals, or `None` when the table
/// has no entry for this age and gender.
pub fn z_score(bmi: f64, age: f64, gender: Gender) -> Option<f64> {
    z_score_in(ReferenceTable::who_2007(), bmi, age, gender)
}

pub(crate) fn z_score_in(
    table: &ReferenceTable,
    bmi: f64,
    age: f64,
    gender: Gender,
) -> Option<f64> {
    match table.lookup(age, gender) {
        Some(lms) => Some(round_to(lms.z_score(bmi), 2)),
        None => {
            warn!("No WHO reference data for age {}, gender {}", age, gender);
            None
        }
    }
}

/// Harris-Benedict basal metabolic rate in kcal/day, rounded to the nearest
/// integer. Implausible inputs are not clamped.
pub fn bmr(weight_kg: f64, height_cm: f64, age: i32, gender: Gender) -> i64 {
    let age = f64::from(age);
    let rate = if gender.is_female() {
        447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age
    } else {
        88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age
    };
    rate.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_of_exact_inputs() {
        let test_data = [
            (150.0, 45.0, 20.0),
            (145.0, 40.0, 19.0),
            (138.0, 32.5, 17.1),
            (100.0, 10.0, 10.0),
        ];

        for (i, (height, weight, expected_output)) in test_data.into_iter().enumerate() {
            assert_eq!(bmi(height, weight), expected_output, "Test case #{}", i);
        }
    }

    #[test]
    fn rounding_goes_half_away_from_zero() {
        assert_eq!(round_to(2.25, 1), 2.3);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(1342.5, 0), 1343.0);
        assert_eq!(round_to(-0.001, 2), 0.0);
        assert!(round_to(-0.001, 2).is_sign_positive());
    }

    #[test]
    fn z_score_is_zero_at_the_median() {
        for (age, gender, lms) in ReferenceTable::who_2007().iter() {
            assert_eq!(
                z_score(lms.m, f64::from(age), gender),
                Some(0.0),
                "age {}, gender {}",
                age,
                gender
            );
        }
    }

    #[test]
    fn z_score_against_reference() {
        let test_data = [
            (20.0, 10.0, Gender::Male, 1.04),
            (16.4, 10.0, Gender::Male, 0.0),
            (12.0, 10.0, Gender::Male, -2.94),
            (14.0, 5.0, Gender::Male, -0.74),
            (30.0, 12.0, Gender::Male, 1.76),
            (17.0, 11.0, Gender::Female, -0.07),
        ];

        for (i, (bmi, age, gender, expected_output)) in test_data.into_iter().enumerate() {
            assert_eq!(
                z_score(bmi, age, gender),
                Some(expected_output),
                "Test case #{}",
                i
            );
        }
    }

    #[test]
    fn z_score_absent_outside_reference_ages() {
        for age in [-3, 0, 4, 18, 25] {
            assert_eq!(z_score(18.0, f64::from(age), Gender::Male), None);
            assert_eq!(z_score(18.0, f64::from(age), Gender::Female), None);
        }
    }

    #[test]
    fn bmr_examples() {
        let test_data = [
            (45.0, 150.0, 12, Gender::Male, 1343),
            (40.0, 145.0, 11, Gender::Female, 1219),
            (0.0, 0.0, 0, Gender::Male, 88),
            (0.0, 0.0, 0, Gender::Female, 448),
        ];

        for (i, (weight, height, age, gender, expected_output)) in
            test_data.into_iter().enumerate()
        {
            assert_eq!(
                bmr(weight, height, age, gender),
                expected_output,
                "Test case #{}",
                i
            );
        }
    }

    #[test]
    fn bmr_is_not_clamped() {
        assert!(bmr(1.0, 1.0, 200, Gender::Male) < 0);
    }
}
