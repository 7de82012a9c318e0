use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use schoolhealth_model::Gender;

/// Box-Cox power (L), median (M) and coefficient of variation (S) of BMI
/// for one age and gender.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LmsParameters {
    pub l: f64,
    pub m: f64,
    pub s: f64,
}

impl LmsParameters {
    pub const fn new(l: f64, m: f64, s: f64) -> Self {
        Self { l, m, s }
    }

    /// Raw (unrounded) Z-score of `value` against this reference point.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.l != 0.0 {
            ((value / self.m).powf(self.l) - 1.0) / (self.l * self.s)
        } else {
            (value / self.m).ln() / self.s
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("duplicate reference entry for age {age}, gender {gender}")]
pub struct DuplicateEntry {
    pub age: u8,
    pub gender: Gender,
}

#[derive(Debug)]
pub struct ReferenceTable {
    entries: FxHashMap<(u8, Gender), LmsParameters>,
}

/// WHO Growth Reference 2007, BMI-for-age, yearly points for 5 to 17 years.
const WHO_2007_BMI_FOR_AGE: [(u8, Gender, LmsParameters); 26] = [
    (5, Gender::Male, LmsParameters::new(-1.316, 15.3, 0.1265)),
    (6, Gender::Male, LmsParameters::new(-1.518, 15.3, 0.1301)),
    (7, Gender::Male, LmsParameters::new(-1.740, 15.4, 0.1348)),
    (8, Gender::Male, LmsParameters::new(-1.951, 15.6, 0.1405)),
    (9, Gender::Male, LmsParameters::new(-2.128, 15.9, 0.1471)),
    (10, Gender::Male, LmsParameters::new(-2.259, 16.4, 0.1544)),
    (11, Gender::Male, LmsParameters::new(-2.337, 17.0, 0.1622)),
    (12, Gender::Male, LmsParameters::new(-2.363, 17.8, 0.1701)),
    (13, Gender::Male, LmsParameters::new(-2.340, 18.7, 0.1777)),
    (14, Gender::Male, LmsParameters::new(-2.276, 19.6, 0.1847)),
    (15, Gender::Male, LmsParameters::new(-2.177, 20.4, 0.1909)),
    (16, Gender::Male, LmsParameters::new(-2.052, 21.0, 0.1961)),
    (17, Gender::Male, LmsParameters::new(-1.906, 21.6, 0.2003)),
    (5, Gender::Female, LmsParameters::new(-1.245, 15.2, 0.1284)),
    (6, Gender::Female, LmsParameters::new(-1.447, 15.2, 0.1315)),
    (7, Gender::Female, LmsParameters::new(-1.668, 15.4, 0.1356)),
    (8, Gender::Female, LmsParameters::new(-1.886, 15.6, 0.1407)),
    (9, Gender::Female, LmsParameters::new(-2.084, 16.0, 0.1468)),
    (10, Gender::Female, LmsParameters::new(-2.249, 16.5, 0.1537)),
    (11, Gender::Female, LmsParameters::new(-2.372, 17.2, 0.1613)),
    (12, Gender::Female, LmsParameters::new(-2.450, 18.0, 0.1693)),
    (13, Gender::Female, LmsParameters::new(-2.483, 18.8, 0.1774)),
    (14, Gender::Female, LmsParameters::new(-2.477, 19.6, 0.1853)),
    (15, Gender::Female, LmsParameters::new(-2.438, 20.2, 0.1927)),
    (16, Gender::Female, LmsParameters::new(-2.372, 20.7, 0.1994)),
    (17, Gender::Female, LmsParameters::new(-2.284, 21.1, 0.2054)),
];

static WHO_2007: LazyLock<ReferenceTable> = LazyLock::new(|| ReferenceTable {
    entries: WHO_2007_BMI_FOR_AGE
        .iter()
        .map(|&(age, gender, lms)| ((age, gender), lms))
        .collect(),
});

impl ReferenceTable {
    pub fn new(
        rows: impl IntoIterator<Item = (u8, Gender, LmsParameters)>,
    ) -> Result<Self, DuplicateEntry> {
        let mut entries = FxHashMap::default();
        for (age, gender, lms) in rows {
            if entries.insert((age, gender), lms).is_some() {
                return Err(DuplicateEntry { age, gender });
            }
        }
        Ok(Self { entries })
    }

    pub fn who_2007() -> &'static ReferenceTable {
        &WHO_2007
    }

    /// Entry for a completed age in years. Fractional ages are truncated;
    /// negative and non-finite ages have no entry.
    pub fn lookup(&self, age: f64, gender: Gender) -> Option<&LmsParameters> {
        let age = age.trunc();
        if !(0.0..=f64::from(u8::MAX)).contains(&age) {
            return None;
        }
        self.entries.get(&(age as u8, gender))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Gender, &LmsParameters)> {
        self.entries
            .iter()
            .map(|(&(age, gender), lms)| (age, gender, lms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn who_table_covers_5_to_17_for_both_genders() {
        let table = ReferenceTable::who_2007();
        assert_eq!(table.len(), 26);
        for age in 5..=17 {
            for gender in [Gender::Male, Gender::Female] {
                assert!(
                    table.lookup(f64::from(age), gender).is_some(),
                    "missing {} {}",
                    age,
                    gender
                );
            }
        }
    }

    #[test]
    fn who_rows_have_unique_keys() {
        assert!(ReferenceTable::new(WHO_2007_BMI_FOR_AGE).is_ok());
    }

    #[test]
    fn duplicate_rows_are_rejected() {
        let rows = [
            (5, Gender::Male, LmsParameters::new(-1.0, 15.0, 0.1)),
            (5, Gender::Female, LmsParameters::new(-1.0, 15.0, 0.1)),
            (5, Gender::Male, LmsParameters::new(-1.2, 15.1, 0.1)),
        ];
        assert_eq!(
            ReferenceTable::new(rows).unwrap_err(),
            DuplicateEntry {
                age: 5,
                gender: Gender::Male
            }
        );
    }

    #[test]
    fn lookup_truncates_fractional_ages() {
        let table = ReferenceTable::who_2007();
        assert_eq!(
            table.lookup(10.9, Gender::Male),
            Some(&LmsParameters::new(-2.259, 16.4, 0.1544))
        );
        assert_eq!(
            table.lookup(12.0, Gender::Female),
            Some(&LmsParameters::new(-2.450, 18.0, 0.1693))
        );
    }

    #[test]
    fn lookup_outside_reference_range() {
        let table = ReferenceTable::who_2007();
        for age in [4.99, 18.0, -1.0, 300.0, f64::NAN, f64::INFINITY] {
            assert_eq!(table.lookup(age, Gender::Female), None, "age {}", age);
        }
    }

    #[test]
    fn zero_lambda_uses_log_form() {
        let lms = LmsParameters::new(0.0, 16.0, 0.1);
        assert!((lms.z_score(16.0 * 0.1_f64.exp()) - 1.0).abs() < 1e-12);
        assert_eq!(lms.z_score(16.0), 0.0);
    }
}
