#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Gender {
    #[strum(to_string = "male", serialize = "m")]
    Male,
    #[strum(to_string = "female", serialize = "f")]
    Female,
}

impl Gender {
    pub fn is_female(&self) -> bool {
        matches!(self, Gender::Female)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        let test_data = [
            ("male", Gender::Male),
            ("Male", Gender::Male),
            ("M", Gender::Male),
            ("female", Gender::Female),
            ("FEMALE", Gender::Female),
            ("f", Gender::Female),
        ];

        for (i, (input, expected_output)) in test_data.into_iter().enumerate() {
            assert_eq!(
                Gender::from_str(input),
                Ok(expected_output),
                "Test case #{}",
                i
            );
        }
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(Gender::from_str("other").is_err());
        assert!(Gender::from_str("").is_err());
    }

    #[test]
    fn displays_lowercase_label() {
        assert_eq!(Gender::Male.to_string(), "male");
        assert_eq!(Gender::Female.to_string(), "female");
    }
}
