#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// WHO BMI-for-age band, ordered from the lowest to the highest Z-score.
#[derive(
    Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Classification {
    #[strum(to_string = "-3SD")]
    #[cfg_attr(feature = "serde", serde(rename = "-3SD"))]
    MinusThreeSd,
    #[strum(to_string = "-2SD")]
    #[cfg_attr(feature = "serde", serde(rename = "-2SD"))]
    MinusTwoSd,
    #[strum(to_string = "-1SD")]
    #[cfg_attr(feature = "serde", serde(rename = "-1SD"))]
    MinusOneSd,
    #[strum(to_string = "Average")]
    #[cfg_attr(feature = "serde", serde(rename = "Average"))]
    Average,
    #[strum(to_string = "+1SD")]
    #[cfg_attr(feature = "serde", serde(rename = "+1SD"))]
    PlusOneSd,
    #[strum(to_string = "+2SD")]
    #[cfg_attr(feature = "serde", serde(rename = "+2SD"))]
    PlusTwoSd,
    #[strum(to_string = "+3SD")]
    #[cfg_attr(feature = "serde", serde(rename = "+3SD"))]
    PlusThreeSd,
}

impl Classification {
    /// Band of a Z-score. The bands below the median are closed at their
    /// lower bound, the ones above it are closed at their upper bound, so
    /// -3.00 falls in -2SD while 1.00 is still Average.
    ///
    /// NaN cannot be placed on the line and yields `None`. Infinities land
    /// in the outermost bands.
    pub fn from_z_score(z_score: f64) -> Option<Self> {
        if z_score.is_nan() {
            None
        } else if z_score < -3.0 {
            Some(Classification::MinusThreeSd)
        } else if z_score < -2.0 {
            Some(Classification::MinusTwoSd)
        } else if z_score < -1.0 {
            Some(Classification::MinusOneSd)
        } else if z_score <= 1.0 {
            Some(Classification::Average)
        } else if z_score <= 2.0 {
            Some(Classification::PlusOneSd)
        } else if z_score <= 3.0 {
            Some(Classification::PlusTwoSd)
        } else {
            Some(Classification::PlusThreeSd)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn band_boundaries() {
        let test_data = [
            (-3.01, Classification::MinusThreeSd),
            (-3.00, Classification::MinusTwoSd),
            (-2.01, Classification::MinusTwoSd),
            (-2.00, Classification::MinusOneSd),
            (-1.01, Classification::MinusOneSd),
            (-1.00, Classification::Average),
            (0.00, Classification::Average),
            (1.00, Classification::Average),
            (1.01, Classification::PlusOneSd),
            (2.00, Classification::PlusOneSd),
            (2.01, Classification::PlusTwoSd),
            (3.00, Classification::PlusTwoSd),
            (3.01, Classification::PlusThreeSd),
        ];

        for (i, (z_score, expected_output)) in test_data.into_iter().enumerate() {
            assert_eq!(
                Classification::from_z_score(z_score),
                Some(expected_output),
                "Test case #{}",
                i
            );
        }
    }

    #[test]
    fn non_finite_z_scores() {
        assert_eq!(Classification::from_z_score(f64::NAN), None);
        assert_eq!(
            Classification::from_z_score(f64::NEG_INFINITY),
            Some(Classification::MinusThreeSd)
        );
        assert_eq!(
            Classification::from_z_score(f64::INFINITY),
            Some(Classification::PlusThreeSd)
        );
    }

    #[test]
    fn labels_round_trip_in_band_order() {
        let labels: Vec<String> = Classification::iter().map(|c| c.to_string()).collect();
        assert_eq!(
            labels,
            ["-3SD", "-2SD", "-1SD", "Average", "+1SD", "+2SD", "+3SD"]
        );
        for classification in Classification::iter() {
            assert_eq!(
                Classification::from_str(&classification.to_string()),
                Ok(classification)
            );
        }
    }
}
