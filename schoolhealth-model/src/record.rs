use chrono::{DateTime, NaiveDate, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Classification;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BloodPressure {
    pub systolic: i32,
    pub diastolic: i32,
}

/// One student's readings taken during one session, with the derived metrics.
#[cfg_attr(feature = "serde", serde_with::skip_serializing_none)]
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct HealthRecord {
    pub id: String,
    pub session_id: String,
    pub student_id: String,
    pub student_name: String,
    pub student_class: Option<String>,

    pub weight: f64,
    pub height: f64,
    pub waist: Option<f64>,
    pub heart_rate: Option<i32>,
    pub blood_pressure: Option<BloodPressure>,
    pub bmi: f64,
    pub z_score: Option<f64>,
    pub bmr: Option<i64>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    pub date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl HealthRecord {
    pub fn classification(&self) -> Option<Classification> {
        self.z_score.and_then(Classification::from_z_score)
    }
}
