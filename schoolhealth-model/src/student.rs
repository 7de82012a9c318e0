use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Gender;

#[cfg_attr(feature = "serde", serde_with::skip_serializing_none)]
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub birth_year: i32,
    #[cfg_attr(feature = "serde", serde(rename = "class"))]
    pub class_name: String,
    pub school: String,
    pub address: String,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Student {
    /// Age by calendar year only: everyone turns a year older on January 1st.
    pub fn age_in(&self, current_year: i32) -> i32 {
        current_year - self.birth_year
    }
}
