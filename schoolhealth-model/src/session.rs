use chrono::{DateTime, NaiveDate, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A measurement round held at one school on one day.
#[cfg_attr(feature = "serde", serde_with::skip_serializing_none)]
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Session {
    pub id: String,
    pub code: String,
    pub name: String,
    pub date: NaiveDate,
    pub school: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(
        id: String,
        code: String,
        name: String,
        date: NaiveDate,
        school: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            code,
            name,
            date,
            school,
            created_at,
            updated_at: None,
        }
    }

    /// Case-insensitive substring match on name, code and school.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.code.to_lowercase().contains(&term)
            || self.school.to_lowercase().contains(&term)
    }
}
