use crate::{Classification, HealthRecord};

/// Selection of health records for listing and export. Unset criteria match
/// everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportFilter {
    pub session_id: Option<String>,
    pub school: Option<String>,
    pub class_name: Option<String>,
    pub student_id: Option<String>,
    /// Case-insensitive substring of the student name on the record.
    pub student_name: Option<String>,
    pub classification: Option<Classification>,
}

impl ReportFilter {
    pub fn for_session(session_id: &str) -> Self {
        Self {
            session_id: Some(session_id.to_owned()),
            ..Default::default()
        }
    }

    /// `school` is the school of the session the record was taken in, if
    /// that session still exists. `current_class` is the student's class on
    /// the roster, used when the record carries no class of its own.
    pub fn matches(
        &self,
        record: &HealthRecord,
        school: Option<&str>,
        current_class: Option<&str>,
    ) -> bool {
        fn accepts(criterion: &Option<String>, value: Option<&str>) -> bool {
            match criterion {
                Some(expected) => value == Some(expected.as_str()),
                None => true,
            }
        }

        accepts(&self.session_id, Some(&record.session_id))
            && accepts(&self.student_id, Some(&record.student_id))
            && accepts(
                &self.class_name,
                record.student_class.as_deref().or(current_class),
            )
            && accepts(&self.school, school)
            && self.student_name.as_deref().map_or(true, |name| {
                record
                    .student_name
                    .to_lowercase()
                    .contains(&name.to_lowercase())
            })
            && self
                .classification
                .map_or(true, |c| record.classification() == Some(c))
    }
}
