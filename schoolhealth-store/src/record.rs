use schoolhealth_model::HealthRecord;

use crate::{collection::Collection, connection::Store, error::Result};

pub const HEALTH_RECORDS_KEY: &str = "bmi-tracker-health-records";

#[mockall::automock]
pub trait HealthRecordRepository: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<HealthRecord>>;
    fn find(&self, id: &str) -> Result<Option<HealthRecord>>;
    fn insert(&self, record: HealthRecord) -> Result<()>;
    fn update(&self, record: HealthRecord) -> Result<()>;
    fn delete(&self, id: &str) -> Result<()>;
    fn delete_where_session(&self, session_id: &str) -> Result<usize>;
    fn delete_where_student(&self, student_id: &str) -> Result<usize>;
}

#[derive(Clone)]
pub struct HealthRecordRepositoryImpl {
    records: Collection,
}

impl HealthRecordRepositoryImpl {
    pub fn new(store: Store) -> Self {
        Self {
            records: Collection::new(store, HEALTH_RECORDS_KEY),
        }
    }
}

impl HealthRecordRepository for HealthRecordRepositoryImpl {
    fn fetch_all(&self) -> Result<Vec<HealthRecord>> {
        self.records.fetch_all()
    }

    fn find(&self, id: &str) -> Result<Option<HealthRecord>> {
        self.records.find(id)
    }

    fn insert(&self, record: HealthRecord) -> Result<()> {
        self.records.insert(record)
    }

    fn update(&self, record: HealthRecord) -> Result<()> {
        self.records.update(record)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.records.delete::<HealthRecord>(id)
    }

    fn delete_where_session(&self, session_id: &str) -> Result<usize> {
        self.records
            .delete_where(|record: &HealthRecord| record.session_id == session_id)
    }

    fn delete_where_student(&self, student_id: &str) -> Result<usize> {
        self.records
            .delete_where(|record: &HealthRecord| record.student_id == student_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use schoolhealth_model::BloodPressure;

    use super::*;

    fn record(id: &str, session_id: &str, student_id: &str) -> HealthRecord {
        HealthRecord {
            id: id.to_owned(),
            session_id: session_id.to_owned(),
            student_id: student_id.to_owned(),
            student_name: "Do Anh".to_owned(),
            student_class: Some("6C".to_owned()),
            weight: 38.5,
            height: 142.0,
            waist: Some(61.0),
            heart_rate: None,
            blood_pressure: Some(BloodPressure {
                systolic: 105,
                diastolic: 68,
            }),
            bmi: 19.1,
            z_score: None,
            bmr: Some(1289),
            photo_url: None,
            notes: None,
            date: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn cascading_deletes_by_owner() {
        let dir = tempfile::tempdir().unwrap();
        let repository = HealthRecordRepositoryImpl::new(Store::open(dir.path()).unwrap());
        repository.insert(record("r1", "s1", "a")).unwrap();
        repository.insert(record("r2", "s1", "b")).unwrap();
        repository.insert(record("r3", "s2", "a")).unwrap();
        repository.insert(record("r4", "s2", "b")).unwrap();

        assert_eq!(repository.delete_where_session("s1").unwrap(), 2);
        assert_eq!(repository.delete_where_student("a").unwrap(), 1);
        assert_eq!(repository.delete_where_student("nobody").unwrap(), 0);

        let remaining: Vec<String> = repository
            .fetch_all()
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(remaining, vec!["r4".to_owned()]);
    }

    #[test]
    fn absent_z_score_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        HealthRecordRepositoryImpl::new(store.clone())
            .insert(record("r1", "s1", "a"))
            .unwrap();

        let raw = store.get(HEALTH_RECORDS_KEY).unwrap().unwrap();
        assert!(!raw.contains("zScore"));
        assert!(raw.contains("\"bloodPressure\":{\"systolic\":105,\"diastolic\":68}"));
    }
}
