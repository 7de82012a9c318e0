use schoolhealth_model::Session;

use crate::{collection::Collection, connection::Store, error::Result};

pub const SESSIONS_KEY: &str = "bmi-tracker-sessions";

#[mockall::automock]
pub trait SessionRepository: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<Session>>;
    fn find(&self, id: &str) -> Result<Option<Session>>;
    fn insert(&self, session: Session) -> Result<()>;
    fn update(&self, session: Session) -> Result<()>;
    fn delete(&self, id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct SessionRepositoryImpl {
    sessions: Collection,
}

impl SessionRepositoryImpl {
    pub fn new(store: Store) -> Self {
        Self {
            sessions: Collection::new(store, SESSIONS_KEY),
        }
    }
}

impl SessionRepository for SessionRepositoryImpl {
    fn fetch_all(&self) -> Result<Vec<Session>> {
        self.sessions.fetch_all()
    }

    fn find(&self, id: &str) -> Result<Option<Session>> {
        self.sessions.find(id)
    }

    fn insert(&self, session: Session) -> Result<()> {
        self.sessions.insert(session)
    }

    fn update(&self, session: Session) -> Result<()> {
        self.sessions.update(session)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.sessions.delete::<Session>(id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::StoreError;

    fn session(id: &str, name: &str) -> Session {
        Session::new(
            id.to_owned(),
            "C-01".to_owned(),
            name.to_owned(),
            NaiveDate::from_ymd_opt(2024, 10, 2).unwrap(),
            "Le Loi".to_owned(),
            Utc::now(),
        )
    }

    #[test]
    fn insert_update_delete() {
        let dir = tempfile::tempdir().unwrap();
        let repository = SessionRepositoryImpl::new(Store::open(dir.path()).unwrap());

        repository.insert(session("s1", "Autumn")).unwrap();
        repository.insert(session("s2", "Spring")).unwrap();
        repository.update(session("s1", "Autumn, revised")).unwrap();

        assert_eq!(
            repository.find("s1").unwrap().map(|s| s.name),
            Some("Autumn, revised".to_owned())
        );

        repository.delete("s2").unwrap();
        assert_eq!(repository.fetch_all().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_and_missing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let repository = SessionRepositoryImpl::new(Store::open(dir.path()).unwrap());
        repository.insert(session("s1", "Autumn")).unwrap();

        assert!(matches!(
            repository.insert(session("s1", "Again")),
            Err(StoreError::Duplicate { .. })
        ));
        assert!(matches!(
            repository.update(session("s9", "Ghost")),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            repository.delete("s9"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn stored_document_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        SessionRepositoryImpl::new(store.clone())
            .insert(session("s1", "Autumn"))
            .unwrap();

        let raw = store.get(SESSIONS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"createdAt\""));
        assert!(raw.contains("\"date\":\"2024-10-02\""));
        assert!(!raw.contains("updatedAt"));
    }
}
