use schoolhealth_model::Student;

use crate::{collection::Collection, connection::Store, error::Result};

pub const STUDENTS_KEY: &str = "bmi-tracker-students";

#[mockall::automock]
pub trait StudentRepository: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<Student>>;
    fn find(&self, id: &str) -> Result<Option<Student>>;
    fn insert(&self, student: Student) -> Result<()>;
    fn insert_many(&self, students: Vec<Student>) -> Result<()>;
    fn update(&self, student: Student) -> Result<()>;
    fn delete(&self, id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct StudentRepositoryImpl {
    students: Collection,
}

impl StudentRepositoryImpl {
    pub fn new(store: Store) -> Self {
        Self {
            students: Collection::new(store, STUDENTS_KEY),
        }
    }
}

impl StudentRepository for StudentRepositoryImpl {
    fn fetch_all(&self) -> Result<Vec<Student>> {
        self.students.fetch_all()
    }

    fn find(&self, id: &str) -> Result<Option<Student>> {
        self.students.find(id)
    }

    fn insert(&self, student: Student) -> Result<()> {
        self.students.insert(student)
    }

    fn insert_many(&self, students: Vec<Student>) -> Result<()> {
        self.students.insert_many(students)
    }

    fn update(&self, student: Student) -> Result<()> {
        self.students.update(student)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.students.delete::<Student>(id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use schoolhealth_model::Gender;

    use super::*;

    fn student(id: &str) -> Student {
        Student {
            id: id.to_owned(),
            name: "Pham Lan".to_owned(),
            birth_year: 2013,
            class_name: "5A".to_owned(),
            school: "Le Loi".to_owned(),
            address: "12 Hang Bac".to_owned(),
            gender: Gender::Female,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn insert_many_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repository = StudentRepositoryImpl::new(Store::open(dir.path()).unwrap());
        repository.insert(student("a")).unwrap();

        assert!(repository
            .insert_many(vec![student("b"), student("a")])
            .is_err());
        assert_eq!(repository.fetch_all().unwrap().len(), 1);

        repository
            .insert_many(vec![student("b"), student("c")])
            .unwrap();
        assert_eq!(repository.fetch_all().unwrap().len(), 3);
    }

    #[test]
    fn reads_documents_written_by_the_browser_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store
            .set(
                STUDENTS_KEY,
                r#"[{"id":"1718000000000","name":"Vu Nam","birthYear":2014,"class":"4B",
                    "school":"Le Loi","address":"","gender":"male",
                    "createdAt":"2024-06-10T08:00:00.000Z"}]"#,
            )
            .unwrap();

        let students = StudentRepositoryImpl::new(store).fetch_all().unwrap();

        assert_eq!(students.len(), 1);
        assert_eq!(students[0].class_name, "4B");
        assert_eq!(students[0].gender, Gender::Male);
        assert_eq!(students[0].updated_at, None);
    }
}
