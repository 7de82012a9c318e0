pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod validation;

use std::io::BufRead;

use chrono::{NaiveDate, Utc};
use itertools::Itertools;
use log::{debug, info};
use schoolhealth_growth::{Evaluator, Measurement};
use schoolhealth_model::{Gender, HealthRecord, ReportFilter, Session, Student};
use schoolhealth_store::{HealthRecordRepository, SessionRepository, StudentRepository};
use uuid::Uuid;

use crate::error::{Result, TrackerError};
use crate::export::ExportData;
use crate::validation::{MeasurementForm, SessionForm, StudentForm};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Roster search. Unset criteria match everyone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StudentQuery {
    pub name: Option<String>,
    pub class_name: Option<String>,
    pub gender: Option<Gender>,
}

impl StudentQuery {
    pub fn matches(&self, student: &Student) -> bool {
        self.name.as_ref().map_or(true, |name| {
            student.name.to_lowercase().contains(&name.to_lowercase())
        }) && self
            .class_name
            .as_ref()
            .map_or(true, |class_name| &student.class_name == class_name)
            && self.gender.map_or(true, |gender| student.gender == gender)
    }
}

/// Sessions, rosters and measurements of one installation.
pub struct Tracker {
    sessions: Box<dyn SessionRepository>,
    students: Box<dyn StudentRepository>,
    records: Box<dyn HealthRecordRepository>,
    evaluator: Evaluator<'static>,
    min_birth_year: i32,
}

impl Tracker {
    pub fn new(
        sessions: Box<dyn SessionRepository>,
        students: Box<dyn StudentRepository>,
        records: Box<dyn HealthRecordRepository>,
        evaluator: Evaluator<'static>,
        min_birth_year: i32,
    ) -> Self {
        Self {
            sessions,
            students,
            records,
            evaluator,
            min_birth_year,
        }
    }

    pub fn create_session(&self, form: SessionForm) -> Result<Session> {
        form.validate()?;
        let session = Session::new(
            new_id(),
            form.code.trim().to_owned(),
            form.name.trim().to_owned(),
            form.date,
            form.school.trim().to_owned(),
            Utc::now(),
        );
        self.sessions.insert(session.clone())?;
        info!("Created session {} ({})", session.name, session.id);
        Ok(session)
    }

    pub fn update_session(&self, id: &str, form: SessionForm) -> Result<Session> {
        form.validate()?;
        let mut session = self.session(id)?;
        session.code = form.code.trim().to_owned();
        session.name = form.name.trim().to_owned();
        session.date = form.date;
        session.school = form.school.trim().to_owned();
        session.updated_at = Some(Utc::now());
        self.sessions.update(session.clone())?;
        info!("Updated session {}", session.id);
        Ok(session)
    }

    /// Deletes the session and every record taken in it. Returns the number
    /// of records removed.
    pub fn delete_session(&self, id: &str) -> Result<usize> {
        let removed = self.records.delete_where_session(id)?;
        self.sessions.delete(id)?;
        info!("Deleted session {} and {} of its records", id, removed);
        Ok(removed)
    }

    pub fn session(&self, id: &str) -> Result<Session> {
        self.sessions
            .find(id)?
            .ok_or_else(|| TrackerError::SessionNotFound(id.to_owned()))
    }

    pub fn sessions(&self) -> Result<Vec<Session>> {
        Ok(self.sessions.fetch_all()?)
    }

    pub fn search_sessions(&self, term: &str) -> Result<Vec<Session>> {
        Ok(self
            .sessions
            .fetch_all()?
            .into_iter()
            .filter(|s| s.matches_search(term))
            .collect())
    }

    fn new_student(&self, form: StudentForm, current_year: i32) -> Result<Student> {
        form.validate(self.min_birth_year, current_year)?;
        Ok(Student {
            id: new_id(),
            name: form.name.trim().to_owned(),
            birth_year: form.birth_year,
            class_name: form.class_name.trim().to_owned(),
            school: form.school.trim().to_owned(),
            address: form.address.trim().to_owned(),
            gender: form.gender,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    pub fn add_student(&self, form: StudentForm, current_year: i32) -> Result<Student> {
        let student = self.new_student(form, current_year)?;
        self.students.insert(student.clone())?;
        info!("Added student {} ({})", student.name, student.id);
        Ok(student)
    }

    /// Adds every student or none of them.
    pub fn import_students(
        &self,
        forms: Vec<StudentForm>,
        current_year: i32,
    ) -> Result<Vec<Student>> {
        let students = forms
            .into_iter()
            .map(|form| self.new_student(form, current_year))
            .collect::<Result<Vec<_>>>()?;
        self.students.insert_many(students.clone())?;
        info!("Imported {} students", students.len());
        Ok(students)
    }

    /// Reads a CSV roster and adds all of its students.
    pub fn import_roster(
        &self,
        reader: impl BufRead,
        default_school: &str,
        current_year: i32,
    ) -> Result<Vec<Student>> {
        let forms =
            import::read_roster(reader, default_school, self.min_birth_year, current_year)?;
        self.import_students(forms, current_year)
    }

    pub fn update_student(
        &self,
        id: &str,
        form: StudentForm,
        current_year: i32,
    ) -> Result<Student> {
        form.validate(self.min_birth_year, current_year)?;
        let mut student = self.student(id)?;
        student.name = form.name.trim().to_owned();
        student.birth_year = form.birth_year;
        student.class_name = form.class_name.trim().to_owned();
        student.school = form.school.trim().to_owned();
        student.address = form.address.trim().to_owned();
        student.gender = form.gender;
        student.updated_at = Some(Utc::now());
        self.students.update(student.clone())?;
        info!("Updated student {}", student.id);
        Ok(student)
    }

    /// Deletes the student and all of their records. Returns the number of
    /// records removed.
    pub fn delete_student(&self, id: &str) -> Result<usize> {
        let removed = self.records.delete_where_student(id)?;
        self.students.delete(id)?;
        info!("Deleted student {} and {} of their records", id, removed);
        Ok(removed)
    }

    pub fn student(&self, id: &str) -> Result<Student> {
        self.students
            .find(id)?
            .ok_or_else(|| TrackerError::StudentNotFound(id.to_owned()))
    }

    pub fn students(&self) -> Result<Vec<Student>> {
        Ok(self.students.fetch_all()?)
    }

    pub fn search_students(&self, query: &StudentQuery) -> Result<Vec<Student>> {
        Ok(self
            .students
            .fetch_all()?
            .into_iter()
            .filter(|s| query.matches(s))
            .collect())
    }

    /// Distinct class names on the roster, sorted.
    pub fn classes(&self) -> Result<Vec<String>> {
        Ok(self
            .students
            .fetch_all()?
            .into_iter()
            .map(|s| s.class_name)
            .sorted()
            .dedup()
            .collect())
    }

    fn evaluated_record(
        &self,
        record: HealthRecord,
        student: &Student,
        form: &MeasurementForm,
        current_year: i32,
    ) -> Result<HealthRecord> {
        form.validate()?;
        let result = self.evaluator.evaluate(&Measurement::new(
            form.height_cm,
            form.weight_kg,
            student.birth_year,
            student.gender,
            current_year,
        ));
        debug!("Evaluated {}: {:?}", student.name, result);

        Ok(HealthRecord {
            student_name: student.name.clone(),
            student_class: Some(student.class_name.clone()),
            weight: form.weight_kg,
            height: form.height_cm,
            waist: form.waist_cm,
            heart_rate: form.heart_rate,
            blood_pressure: form.blood_pressure(),
            bmi: result.bmi,
            z_score: result.z_score,
            bmr: Some(result.bmr),
            photo_url: form.photo_url(),
            notes: form.notes(),
            ..record
        })
    }

    /// Evaluates the readings and stores them as a new record for `today`.
    pub fn record_measurement(
        &self,
        session_id: &str,
        student_id: &str,
        form: MeasurementForm,
        today: NaiveDate,
        current_year: i32,
    ) -> Result<HealthRecord> {
        let session = self.session(session_id)?;
        let student = self.student(student_id)?;
        let blank = HealthRecord {
            id: new_id(),
            session_id: session.id,
            student_id: student.id.clone(),
            student_name: String::new(),
            student_class: None,
            weight: 0.0,
            height: 0.0,
            waist: None,
            heart_rate: None,
            blood_pressure: None,
            bmi: 0.0,
            z_score: None,
            bmr: None,
            photo_url: None,
            notes: None,
            date: Some(today),
            created_at: Utc::now(),
            updated_at: None,
        };
        let record = self.evaluated_record(blank, &student, &form, current_year)?;
        self.records.insert(record.clone())?;
        info!(
            "Recorded measurement {} for {}: BMI {}, Z-score {:?}",
            record.id, student.name, record.bmi, record.z_score
        );
        Ok(record)
    }

    /// Replaces the readings of an existing record and re-derives its
    /// metrics. Id, session, date and creation time are kept.
    pub fn edit_record(
        &self,
        id: &str,
        form: MeasurementForm,
        current_year: i32,
    ) -> Result<HealthRecord> {
        let existing = self
            .records
            .find(id)?
            .ok_or_else(|| TrackerError::RecordNotFound(id.to_owned()))?;
        let student = self.student(&existing.student_id)?;
        let record = HealthRecord {
            updated_at: Some(Utc::now()),
            ..self.evaluated_record(existing, &student, &form, current_year)?
        };
        self.records.update(record.clone())?;
        info!("Updated measurement {}", record.id);
        Ok(record)
    }

    pub fn delete_record(&self, id: &str) -> Result<()> {
        self.records.delete(id)?;
        info!("Deleted measurement {}", id);
        Ok(())
    }

    pub fn records(&self, filter: &ReportFilter) -> Result<Vec<HealthRecord>> {
        let sessions = self.sessions.fetch_all()?;
        let students = self.students.fetch_all()?;
        let records = self.records.fetch_all()?;
        debug!("Filtering {} records with {:?}", records.len(), filter);

        Ok(records
            .into_iter()
            .filter(|record| {
                let school = sessions
                    .iter()
                    .find(|s| s.id == record.session_id)
                    .map(|s| s.school.as_str());
                let current_class = students
                    .iter()
                    .find(|s| s.id == record.student_id)
                    .map(|s| s.class_name.as_str());
                filter.matches(record, school, current_class)
            })
            .collect())
    }

    /// Everything an export of the filtered records needs.
    pub fn export_data(&self, filter: &ReportFilter) -> Result<ExportData> {
        Ok(ExportData {
            records: self.records(filter)?,
            students: self.students.fetch_all()?,
            sessions: self.sessions.fetch_all()?,
        })
    }
}
