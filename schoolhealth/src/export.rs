//! CSV exports for spreadsheet users. Files start with a UTF-8 byte order
//! mark so Excel picks the right encoding for accented names.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use itertools::Itertools;
use log::info;
use schoolhealth_model::{Classification, Gender, HealthRecord, Session, Student};
use strum::IntoEnumIterator;

const BOM: &str = "\u{feff}";

const DETAIL_HEADERS: [&str; 18] = [
    "No",
    "Name",
    "Class",
    "Gender",
    "Birth year",
    "Age",
    "Height (cm)",
    "Weight (kg)",
    "BMI",
    "Z-Score",
    "WHO classification",
    "Waist (cm)",
    "Systolic",
    "Diastolic",
    "BMR (kcal/day)",
    "Notes",
    "Date",
    "Created at",
];

/// Records to export together with the rosters needed to describe them.
#[derive(Clone, Debug, Default)]
pub struct ExportData {
    pub records: Vec<HealthRecord>,
    pub students: Vec<Student>,
    pub sessions: Vec<Session>,
}

impl ExportData {
    fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub record_count: usize,
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn percent(count: usize, total: usize) -> String {
    if total == 0 {
        "0%".to_owned()
    } else {
        format!("{:.1}%", count as f64 / total as f64 * 100.0)
    }
}

fn gender_label(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "Male",
        Gender::Female => "Female",
    }
}

/// One row per record, in the order given.
pub fn detail_csv(data: &ExportData, current_year: i32) -> String {
    let rows = data.records.iter().enumerate().map(|(index, record)| {
        let student = data.student(&record.student_id);
        let class_name = record
            .student_class
            .as_deref()
            .or(student.map(|s| s.class_name.as_str()))
            .unwrap_or("");

        [
            (index + 1).to_string(),
            quote(&record.student_name),
            quote(class_name),
            optional(student.map(|s| gender_label(s.gender))),
            optional(student.map(|s| s.birth_year)),
            optional(student.map(|s| s.age_in(current_year))),
            record.height.to_string(),
            record.weight.to_string(),
            record.bmi.to_string(),
            optional(record.z_score),
            quote(&optional(record.classification())),
            optional(record.waist),
            optional(record.blood_pressure.map(|bp| bp.systolic)),
            optional(record.blood_pressure.map(|bp| bp.diastolic)),
            optional(record.bmr),
            quote(record.notes.as_deref().unwrap_or("")),
            optional(record.date),
            quote(&record.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]
        .join(",")
    });

    let content = std::iter::once(DETAIL_HEADERS.join(","))
        .chain(rows)
        .join("\n");
    format!("{}{}", BOM, content)
}

/// Counts per WHO band and per gender.
pub fn summary_csv(data: &ExportData) -> String {
    let total = data.records.len();
    let band_counts = data
        .records
        .iter()
        .filter_map(HealthRecord::classification)
        .counts();
    let unassessed = data
        .records
        .iter()
        .filter(|r| r.classification().is_none())
        .count();
    let gender_counts = data
        .records
        .iter()
        .filter_map(|r| data.student(&r.student_id).map(|s| s.gender))
        .counts();

    let mut rows = vec![
        "Indicator,Value,Percent".to_owned(),
        format!(
            "{},{},{}",
            quote("Total measurements"),
            total,
            if total > 0 { "100%" } else { "0%" }
        ),
        ",,".to_owned(),
        format!("{},,", quote("WHO Z-SCORE CLASSIFICATION")),
    ];
    for classification in Classification::iter() {
        let count = band_counts.get(&classification).copied().unwrap_or(0);
        rows.push(format!(
            "{},{},{}",
            quote(&classification.to_string()),
            count,
            percent(count, total)
        ));
    }
    rows.push(format!(
        "{},{},{}",
        quote("Not assessable"),
        unassessed,
        percent(unassessed, total)
    ));
    rows.push(",,".to_owned());
    rows.push(format!("{},,", quote("GENDER")));
    for gender in Gender::iter() {
        let count = gender_counts.get(&gender).copied().unwrap_or(0);
        rows.push(format!(
            "{},{},{}",
            quote(gender_label(gender)),
            count,
            percent(count, total)
        ));
    }

    format!("{}{}", BOM, rows.join("\n"))
}

/// Turns a user-entered name into a single path component. Separators and
/// characters Windows rejects become `_`, leading dots are dropped.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim().trim_start_matches('.').trim_start();

    if stem.is_empty() {
        "session".to_owned()
    } else {
        stem.to_owned()
    }
}

pub fn detail_filename(session: Option<&Session>, today: NaiveDate) -> String {
    match session {
        Some(session) => format!(
            "{}_{}.csv",
            file_stem(&session.name),
            today.format("%Y-%m-%d")
        ),
        None => format!("measurements_{}.csv", today.format("%Y-%m-%d")),
    }
}

pub fn summary_filename(today: NaiveDate) -> String {
    format!("summary_{}.csv", today.format("%Y-%m-%d"))
}

fn write(dir: &Path, filename: &str, content: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    fs::write(&path, content)?;
    Ok(path)
}

/// Writes the detail export into `dir`. `session` names the file when the
/// export is limited to one session.
pub fn write_detail(
    data: &ExportData,
    session: Option<&Session>,
    dir: &Path,
    today: NaiveDate,
    current_year: i32,
) -> std::io::Result<ExportReport> {
    let path = write(
        dir,
        &detail_filename(session, today),
        &detail_csv(data, current_year),
    )?;
    info!(
        "Exported {} records to {}",
        data.records.len(),
        path.display()
    );
    Ok(ExportReport {
        path,
        record_count: data.records.len(),
    })
}

pub fn write_summary(
    data: &ExportData,
    dir: &Path,
    today: NaiveDate,
) -> std::io::Result<ExportReport> {
    let path = write(dir, &summary_filename(today), &summary_csv(data))?;
    info!(
        "Exported summary of {} records to {}",
        data.records.len(),
        path.display()
    );
    Ok(ExportReport {
        path,
        record_count: data.records.len(),
    })
}
