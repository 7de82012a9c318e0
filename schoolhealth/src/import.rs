//! Student roster import from CSV exports of the class spreadsheets.

use std::io::BufRead;

use itertools::Itertools;
use log::{debug, info};
use schoolhealth_model::Gender;

use crate::validation::StudentForm;

const MAX_REPORTED_ERRORS: usize = 5;
pub const DEFAULT_ADDRESS: &str = "Not provided";

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("roster has no header row")]
    Empty,
    #[error("roster has no {0} column")]
    MissingColumn(&'static str),
    #[error("roster has no student rows")]
    NoRows,
    #[error("{} invalid row(s):\n{}", .0.len(), summarize(.0))]
    InvalidRows(Vec<RowError>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RowError {
    pub row: usize,
    pub reason: String,
}

fn summarize(errors: &[RowError]) -> String {
    let mut summary = errors
        .iter()
        .take(MAX_REPORTED_ERRORS)
        .map(|e| format!("row {}: {}", e.row, e.reason))
        .join("\n");
    if errors.len() > MAX_REPORTED_ERRORS {
        summary.push_str("\n...");
    }
    summary
}

#[derive(Debug)]
struct Columns {
    name: usize,
    class_name: usize,
    gender: usize,
    birth_year: usize,
    school: Option<usize>,
    address: Option<usize>,
}

impl Columns {
    fn find(headers: &[String]) -> Result<Self, ImportError> {
        Ok(Self {
            name: column_position(headers, &["name", "tên", "họ"])
                .ok_or(ImportError::MissingColumn("name"))?,
            class_name: column_position(headers, &["class", "lớp"])
                .ok_or(ImportError::MissingColumn("class"))?,
            gender: column_position(headers, &["gender", "sex", "giới"])
                .ok_or(ImportError::MissingColumn("gender"))?,
            birth_year: column_position(headers, &["birth", "năm", "sinh"])
                .ok_or(ImportError::MissingColumn("birth year"))?,
            school: column_position(headers, &["school", "trường"]),
            address: column_position(headers, &["address", "địa chỉ"]),
        })
    }
}

fn column_position(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.to_lowercase();
        keywords.iter().any(|keyword| header.contains(keyword))
    })
}

/// Splits one CSV line, honouring double-quoted cells with `""` escapes.
pub fn split_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            ('"', _) => quoted = !quoted,
            (',', false) => cells.push(std::mem::take(&mut cell)),
            _ => cell.push(c),
        }
    }
    cells.push(cell);
    cells.into_iter().map(|c| c.trim().to_owned()).collect()
}

/// Gender as written in the roster. "female" is tested before "male" since
/// it contains it.
pub fn parse_gender(value: &str) -> Option<Gender> {
    let value = value.trim().to_lowercase();
    if value.contains("female") || value.contains("nữ") || value == "f" {
        Some(Gender::Female)
    } else if value.contains("male") || value.contains("nam") || value == "m" {
        Some(Gender::Male)
    } else {
        None
    }
}

/// Reads a roster. Every row is checked and all problems are reported
/// together; a roster with any bad row imports nothing. Rows without a
/// school column get `default_school`.
pub fn read_roster(
    reader: impl BufRead,
    default_school: &str,
    min_birth_year: i32,
    current_year: i32,
) -> Result<Vec<StudentForm>, ImportError> {
    let mut lines = reader.lines();
    let headers = match lines.next() {
        Some(line) => split_line(line?.trim_start_matches('\u{feff}')),
        None => return Err(ImportError::Empty),
    };
    let columns = Columns::find(&headers)?;
    debug!("Roster columns: {:?}", columns);

    let mut students = Vec::new();
    let mut errors = Vec::new();
    for (index, line) in lines.enumerate() {
        let line = line?;
        let cells = split_line(&line);
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        // Header is row 1.
        let row = index + 2;
        match read_row(&cells, &columns, default_school, min_birth_year, current_year) {
            Ok(student) => students.push(student),
            Err(reason) => errors.push(RowError { row, reason }),
        }
    }

    if !errors.is_empty() {
        return Err(ImportError::InvalidRows(errors));
    }
    if students.is_empty() {
        return Err(ImportError::NoRows);
    }
    info!("Read {} students from roster", students.len());
    Ok(students)
}

fn read_row(
    cells: &[String],
    columns: &Columns,
    default_school: &str,
    min_birth_year: i32,
    current_year: i32,
) -> Result<StudentForm, String> {
    let cell = |index: usize| cells.get(index).map(String::as_str).unwrap_or("");

    let name = cell(columns.name);
    if name.is_empty() {
        return Err("missing name".to_owned());
    }
    let class_name = cell(columns.class_name);
    if class_name.is_empty() {
        return Err("missing class".to_owned());
    }
    let gender = parse_gender(cell(columns.gender))
        .ok_or_else(|| format!("unknown gender \"{}\"", cell(columns.gender)))?;
    let birth_year = cell(columns.birth_year)
        .parse::<i32>()
        .ok()
        .filter(|year| (min_birth_year..=current_year).contains(year))
        .ok_or_else(|| {
            format!(
                "birth year \"{}\" is not between {} and {}",
                cell(columns.birth_year),
                min_birth_year,
                current_year
            )
        })?;
    let school = columns
        .school
        .map(cell)
        .filter(|s| !s.is_empty())
        .unwrap_or(default_school);
    let address = columns
        .address
        .map(cell)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_ADDRESS);

    Ok(StudentForm {
        name: name.to_owned(),
        birth_year,
        class_name: class_name.to_owned(),
        school: school.to_owned(),
        address: address.to_owned(),
        gender,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_quoted_cells() {
        let test_data = [
            ("a,b,c", vec!["a", "b", "c"]),
            ("\"Nguyen, An\",1A", vec!["Nguyen, An", "1A"]),
            ("\"say \"\"hi\"\"\",x", vec!["say \"hi\"", "x"]),
            (" padded , ,", vec!["padded", "", ""]),
        ];

        for (i, (line, expected_output)) in test_data.into_iter().enumerate() {
            assert_eq!(split_line(line), expected_output, "Test case #{}", i);
        }
    }

    #[test]
    fn gender_values() {
        let test_data = [
            ("Nam", Some(Gender::Male)),
            ("Nữ", Some(Gender::Female)),
            ("female", Some(Gender::Female)),
            ("Male", Some(Gender::Male)),
            ("F", Some(Gender::Female)),
            ("", None),
            ("x", None),
        ];

        for (i, (value, expected_output)) in test_data.into_iter().enumerate() {
            assert_eq!(parse_gender(value), expected_output, "Test case #{}", i);
        }
    }

    #[test]
    fn reads_vietnamese_template() {
        let roster = "\u{feff}STT,Họ và tên,Lớp,Giới tính,Năm sinh,Địa chỉ\n\
                      1,Nguyễn Văn An,1A,Nam,2018,\"Thôn 1, Vĩnh Trường\"\n\
                      ,,,,,\n\
                      2,Trần Thị Bích,1A,Nữ,2018,\n";

        let students = read_roster(roster.as_bytes(), "TH Vinh Truong", 2000, 2024).unwrap();

        assert_eq!(students.len(), 2);
        assert_eq!(students[0].name, "Nguyễn Văn An");
        assert_eq!(students[0].gender, Gender::Male);
        assert_eq!(students[0].address, "Thôn 1, Vĩnh Trường");
        assert_eq!(students[0].school, "TH Vinh Truong");
        assert_eq!(students[1].gender, Gender::Female);
        assert_eq!(students[1].address, DEFAULT_ADDRESS);
    }

    #[test]
    fn reads_english_headers_with_school() {
        let roster = "Name,Class,Sex,Year of birth,School\nAn,2B,male,2016,Le Loi\n";

        let students = read_roster(roster.as_bytes(), "unused", 2000, 2024).unwrap();

        assert_eq!(students[0].school, "Le Loi");
        assert_eq!(students[0].birth_year, 2016);
    }

    #[test]
    fn collects_every_row_error() {
        let roster = "Name,Class,Gender,Birth year\n\
                      ,1A,male,2016\n\
                      Binh,,male,2016\n\
                      Chi,1A,unknown,2016\n\
                      Dung,1A,female,1990\n\
                      Em,1A,female,2017\n";

        match read_roster(roster.as_bytes(), "Le Loi", 2000, 2024) {
            Err(ImportError::InvalidRows(errors)) => {
                let rows: Vec<usize> = errors.iter().map(|e| e.row).collect();
                assert_eq!(rows, vec![2, 3, 4, 5]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn error_message_lists_at_most_five_rows() {
        let errors: Vec<RowError> = (2..10)
            .map(|row| RowError {
                row,
                reason: "missing name".to_owned(),
            })
            .collect();

        let message = ImportError::InvalidRows(errors).to_string();

        assert!(message.starts_with("8 invalid row(s):"));
        assert!(message.contains("row 6: missing name"));
        assert!(!message.contains("row 7:"));
        assert!(message.ends_with("..."));
    }

    #[test]
    fn missing_columns_and_empty_input() {
        assert!(matches!(
            read_roster("Name,Class\nAn,1A\n".as_bytes(), "x", 2000, 2024),
            Err(ImportError::MissingColumn("gender"))
        ));
        assert!(matches!(
            read_roster("".as_bytes(), "x", 2000, 2024),
            Err(ImportError::Empty)
        ));
        assert!(matches!(
            read_roster("Name,Class,Gender,Birth\n".as_bytes(), "x", 2000, 2024),
            Err(ImportError::NoRows)
        ));
    }
}
