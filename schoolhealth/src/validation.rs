//! Range checks on entered data. The growth evaluator accepts any number, so
//! everything a person can mistype is caught here before a record is made.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use schoolhealth_model::{BloodPressure, Gender};

pub const HEIGHT_CM: RangeInclusive<f64> = 50.0..=250.0;
pub const WEIGHT_KG: RangeInclusive<f64> = 10.0..=200.0;
pub const WAIST_CM: RangeInclusive<f64> = 30.0..=150.0;
pub const SYSTOLIC_MMHG: RangeInclusive<i32> = 80..=200;
pub const DIASTOLIC_MMHG: RangeInclusive<i32> = 40..=120;
pub const HEART_RATE_BPM: RangeInclusive<i32> = 30..=250;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

fn check_range(
    field: &'static str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

fn check_int_range(
    field: &'static str,
    value: i32,
    range: &RangeInclusive<i32>,
) -> Result<(), ValidationError> {
    check_range(
        field,
        f64::from(value),
        &(f64::from(*range.start())..=f64::from(*range.end())),
    )
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Missing { field })
    } else {
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Readings entered for one student.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeasurementForm {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub waist_cm: Option<f64>,
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
    pub heart_rate: Option<i32>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

impl MeasurementForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("height", self.height_cm, &HEIGHT_CM)?;
        check_range("weight", self.weight_kg, &WEIGHT_KG)?;
        if let Some(waist) = self.waist_cm {
            check_range("waist", waist, &WAIST_CM)?;
        }
        if let Some(systolic) = self.systolic {
            check_int_range("systolic pressure", systolic, &SYSTOLIC_MMHG)?;
        }
        if let Some(diastolic) = self.diastolic {
            check_int_range("diastolic pressure", diastolic, &DIASTOLIC_MMHG)?;
        }
        if let Some(heart_rate) = self.heart_rate {
            check_int_range("heart rate", heart_rate, &HEART_RATE_BPM)?;
        }
        Ok(())
    }

    /// Only a complete pair of readings is kept.
    pub fn blood_pressure(&self) -> Option<BloodPressure> {
        match (self.systolic, self.diastolic) {
            (Some(systolic), Some(diastolic)) => Some(BloodPressure {
                systolic,
                diastolic,
            }),
            _ => None,
        }
    }

    pub fn notes(&self) -> Option<String> {
        non_empty(&self.notes)
    }

    pub fn photo_url(&self) -> Option<String> {
        non_empty(&self.photo_url)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StudentForm {
    pub name: String,
    pub birth_year: i32,
    pub class_name: String,
    pub school: String,
    pub address: String,
    pub gender: Gender,
}

impl StudentForm {
    pub fn validate(&self, min_birth_year: i32, current_year: i32) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("class", &self.class_name)?;
        require("school", &self.school)?;
        check_int_range(
            "birth year",
            self.birth_year,
            &(min_birth_year..=current_year),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionForm {
    pub code: String,
    pub name: String,
    pub date: NaiveDate,
    pub school: String,
}

impl SessionForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("session code", &self.code)?;
        require("session name", &self.name)
    }
}
