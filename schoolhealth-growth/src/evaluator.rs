use schoolhealth_model::{Classification, Gender};
use strum::{Display, EnumString};

use crate::metrics::{self, z_score_in};
use crate::reference::ReferenceTable;

/// What a Z-score becomes when the reference table has no entry for the
/// student's age and gender.
#[derive(Clone, Copy, Debug, Default, Display, EnumString, Eq, PartialEq)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MissingReferencePolicy {
    /// No Z-score and no classification.
    #[default]
    Strict,
    /// Z-score of 0, classified as Average. Matches records produced by
    /// earlier versions of the tool.
    Legacy,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age_years: i32,
    pub gender: Gender,
}

impl Measurement {
    pub fn new(
        height_cm: f64,
        weight_kg: f64,
        birth_year: i32,
        gender: Gender,
        current_year: i32,
    ) -> Self {
        Self {
            height_cm,
            weight_kg,
            age_years: current_year - birth_year,
            gender,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvaluationResult {
    pub bmi: f64,
    pub z_score: Option<f64>,
    pub bmr: i64,
    pub classification: Option<Classification>,
}

#[derive(Clone, Copy, Debug)]
pub struct Evaluator<'a> {
    table: &'a ReferenceTable,
    policy: MissingReferencePolicy,
}

impl Default for Evaluator<'static> {
    fn default() -> Self {
        Self::with_policy(MissingReferencePolicy::default())
    }
}

impl Evaluator<'static> {
    pub fn with_policy(policy: MissingReferencePolicy) -> Self {
        Self::new(ReferenceTable::who_2007(), policy)
    }
}

impl<'a> Evaluator<'a> {
    pub fn new(table: &'a ReferenceTable, policy: MissingReferencePolicy) -> Self {
        Self { table, policy }
    }

    pub fn policy(&self) -> MissingReferencePolicy {
        self.policy
    }

    pub fn z_score(&self, bmi: f64, age: f64, gender: Gender) -> Option<f64> {
        match (z_score_in(self.table, bmi, age, gender), self.policy) {
            (Some(z_score), _) => Some(z_score),
            (None, MissingReferencePolicy::Legacy) => Some(0.0),
            (None, MissingReferencePolicy::Strict) => None,
        }
    }

    pub fn evaluate(&self, measurement: &Measurement) -> EvaluationResult {
        let bmi = metrics::bmi(measurement.height_cm, measurement.weight_kg);
        let z_score = self.z_score(bmi, f64::from(measurement.age_years), measurement.gender);
        EvaluationResult {
            bmi,
            z_score,
            bmr: metrics::bmr(
                measurement.weight_kg,
                measurement.height_cm,
                measurement.age_years,
                measurement.gender,
            ),
            classification: z_score.and_then(Classification::from_z_score),
        }
    }
}

/// Evaluates one set of readings against the WHO 2007 reference, reporting
/// missing reference data as an absent Z-score.
pub fn evaluate(
    height_cm: f64,
    weight_kg: f64,
    birth_year: i32,
    gender: Gender,
    current_year: i32,
) -> EvaluationResult {
    Evaluator::default().evaluate(&Measurement::new(
        height_cm,
        weight_kg,
        birth_year,
        gender,
        current_year,
    ))
}
