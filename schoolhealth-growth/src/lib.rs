//! Growth metrics for school-age children: BMI, WHO 2007 BMI-for-age
//! Z-scores, basal metabolic rate and the SD band a Z-score falls in.
//!
//! Every function here is pure. The reference table is built once and never
//! mutated, so evaluators can be shared freely.

pub mod evaluator;
pub mod metrics;
pub mod reference;

pub use evaluator::{evaluate, EvaluationResult, Evaluator, Measurement, MissingReferencePolicy};
pub use metrics::{bmi, bmr, z_score};
pub use reference::{LmsParameters, ReferenceTable};
pub use schoolhealth_model::{Classification, Gender};
