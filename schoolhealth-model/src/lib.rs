pub mod classification;
pub mod filter;
pub mod gender;
pub mod record;
pub mod session;
pub mod student;

pub use classification::Classification;
pub use filter::ReportFilter;
pub use gender::Gender;
pub use record::{BloodPressure, HealthRecord};
pub use session::Session;
pub use student::Student;
