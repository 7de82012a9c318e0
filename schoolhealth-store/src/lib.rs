pub mod collection;
pub mod connection;
pub mod error;
pub mod record;
pub mod session;
pub mod student;

pub use connection::Store;
pub use error::{Result, StoreError};
pub use record::{HealthRecordRepository, HealthRecordRepositoryImpl, MockHealthRecordRepository};
pub use session::{MockSessionRepository, SessionRepository, SessionRepositoryImpl};
pub use student::{MockStudentRepository, StudentRepository, StudentRepositoryImpl};
