use std::io;

use schoolhealth_store::StoreError;

use crate::{import::ImportError, validation::ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("export failed: {0}")]
    Export(#[from] io::Error),
    #[error("session {0} not found")]
    SessionNotFound(String),
    #[error("student {0} not found")]
    StudentNotFound(String),
    #[error("health record {0} not found")]
    RecordNotFound(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
