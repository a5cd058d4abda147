use thiserror::Error;

use crate::domain::{Amount, CatalogError, LedgerError, PaymentShortfall, StudentId};
use crate::storage::RosterError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Unknown course: {0}")]
    UnknownCourse(String),

    #[error("Student with ID {0} not found")]
    StudentNotFound(StudentId),

    #[error("Insufficient payment: required {required}, paid {paid}")]
    InsufficientPayment { required: Amount, paid: Amount },

    #[error("Student {id} is not enrolled in {course}")]
    CourseNotEnrolled { id: StudentId, course: String },

    #[error("Student is already enrolled in {0}")]
    DuplicateCourse(String),

    #[error("Could not allocate a unique student ID (last tried {0})")]
    DuplicateId(StudentId),

    #[error("Student name must not be empty")]
    InvalidName,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownCourse(name) => AppError::UnknownCourse(name),
            other => AppError::InvalidCatalog(other.to_string()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Catalog(err) => err.into(),
            LedgerError::DuplicateCourse(name) => AppError::DuplicateCourse(name),
            LedgerError::Shortfall(err) => err.into(),
            LedgerError::AmountOutOfRange => {
                AppError::InvalidAmount("Amount out of range".to_string())
            }
        }
    }
}

impl From<RosterError> for AppError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::NotFound(id) => AppError::StudentNotFound(id),
            RosterError::DuplicateId(id) => AppError::DuplicateId(id),
        }
    }
}

impl From<PaymentShortfall> for AppError {
    fn from(err: PaymentShortfall) -> Self {
        AppError::InsufficientPayment {
            required: err.required,
            paid: err.paid,
        }
    }
}
