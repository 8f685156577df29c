//! Shared Diesel error classification.
//!
//! Every repository maps failures onto its port error through
//! [`classify`], so unique-key violations, lost connections, and ordinary
//! query failures are told apart the same way everywhere.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::models::RowDecodeError;
use super::pool::PoolError;

/// Coarse category of a persistence failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Failure {
    Connection(String),
    Query(String),
    /// A unique constraint rejected the write; carries the constraint name.
    Duplicate(String),
}

pub(crate) fn classify(error: DieselError) -> Failure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Failure::Duplicate(info.constraint_name().unwrap_or("unique key").to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            Failure::Connection("database connection error".to_owned())
        }
        DieselError::NotFound => Failure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => Failure::Query("database query error".to_owned()),
        _ => Failure::Query("database error".to_owned()),
    }
}

pub(crate) fn pool_failure(error: PoolError) -> Failure {
    Failure::Connection(error.message().to_owned())
}

pub(crate) fn decode_failure(error: RowDecodeError) -> Failure {
    Failure::Query(error.to_string())
}

/// Error type for transactions that decode rows before writing back.
#[derive(Debug)]
pub(crate) enum TxError {
    Diesel(DieselError),
    Decode(RowDecodeError),
}

impl From<DieselError> for TxError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl From<RowDecodeError> for TxError {
    fn from(error: RowDecodeError) -> Self {
        Self::Decode(error)
    }
}

impl From<TxError> for Failure {
    fn from(error: TxError) -> Self {
        match error {
            TxError::Diesel(error) => classify(error),
            TxError::Decode(error) => decode_failure(error),
        }
    }
}

/// Implement `From<Failure>` for a port error.
///
/// Ports without a `Duplicate` variant report unique violations as query
/// failures.
macro_rules! impl_from_failure {
    ($error:ident, duplicate) => {
        impl From<$crate::outbound::persistence::error_mapping::Failure> for $error {
            fn from(failure: $crate::outbound::persistence::error_mapping::Failure) -> Self {
                use $crate::outbound::persistence::error_mapping::Failure;
                match failure {
                    Failure::Connection(message) => Self::connection(message),
                    Failure::Query(message) => Self::query(message),
                    Failure::Duplicate(constraint) => Self::duplicate(constraint),
                }
            }
        }
    };
    ($error:ident) => {
        impl From<$crate::outbound::persistence::error_mapping::Failure> for $error {
            fn from(failure: $crate::outbound::persistence::error_mapping::Failure) -> Self {
                use $crate::outbound::persistence::error_mapping::Failure;
                match failure {
                    Failure::Connection(message) => Self::connection(message),
                    Failure::Query(message) => Self::query(message),
                    Failure::Duplicate(constraint) => {
                        Self::query(format!("unexpected duplicate on {constraint}"))
                    }
                }
            }
        }
    };
}

pub(crate) use impl_from_failure;
