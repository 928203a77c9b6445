//! SQLx error mapping.
//!
//! | SQLx error | SQLSTATE | StoreError |
//! |------------|----------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (foreign key violation) | `23503` | `Restricted` (delete) / `MissingReference` (insert, update) |
//! | Database (other) | any | `Unavailable` |
//! | ColumnDecode / Decode | N/A | `Corrupt` |
//! | Other | N/A | `Unavailable` |

use gameshop_core::{Money, StoreError};

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation(msg),
                Some("23503") => StoreError::Restricted(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Corrupt(format!("{operation}: {err}"))
        }
        other => StoreError::Unavailable(format!("{operation}: {other}")),
    }
}

/// Mapping for statements that write a foreign key: a `23503` there means the
/// referenced row is gone, not that dependents block a delete.
pub(crate) fn map_reference_write_error(operation: &str, err: sqlx::Error) -> StoreError {
    match map_sqlx_error(operation, err) {
        StoreError::Restricted(msg) => StoreError::MissingReference(msg),
        other => other,
    }
}

pub(crate) fn money_to_db(value: Money) -> Result<i64, StoreError> {
    i64::try_from(value.minor_units())
        .map_err(|_| StoreError::Unavailable(format!("amount {value} exceeds BIGINT range")))
}

pub(crate) fn money_from_db(value: i64) -> Result<Money, StoreError> {
    u64::try_from(value)
        .map(Money::new)
        .map_err(|_| StoreError::Corrupt(format!("negative amount {value}")))
}
