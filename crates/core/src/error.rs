//! Domain and storage error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type returned by services that touch storage.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing references, conflicts). Infrastructure concerns belong in
/// [`StoreError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Structurally invalid input, rejected before any write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation would produce a duplicate, or a delete is blocked by
    /// dependents that must be removed first.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The entity is in a state that forbids the operation (e.g. a delete
    /// where cascading is intentionally disallowed).
    #[error("state error: {0}")]
    State(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

/// Storage boundary error.
///
/// Raised by repository implementations. Constraint violations are reported
/// as distinct variants so services can translate them into domain errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A restricting foreign key blocked a delete.
    #[error("delete restricted by dependent rows: {0}")]
    Restricted(String),

    /// A write referenced a row that does not exist (anymore).
    #[error("missing referenced row: {0}")]
    MissingReference(String),

    /// The backend could not be reached or failed the statement.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Error returned by application services: either a domain failure detected
/// by the service or a storage failure propagated unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage failure: {0}")]
    Store(StoreError),
}

/// A write that lost its reference to a concurrent delete surfaces the same
/// way as a failed lookup.
impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingReference(what) => ServiceError::Domain(DomainError::NotFound(what)),
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    /// Returns the domain error, if this is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(e) => Some(e),
            ServiceError::Store(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Domain(DomainError::NotFound(_)))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Domain(DomainError::Conflict(_)))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Domain(DomainError::Validation(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_reference_becomes_not_found() {
        let err = ServiceError::from(StoreError::MissingReference("product 9".into()));
        assert!(err.is_not_found());
        assert_eq!(err.as_domain(), Some(&DomainError::NotFound("product 9".into())));
    }

    #[test]
    fn other_store_errors_stay_store_errors() {
        let err = ServiceError::from(StoreError::Restricted("sales".into()));
        assert_eq!(err, ServiceError::Store(StoreError::Restricted("sales".into())));
        assert!(err.as_domain().is_none());
    }
}
