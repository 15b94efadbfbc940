use thiserror::Error;

/// Failure taxonomy shared by every service. Validation failures are detected
/// before any write and surface unchanged; `Storage` wraps backend faults that
/// have already been rolled back.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("request is empty")]
    EmptyRequest,
    #[error("coordinates are empty")]
    EmptyCoordinates,
    #[error("zoom factor is empty")]
    EmptyZoom,
    #[error("actor is empty")]
    EmptyActor,
    #[error("coordinates are malformed")]
    IncorrectCoordinates,
    #[error("zoom factor is out of range")]
    IncorrectZoom,
    #[error("country not found")]
    NotFoundCountry,
    #[error("boundary not found")]
    NotFoundBoundary,
    #[error("boundary kind not found")]
    NotFoundBoundaryKind,
    #[error("country boundary not found")]
    NotFoundCountryBoundary,
    #[error("country is deleted")]
    DeletedCountry,
    #[error("boundary is deleted")]
    DeletedBoundary,
    #[error("boundary kind is deleted")]
    DeletedBoundaryKind,
    #[error("country boundary is deleted")]
    DeletedCountryBoundary,
    #[error("boundary is not deleted")]
    NotDeletedBoundary,
    #[error("country boundary is not deleted")]
    NotDeletedCountryBoundary,
    #[error("country boundary already exists")]
    ExistsCountryBoundary,
    #[error("coordinates are unchanged")]
    NotChangesCoordinates,
    #[error("timed out waiting for cached payload")]
    CacheTimeout,
    #[error("storage failure: {0}")]
    Storage(String),
}
