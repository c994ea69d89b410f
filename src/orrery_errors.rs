use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrreryError {
    #[error("Unknown body: {0}")]
    UnknownBody(String),

    #[error("Body already registered in the catalog: {0}")]
    DuplicateBody(String),

    #[error("Invalid orbital elements: {0}")]
    InvalidOrbitalElements(String),

    #[error("Invalid parent for body: {0}")]
    InvalidParent(String),

    #[error("Invalid search parameters: {0}")]
    InvalidSearchParams(String),

    #[error("Invalid clock parameters: {0}")]
    InvalidClockParams(String),

    #[error("Invalid search targets: {0}")]
    InvalidSearchTargets(String),

    #[error("A search is already running; stop it before starting a new one")]
    SearchAlreadyActive,

    #[error("No search is currently active")]
    NoActiveSearch,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
