use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Job queue is stopped")]
    Closed,

    #[error("Job queue already started")]
    AlreadyStarted,

    #[error("Invalid job queue configuration: {0}")]
    InvalidConfig(String),
}
