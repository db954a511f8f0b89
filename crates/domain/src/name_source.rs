use crate::DomainError;

/// A rewindable producer of query names that knows its size up front, so
/// the caller can register the full job count before scheduling.
pub trait NameSource: Send {
    fn next(&mut self) -> Option<String>;

    fn count(&self) -> u64;

    fn reset(&mut self) -> Result<(), DomainError>;

    fn close(&mut self) -> Result<(), DomainError>;
}
