pub mod error;
pub mod handle;
pub mod processor;
pub mod progress;
pub mod queue;

pub use error::QueueError;
pub use handle::JobHandle;
pub use processor::{Processor, Step};
pub use progress::{ProgressReporter, QueueStats, StatsSource};
pub use queue::JobQueue;
