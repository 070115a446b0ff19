//! Local execution substrate: runs solver commands as child processes.

mod error;
pub use error::ExecError;

pub mod limits;
pub use limits::RlimitConfig;

pub mod local;
pub use local::{LocalQueue, LocalQueueConfig};

mod util;
