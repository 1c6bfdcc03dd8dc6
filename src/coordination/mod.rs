//! Task coordination

pub mod shutdown;

pub use shutdown::{Shutdown, ShutdownSignal, ShutdownToken};
