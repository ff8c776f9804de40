//! Background Tasks Module
//!
//! Contains background tasks that run periodically during process operation.
//!
//! # Tasks
//! - TTL Sweep: removes expired cache entries per namespace at that
//!   namespace's configured interval

mod sweep;

pub use sweep::{spawn_sweep_task, spawn_sweep_tasks};
