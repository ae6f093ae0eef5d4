//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.

mod cleanup;

pub use cleanup::spawn_cleanup_task;
