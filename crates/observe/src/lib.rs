//! Initialization logic for the observability of the binaries: logging
//! setup and a panic hook that keeps panics in the log stream.

pub mod panic_hook;
pub mod tracing;
