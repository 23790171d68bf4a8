//! Filesystem primitives for the CBT package tasks
//!
//! Provides normalized paths, atomic writes, advisory cross-process locks,
//! directory tree merging and format-agnostic config loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;
pub mod tree;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use lock::{FileLock, LockState};
pub use path::NormalizedPath;
