//! Aggregate package engine
//!
//! Combines package directory trees into deterministic, fingerprint-named
//! aggregate directories under a shared destination root:
//!
//! - [`spec`] parses `name=dir1|dir2|!dir3;...` into [`AggregateRequest`]s
//! - [`fingerprint`] names the output directory of a request
//! - [`lock`] serializes builders of the same output across processes
//! - [`builder`] stages the merge and publishes it with a single rename
//! - [`cache`] runs a batch, skipping aggregates that already exist
//!
//! ```no_run
//! use cbt_aggregate::{AggregateBuilder, AggregateCache, MachineLockProvider, TracingSink};
//! use std::sync::Arc;
//!
//! let builder = AggregateBuilder::new(Arc::new(MachineLockProvider::default()));
//! let cache = AggregateCache::new("/build/aggregates", builder);
//! let outputs = cache.run("tools=/pkgs/a|/pkgs/b|!/pkgs/c", &TracingSink)?;
//! for output in outputs.iter() {
//!     println!("{} -> {}", output.output_id, output.output_path.display());
//! }
//! # Ok::<(), cbt_aggregate::Error>(())
//! ```

pub mod builder;
pub mod cache;
pub mod diagnostics;
pub mod error;
pub mod fingerprint;
pub mod lock;
pub mod spec;

pub use builder::{AggregateBuilder, BuildOutcome};
pub use cache::{AggregateCache, AggregateSet};
pub use diagnostics::{Diagnostic, DiagnosticSink, Importance, MemorySink, Severity, TracingSink};
pub use error::{Error, Result};
pub use fingerprint::{AggregateOutput, fingerprint};
pub use lock::{DEFAULT_LOCK_TIMEOUT, LockGuard, LockProvider, MachineLockProvider, with_lock};
pub use spec::{AggregateRequest, OperationKind, PackageOperation, ParsedEntry, SkipReason, parse};
