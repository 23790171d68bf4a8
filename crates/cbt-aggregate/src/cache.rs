//! Batch resolution of aggregate requests
//!
//! Every request in a batch is attempted so all failures surface together,
//! but a batch with any failure yields no mapping at all: a partial set of
//! properties would look complete to later build stages.

use crate::builder::{AggregateBuilder, BuildOutcome};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Importance};
use crate::fingerprint::AggregateOutput;
use crate::spec::{self, AggregateRequest, ParsedEntry};
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Aggregates produced by a successful batch, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateSet {
    outputs: Vec<AggregateOutput>,
}

impl AggregateSet {
    pub fn get(&self, output_id: &str) -> Option<&AggregateOutput> {
        self.outputs.iter().find(|o| o.output_id == output_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregateOutput> {
        self.outputs.iter()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// `(output_id, output_path)` pairs for a property file.
    pub fn properties(&self) -> Vec<(String, String)> {
        self.outputs
            .iter()
            .map(|o| (o.output_id.clone(), o.output_path.display().to_string()))
            .collect()
    }
}

impl IntoIterator for AggregateSet {
    type Item = AggregateOutput;
    type IntoIter = std::vec::IntoIter<AggregateOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.outputs.into_iter()
    }
}

/// Resolves requests to aggregate directories under one destination root
#[derive(Debug, Clone)]
pub struct AggregateCache {
    destination_root: PathBuf,
    builder: AggregateBuilder,
}

impl AggregateCache {
    pub fn new(destination_root: impl Into<PathBuf>, builder: AggregateBuilder) -> Self {
        Self {
            destination_root: destination_root.into(),
            builder,
        }
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Parse `spec` and resolve every request in it.
    ///
    /// Malformed entries are reported as low-importance messages. Each
    /// failed request produces one error naming the request and `spec`.
    pub fn run(&self, spec: &str, sink: &dyn DiagnosticSink) -> Result<AggregateSet> {
        let mut requests = Vec::new();
        for entry in spec::parse_entries(spec) {
            match entry {
                ParsedEntry::Request(request) => requests.push(request),
                ParsedEntry::Skipped { entry, reason } => sink.emit(Diagnostic::message(
                    Importance::Low,
                    format!("Ignoring aggregate entry '{}': {}", entry, reason),
                )),
            }
        }
        self.resolve_batch(&requests, sink, Some(spec))
    }

    /// Build (or reuse) the aggregate of every request.
    ///
    /// Duplicate names are warned about; the first request with a name
    /// wins. Requests without a name or without operations are skipped with
    /// a warning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BatchFailed`] if any request failed, after all of
    /// them were attempted.
    pub fn resolve(&self, requests: &[AggregateRequest], sink: &dyn DiagnosticSink) -> Result<AggregateSet> {
        self.resolve_batch(requests, sink, None)
    }

    fn resolve_batch(
        &self,
        requests: &[AggregateRequest],
        sink: &dyn DiagnosticSink,
        spec: Option<&str>,
    ) -> Result<AggregateSet> {
        let root = cbt_fs::tree::ensure_canonical_dir(&self.destination_root).map_err(|e| {
            sink.emit(Diagnostic::error(format!(
                "Cannot use aggregate destination '{}': {}",
                self.destination_root.display(),
                e
            )));
            Error::Fs(e)
        })?;

        let mut seen = HashSet::new();
        let mut outputs = Vec::new();
        let mut failed = 0;

        for request in requests {
            if !seen.insert(request.name()) {
                sink.emit(Diagnostic::warning(format!(
                    "Aggregate '{}' is defined more than once; using the first definition",
                    request.name()
                )));
                continue;
            }
            if request.name().is_empty() {
                sink.emit(Diagnostic::warning(
                    "Aggregate with an empty name cannot be referenced; skipping",
                ));
                continue;
            }
            if request.operations().is_empty() {
                sink.emit(Diagnostic::warning(format!(
                    "Aggregate '{}' lists no package folders; skipping",
                    request.name()
                )));
                continue;
            }

            let output = AggregateOutput::for_request(&root, request);
            match self.builder.build(request, &output.output_path) {
                Ok(outcome) => {
                    let verb = match outcome {
                        BuildOutcome::Built => "Created",
                        BuildOutcome::AlreadyPresent => "Reusing",
                    };
                    sink.emit(Diagnostic::message(
                        Importance::Normal,
                        format!("{} aggregate '{}' at {}", verb, request.name(), output.output_path.display()),
                    ));
                    outputs.push(output);
                }
                Err(e) => {
                    failed += 1;
                    let origin = spec
                        .map(|s| format!(" (from '{}')", s))
                        .unwrap_or_default();
                    sink.emit(Diagnostic::error(format!(
                        "Failed to create aggregate '{}'{}: {}",
                        request.name(),
                        origin,
                        e
                    )));
                }
            }
        }

        if failed > 0 {
            return Err(Error::BatchFailed {
                failed,
                total: seen.len(),
            });
        }
        Ok(AggregateSet { outputs })
    }
}
