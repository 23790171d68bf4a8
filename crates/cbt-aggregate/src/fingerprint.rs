//! Fingerprints and output locations for aggregate requests
//!
//! A fingerprint digests the request's configuration (its ordered operation
//! list), never the files themselves. Changing a file inside a referenced
//! folder without changing the folder path reuses the old aggregate, so
//! sources are expected to carry their version in the path (e.g.
//! `packages/Foo.1.2.3`).

use crate::spec::{AggregateRequest, PackageOperation};
use cbt_fs::checksum;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 16;

/// Deterministic, case-insensitive, order-sensitive digest of `operations`.
///
/// Removes keep their `!` marker in the digested text so `a|b` and `a|!b`
/// never share an output directory.
pub fn fingerprint(operations: &[PackageOperation]) -> String {
    let joined = operations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
        .to_lowercase();

    checksum::short_digest(&joined, FINGERPRINT_LEN)
}

/// Where a request's aggregate lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateOutput {
    pub output_id: String,
    pub output_path: PathBuf,
}

impl AggregateOutput {
    /// `<root>/<name>.<fingerprint>`
    pub fn for_request(destination_root: &Path, request: &AggregateRequest) -> Self {
        let directory = format!("{}.{}", request.name(), fingerprint(request.operations()));
        Self {
            output_id: request.name().to_string(),
            output_path: destination_root.join(directory),
        }
    }
}
