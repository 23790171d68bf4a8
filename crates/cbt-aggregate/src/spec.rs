//! Aggregate specification parsing
//!
//! Grammar: `name=dir|dir|!dir;name2=dir`. Entries are separated by `;`,
//! only the first `=` splits the name from its options, options are
//! separated by `|` and a leading `!` marks a directory whose contents are
//! removed instead of added. Parsing never fails; malformed entries are
//! reported as [`ParsedEntry::Skipped`] and dropped by [`parse`].

use serde::Serialize;
use std::fmt;

const ENTRY_SEPARATOR: char = ';';
const NAME_SEPARATOR: char = '=';
const OPTION_SEPARATOR: char = '|';
const REMOVE_MARKER: char = '!';

/// Whether an operation adds or removes a directory's contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Add,
    Remove,
}

/// One step of an aggregate: copy in, or strip out, a source directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageOperation {
    pub kind: OperationKind,
    pub source_path: String,
}

impl PackageOperation {
    pub fn add(source_path: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Add,
            source_path: source_path.into(),
        }
    }

    pub fn remove(source_path: impl Into<String>) -> Self {
        Self {
            kind: OperationKind::Remove,
            source_path: source_path.into(),
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        let op = match token.strip_prefix(REMOVE_MARKER) {
            Some(rest) => Self::remove(rest.trim()),
            None => Self::add(token),
        };
        (!op.source_path.is_empty()).then_some(op)
    }
}

/// Formats the operation the way it is written in a spec (`dir` or `!dir`).
impl fmt::Display for PackageOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OperationKind::Add => write!(f, "{}", self.source_path),
            OperationKind::Remove => write!(f, "{}{}", REMOVE_MARKER, self.source_path),
        }
    }
}

/// A named aggregate and the ordered operations that compose it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRequest {
    name: String,
    operations: Vec<PackageOperation>,
}

impl AggregateRequest {
    pub fn new(name: impl Into<String>, operations: Vec<PackageOperation>) -> Self {
        Self {
            name: name.into(),
            operations,
        }
    }

    /// Output identifier; becomes the property name handed to the build.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operations(&self) -> &[PackageOperation] {
        &self.operations
    }
}

/// Why an entry was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `=` in the entry
    MissingSeparator,
    /// Nothing at all after the `=`
    EmptyOptions,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MissingSeparator => "missing '='",
            Self::EmptyOptions => "no package folders",
        };
        f.write_str(text)
    }
}

/// Result of parsing a single `;`-separated entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEntry<'a> {
    Request(AggregateRequest),
    Skipped { entry: &'a str, reason: SkipReason },
}

/// Parse every non-blank entry, keeping skipped ones so callers can report
/// them.
pub fn parse_entries(spec: &str) -> Vec<ParsedEntry<'_>> {
    spec.split(ENTRY_SEPARATOR)
        .filter(|entry| !entry.trim().is_empty())
        .map(parse_entry)
        .collect()
}

/// Parse a spec into requests, silently dropping malformed entries.
///
/// Duplicate names are kept here; the batch runner warns about them and
/// uses the first.
pub fn parse(spec: &str) -> Vec<AggregateRequest> {
    parse_entries(spec)
        .into_iter()
        .filter_map(|entry| match entry {
            ParsedEntry::Request(request) => Some(request),
            ParsedEntry::Skipped { .. } => None,
        })
        .collect()
}

fn parse_entry(entry: &str) -> ParsedEntry<'_> {
    let skipped = |reason| ParsedEntry::Skipped {
        entry: entry.trim(),
        reason,
    };

    let Some((name, options)) = entry.split_once(NAME_SEPARATOR) else {
        return skipped(SkipReason::MissingSeparator);
    };
    // Whitespace-only options still make a (zero-operation) request
    if options.is_empty() {
        return skipped(SkipReason::EmptyOptions);
    }

    let operations = options
        .split(OPTION_SEPARATOR)
        .filter_map(PackageOperation::from_token)
        .collect();

    ParsedEntry::Request(AggregateRequest::new(name.trim(), operations))
}
