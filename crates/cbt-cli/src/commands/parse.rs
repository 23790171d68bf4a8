//! Parse command implementation

use cbt_aggregate::{AggregateRequest, PackageOperation, fingerprint, parse};
use colored::Colorize;
use serde::Serialize;

use crate::error::Result;

#[derive(Serialize)]
struct ParsedRequest<'a> {
    name: &'a str,
    fingerprint: String,
    operations: &'a [PackageOperation],
}

impl<'a> From<&'a AggregateRequest> for ParsedRequest<'a> {
    fn from(request: &'a AggregateRequest) -> Self {
        Self {
            name: request.name(),
            fingerprint: fingerprint(request.operations()),
            operations: request.operations(),
        }
    }
}

/// Run the parse command
pub fn run_parse(spec: &str, json: bool) -> Result<()> {
    let requests = parse(spec);
    let parsed: Vec<ParsedRequest<'_>> = requests.iter().map(ParsedRequest::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }

    if parsed.is_empty() {
        println!("{}", "No aggregates in spec".dimmed());
        return Ok(());
    }

    for request in &parsed {
        println!("{}.{}", request.name.cyan().bold(), request.fingerprint);
        for operation in request.operations {
            println!("  {}", operation);
        }
    }
    Ok(())
}
