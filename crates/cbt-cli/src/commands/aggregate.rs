//! Aggregate command implementation

use std::sync::Arc;
use std::time::Duration;

use cbt_aggregate::{AggregateBuilder, AggregateCache, MachineLockProvider, TracingSink};
use cbt_msbuild::{PropertySet, PropertySink, PropsFile};
use colored::Colorize;

use crate::cli::AggregateArgs;
use crate::config::Settings;
use crate::error::Result;

/// Run the aggregate command
///
/// The property file is only written when every request succeeded.
pub fn run_aggregate(settings: &Settings, args: &AggregateArgs) -> Result<()> {
    let lock_dir = args.lock_dir.clone().unwrap_or_else(|| settings.lock_dir.clone());
    let lock_timeout = args
        .lock_timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| settings.lock_timeout());

    tracing::debug!(
        dest = %args.dest.display(),
        lock_dir = %lock_dir.display(),
        ?lock_timeout,
        "Resolving aggregates"
    );

    let builder = AggregateBuilder::new(Arc::new(MachineLockProvider::new(lock_dir)))
        .with_lock_timeout(lock_timeout);
    let cache = AggregateCache::new(&args.dest, builder);

    let aggregates = cache.run(&args.spec, &TracingSink)?;

    for output in aggregates.iter() {
        println!(
            "{} {}",
            format!("{}:", output.output_id).cyan(),
            output.output_path.display()
        );
    }

    if let Some(props) = &args.props {
        let properties = PropertySet::from_pairs(aggregates.properties())?;
        PropsFile::new(props.as_path()).write(&properties)?;
    }

    Ok(())
}
