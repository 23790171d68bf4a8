//! Package-props command implementation

use cbt_msbuild::{LockFileProvider, PropertySink, PropsFile, ProviderChain, package_properties};

use crate::cli::PackagePropsArgs;
use crate::config::Settings;
use crate::error::{CliError, Result};

/// Run the package-props command
pub fn run_package_props(settings: &Settings, args: &PackagePropsArgs) -> Result<()> {
    let packages_root = args
        .packages_root
        .clone()
        .or_else(|| settings.packages_root.clone())
        .or_else(LockFileProvider::default_packages_root)
        .ok_or_else(|| {
            CliError::user("Cannot determine the NuGet packages folder; pass --packages-root")
        })?;

    let packages = ProviderChain::with_builtins(packages_root).resolve(&args.project_dir)?;
    tracing::debug!(count = packages.len(), "Resolved packages");

    let properties = package_properties(&packages)?;
    PropsFile::new(args.props.as_path()).write(&properties)?;

    println!("Wrote {} properties to {}", properties.len(), args.props.display());
    Ok(())
}
