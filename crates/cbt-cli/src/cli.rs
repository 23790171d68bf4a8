//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Compose package directories into shared, content-addressed aggregates
#[derive(Parser, Debug)]
#[command(name = "cbt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (TOML, JSON or YAML); defaults to ./cbt.toml if present
    #[arg(long, global = true, env = "CBT_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Build or reuse every aggregate named in a spec
    ///
    /// Examples:
    ///   cbt aggregate --spec "tools=/pkgs/a|/pkgs/b|!/pkgs/c" --dest /cache
    ///   cbt aggregate --spec "$SPEC" --dest /cache --props obj/aggregates.props
    Aggregate(AggregateArgs),

    /// Show how a spec parses, with each aggregate's fingerprint
    Parse {
        /// Spec string, e.g. "name=dir|dir|!dir;name2=dir"
        #[arg(long)]
        spec: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Write NuGetPath_/NuGetVersion_ properties for a restored project
    PackageProps(PackagePropsArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AggregateArgs {
    /// Spec string, e.g. "name=dir|dir|!dir;name2=dir"
    #[arg(long)]
    pub spec: String,

    /// Destination root shared by all aggregates
    #[arg(long)]
    pub dest: PathBuf,

    /// Write the resulting paths to this MSBuild property file
    #[arg(long)]
    pub props: Option<PathBuf>,

    /// Seconds to wait for another process building the same aggregate
    #[arg(long)]
    pub lock_timeout: Option<u64>,

    /// Directory holding the cross-process lock files
    #[arg(long)]
    pub lock_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PackagePropsArgs {
    /// Project directory containing obj/project.assets.json or project.lock.json
    #[arg(long)]
    pub project_dir: PathBuf,

    /// MSBuild property file to write
    #[arg(long)]
    pub props: PathBuf,

    /// NuGet packages folder for project.lock.json installs
    #[arg(long)]
    pub packages_root: Option<PathBuf>,
}
