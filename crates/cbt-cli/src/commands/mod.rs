//! Command implementations for cbt-cli

pub mod aggregate;
pub mod package_props;
pub mod parse;

pub use aggregate::run_aggregate;
pub use package_props::run_package_props;
pub use parse::run_parse;
