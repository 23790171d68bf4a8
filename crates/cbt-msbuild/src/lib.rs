//! MSBuild-facing collaborators of the package tasks
//!
//! - [`props`] persists name/value pairs as an MSBuild `.props` file
//! - [`packages`] reads resolved packages from NuGet lock files and turns
//!   them into properties

pub mod error;
pub mod packages;
pub mod props;

pub use error::{Error, Result};
pub use packages::{
    AssetsFileProvider, LockFileProvider, PackageProvider, PackageReference, ProviderChain,
    package_properties,
};
pub use props::{PropertySet, PropertySink, PropsFile};
