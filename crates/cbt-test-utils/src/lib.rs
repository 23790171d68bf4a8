//! Shared test utilities for the CBT package tasks workspace.
//!
//! This crate is a dev-dependency only; it is never published.
//!
//! # Modules
//!
//! - [`fixture`]: [`PackageFixture`] for package folders and cache roots

pub mod fixture;

pub use fixture::PackageFixture;
