//! Shared test fixtures for DeltaBlue crates.
//!
//! This crate provides ready-made constraint graphs and workload generators.
//! It only depends on `deltablue-core`.
//!
//! - [`chain`] - A chain of required equalities driven from one end
//! - [`projection`] - Source/destination pairs linked by scale constraints
//! - [`random`] - Seeded random add/destroy/change workloads
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! deltablue-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use deltablue_test::chain::ChainFixture;
//! use deltablue_test::random::RandomWorkload;
//! ```

pub mod chain;
pub mod projection;
pub mod random;

pub use chain::ChainFixture;
pub use projection::ProjectionFixture;
pub use random::{Operation, RandomWorkload};
