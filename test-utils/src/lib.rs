//! Shared test utilities for the LUIS router crates.
//!
//! This crate provides:
//! - Fakes for the discovery, identity, encryption and token store seams
//! - Fixtures with sample configuration and router payloads
//! - Proptest generators for router outcomes

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
