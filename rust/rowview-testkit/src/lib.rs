//! Test utilities and helpers for the rowview crates.
//!
//! This crate provides:
//! - Fixture tables shaped after common test scenarios
//! - Randomized table and arrangement generation
//!
//! # Usage
//!
//! This crate is primarily intended for use within the rowview test suites.

pub mod data_gen;
pub mod fixtures;
