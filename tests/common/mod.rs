//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

#[path = "../../src/fill/fixtures.rs"]
mod fixtures;

pub use fixtures::*;
