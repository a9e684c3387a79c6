//! Test fixtures and builders shared across the invsync crates.
//!
//! This crate is for tests only. It provides fluent builders for
//! activities and exchanges, a small canned activity network, and a
//! self-cleaning wrapper around the SQLite remote store.

#![deny(unsafe_code)]

mod builders;
mod fixtures;

pub use builders::{ActivityBuilder, ExchangeBuilder};
pub use fixtures::{
    sample_network, scenarios, with_remote, SampleKeys, TestRemote, SAMPLE_DATABASE,
};
