//! # invsync Import
//!
//! Typed-table import and foreground database assembly.
//!
//! A YAML [`ImportTemplate`] describes a foreground database as four tables:
//! activities to create, exchanges to attach, activities to copy from
//! databases already in the local store, and exchanges to delete. After
//! parsing, [`ImportTemplate::backfill_database`] fills absent database
//! cells with the configured foreground name and [`assemble`] applies the
//! template to a [`invsync_local::GraphStore`].
//!
//! Created activities without explicit codes receive generated UUID codes;
//! exchange rows that reference a created activity by its reference product
//! inherit that activity's code, so a template can be written entirely in
//! names.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod assemble;
mod error;
mod tables;

pub use assemble::{assemble, AssemblyReport, DEFAULT_ACTIVITY_TYPE};
pub use error::{ImportError, ImportResult};
pub use tables::{
    AddExchangeRow, CopyActivityRow, CreateActivityRow, DeleteExchangeRow, ImportTemplate,
};
