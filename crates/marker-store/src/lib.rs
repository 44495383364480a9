//! # Marker Store
//!
//! Diagnostic ("marker") storage for the jslint-builder incremental lint engine.
//!
//! This crate provides:
//! - The diagnostic model and the `MarkerStore` contract used by the engine
//! - Operations that publish a whole build's marker churn at once
//! - An in-memory store and a JSON-persisted store
//! - Centralized data directory management
//!
//! ## Usage
//!
//! ```rust,no_run
//! use marker_store::{ClearScope, Diagnostic, InMemoryMarkerStore, MarkerStore, StoreOperation};
//!
//! let store = InMemoryMarkerStore::new();
//! {
//!     let _operation = StoreOperation::begin(&store).unwrap();
//!     store.clear_diagnostics("src/app.js", ClearScope::File).unwrap();
//!     store
//!         .create_diagnostic(Diagnostic::warning("src/app.js", 4, "Missing 'use strict'."))
//!         .unwrap();
//! }
//! assert_eq!(store.diagnostics("src/app.js").unwrap().len(), 1);
//! ```

pub mod data_directory;
pub mod diagnostic;
pub mod errors;
pub mod json_store;
mod ledger;
pub mod memory;
pub mod store;

pub use data_directory::DataDirectory;
pub use diagnostic::{
    ClearScope, DIAGNOSTIC_SOURCE_ID, Diagnostic, MARKER_TYPE, MarkerTable, Severity,
};
pub use errors::{MarkerStoreError, Result};
pub use json_store::JsonMarkerStore;
pub use memory::InMemoryMarkerStore;
pub use store::{MarkerStore, StoreOperation};
