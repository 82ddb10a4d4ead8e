//! `bloodbank` - A blood donor registry
//!
//! This library provides donor registration, filtered donor search, and the
//! dashboard counters, backed either by a local SQLite key-value store or by
//! the donor HTTP API.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod donor;
pub mod error;
pub mod form;
pub mod logging;
pub mod repository;
pub mod stats;
pub mod storage;
pub mod table;

pub use config::{BackendKind, Config};
pub use donor::{Donor, DonorFilter};
pub use error::{Error, Result};
pub use form::{DonorForm, FollowUp, FormController, SubmitOutcome};
pub use logging::init_logging;
pub use repository::{Backend, DonorRepository, Stats, StatsSource};
pub use stats::{CounterDisplay, StatsReporter};
pub use storage::{KeyValueStore, SqliteStore};
pub use table::{TableRenderer, TableView};
