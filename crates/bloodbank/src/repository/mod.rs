//! Donor repositories.
//!
//! A [`DonorRepository`] owns the donor collection and answers filtered
//! list queries. Two implementations exist and are chosen at startup from
//! configuration:
//!
//! - [`LocalDonorRepository`] keeps the collection in a local key-value store
//!   and filters in-process.
//! - [`RemoteDonorRepository`] talks to the donor HTTP API and leaves
//!   filtering to the server. It also serves aggregate [`Stats`].

mod local;
mod remote;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{BackendKind, Config};
use crate::donor::{Donor, DonorFilter};
use crate::error::Result;
use crate::storage::SqliteStore;

pub use local::{LocalDonorRepository, DONORS_KEY};
pub use remote::RemoteDonorRepository;

/// Storage for donor records.
#[async_trait]
pub trait DonorRepository: Send + Sync {
    /// Which kind of backend this repository uses.
    fn kind(&self) -> BackendKind;

    /// Append a donor to the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the donor could not be stored.
    async fn add(&self, donor: &Donor) -> Result<()>;

    /// List the donors matching `filter`, in collection order.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection could not be read.
    async fn list(&self, filter: &DonorFilter) -> Result<Vec<Donor>>;
}

/// Aggregate counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of registered donors.
    pub registered_donors: u64,
    /// Number of lives saved by donations.
    pub lives_saved: u64,
}

/// A source of aggregate [`Stats`].
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch the current counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the counters could not be fetched.
    async fn fetch_stats(&self) -> Result<Stats>;
}

/// The repository selected by configuration.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Local key-value store.
    Local(Arc<LocalDonorRepository<SqliteStore>>),
    /// Donor HTTP API.
    Remote(Arc<RemoteDonorRepository>),
}

impl Backend {
    /// Open the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store cannot be opened, or the remote
    /// client cannot be built from the configured URL and timeout.
    pub fn open(config: &Config) -> Result<Self> {
        match config.store.backend {
            BackendKind::Local => {
                let store = SqliteStore::open(config.database_path())?;
                Ok(Self::Local(Arc::new(LocalDonorRepository::new(store))))
            }
            BackendKind::Remote => {
                let repository =
                    RemoteDonorRepository::new(config.base_url()?, config.request_timeout())?;
                Ok(Self::Remote(Arc::new(repository)))
            }
        }
    }

    /// Which kind of backend is open.
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Local(_) => BackendKind::Local,
            Self::Remote(_) => BackendKind::Remote,
        }
    }

    /// The donor repository.
    #[must_use]
    pub fn repository(&self) -> Arc<dyn DonorRepository> {
        match self {
            Self::Local(repo) => repo.clone(),
            Self::Remote(repo) => repo.clone(),
        }
    }

    /// The stats source, if this backend has one.
    #[must_use]
    pub fn stats_source(&self) -> Option<Arc<dyn StatsSource>> {
        match self {
            Self::Local(_) => None,
            Self::Remote(repo) => Some(repo.clone()),
        }
    }
}
