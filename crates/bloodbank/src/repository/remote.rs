//! Reqwest-backed donor API adapter.
//!
//! This adapter owns transport details only: URL resolution, timeouts,
//! status checks, and JSON decoding. Filtering happens on the server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, info};

use super::{DonorRepository, Stats, StatsSource};
use crate::config::BackendKind;
use crate::donor::{Donor, DonorFilter};
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("bloodbank/", env!("CARGO_PKG_VERSION"));

const OP_CREATE: &str = "create donor";
const OP_LIST: &str = "list donors";
const OP_STATS: &str = "fetch stats";

/// Donor repository that forwards every call to the donor HTTP API.
#[derive(Debug, Clone)]
pub struct RemoteDonorRepository {
    client: Client,
    base_url: Url,
}

impl RemoteDonorRepository {
    /// Build an adapter against `base_url` with a per-request timeout.
    ///
    /// Endpoint paths are resolved relative to `base_url`, so it should end
    /// with a slash when it carries a path prefix.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str, operation: &'static str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::server(operation, format!("invalid endpoint '{path}': {e}")))
    }
}

/// Fail with `ServerStatus` unless the response is 2xx.
fn check_status(response: reqwest::Response, operation: &'static str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::ServerStatus {
            operation,
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl DonorRepository for RemoteDonorRepository {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn add(&self, donor: &Donor) -> Result<()> {
        let url = self.endpoint("donors", OP_CREATE)?;
        let response = self
            .client
            .post(url)
            .json(donor)
            .send()
            .await
            .map_err(|e| Error::transport(OP_CREATE, &e))?;
        check_status(response, OP_CREATE)?;

        info!("Registered donor {} with the API", donor.full_name);
        Ok(())
    }

    async fn list(&self, filter: &DonorFilter) -> Result<Vec<Donor>> {
        let url = self.endpoint("donors", OP_LIST)?;
        let response = self
            .client
            .get(url)
            .query(&filter.query_pairs())
            .send()
            .await
            .map_err(|e| Error::transport(OP_LIST, &e))?;

        let donors: Vec<Donor> = check_status(response, OP_LIST)?
            .json()
            .await
            .map_err(|e| Error::server(OP_LIST, format!("invalid donor list: {e}")))?;

        debug!("API returned {} donors for {:?}", donors.len(), filter);
        Ok(donors)
    }
}

#[async_trait]
impl StatsSource for RemoteDonorRepository {
    async fn fetch_stats(&self) -> Result<Stats> {
        let url = self.endpoint("stats", OP_STATS)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(OP_STATS, &e))?;

        check_status(response, OP_STATS)?
            .json()
            .await
            .map_err(|e| Error::server(OP_STATS, format!("invalid stats payload: {e}")))
    }
}
