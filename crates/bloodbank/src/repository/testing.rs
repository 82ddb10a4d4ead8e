//! Test doubles for donor repositories.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::config::BackendKind;
use crate::donor::{Donor, DonorFilter};
use crate::error::{Error, Result};
use crate::repository::DonorRepository;

/// In-memory repository that records calls and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingRepository {
    pub kind: Option<BackendKind>,
    pub fail_add: bool,
    pub fail_list: bool,
    pub donors: Mutex<Vec<Donor>>,
    pub add_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl RecordingRepository {
    pub fn remote() -> Self {
        Self {
            kind: Some(BackendKind::Remote),
            ..Self::default()
        }
    }

    pub fn adds(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DonorRepository for RecordingRepository {
    fn kind(&self) -> BackendKind {
        self.kind.unwrap_or(BackendKind::Local)
    }

    async fn add(&self, donor: &Donor) -> Result<()> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_add {
            return Err(Error::ServerStatus {
                operation: "create donor",
                status: 500,
            });
        }
        self.donors.lock().unwrap().push(donor.clone());
        Ok(())
    }

    async fn list(&self, filter: &DonorFilter) -> Result<Vec<Donor>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(Error::server("list donors", "connection refused"));
        }
        let donors = self.donors.lock().unwrap();
        Ok(donors.iter().filter(|d| filter.matches(d)).cloned().collect())
    }
}
