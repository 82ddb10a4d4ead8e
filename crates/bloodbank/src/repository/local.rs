//! Donor repository over a local key-value store.

use async_trait::async_trait;
use tracing::{debug, info};

use super::DonorRepository;
use crate::config::BackendKind;
use crate::donor::{Donor, DonorFilter};
use crate::error::Result;
use crate::storage::KeyValueStore;

/// Key under which the donor collection is stored.
pub const DONORS_KEY: &str = "donors";

/// Keeps every donor as one JSON array under [`DONORS_KEY`].
///
/// Every `add` reads the whole array, appends, and writes it back. Two
/// writers racing on the same store can lose an update.
///
/// Store calls are synchronous and run on the calling task. `add` and `list`
/// never yield between the read and the write, so tasks sharing one
/// repository on a current-thread runtime see each other's updates. Move
/// them onto `spawn_blocking` before sharing a repository across a
/// multi-threaded runtime.
#[derive(Debug)]
pub struct LocalDonorRepository<S> {
    store: S,
}

impl<S: KeyValueStore> LocalDonorRepository<S> {
    /// Create a repository over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the whole collection. A missing key is an empty collection.
    fn load(&self) -> Result<Vec<Donor>> {
        match self.store.get(DONORS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, donors: &[Donor]) -> Result<()> {
        let raw = serde_json::to_string(donors)?;
        self.store.set(DONORS_KEY, &raw)
    }

    /// Number of donors stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }
}

#[async_trait]
impl<S: KeyValueStore> DonorRepository for LocalDonorRepository<S> {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn add(&self, donor: &Donor) -> Result<()> {
        let mut donors = self.load()?;
        donors.push(donor.clone());
        self.save(&donors)?;
        info!(
            "Registered donor {} ({}), {} total",
            donor.full_name,
            donor.blood_group,
            donors.len()
        );
        Ok(())
    }

    async fn list(&self, filter: &DonorFilter) -> Result<Vec<Donor>> {
        let donors: Vec<Donor> = self
            .load()?
            .into_iter()
            .filter(|d| filter.matches(d))
            .collect();
        debug!("Local list matched {} donors for {:?}", donors.len(), filter);
        Ok(donors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::donor::fixtures::donor;
    use crate::error::Error;
    use crate::storage::SqliteStore;

    fn create_test_repo() -> LocalDonorRepository<SqliteStore> {
        LocalDonorRepository::new(SqliteStore::open_in_memory().expect("in-memory store"))
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let repo = create_test_repo();
        assert!(repo.list(&DonorFilter::all()).await.unwrap().is_empty());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_added_donor_is_listed() {
        let repo = create_test_repo();
        let d = donor("Asha Rao", "O+", 29, "Pune", "Maharashtra");

        repo.add(&d).await.unwrap();

        let all = repo.list(&DonorFilter::all()).await.unwrap();
        assert_eq!(all, vec![d]);
    }

    #[tokio::test]
    async fn test_add_preserves_insertion_order() {
        let repo = create_test_repo();
        for name in ["first", "second", "third"] {
            repo.add(&donor(name, "A+", 30, "x", "y")).await.unwrap();
        }

        let names: Vec<String> = repo
            .list(&DonorFilter::all())
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.full_name)
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_list_by_blood_group() {
        let repo = create_test_repo();
        repo.add(&donor("A", "O+", 30, "Pune", "Maharashtra"))
            .await
            .unwrap();
        repo.add(&donor("B", "B-", 30, "Pune", "Maharashtra"))
            .await
            .unwrap();

        let filter = DonorFilter::new(Some("B-".to_string()), None, None);
        let found = repo.list(&filter).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_name, "B");
    }

    #[tokio::test]
    async fn test_list_by_location_and_age() {
        let repo = create_test_repo();
        repo.add(&donor("A", "O+", 25, "Pune", "Maharashtra"))
            .await
            .unwrap();
        repo.add(&donor("B", "O+", 45, "Nagpur", "Maharashtra"))
            .await
            .unwrap();
        repo.add(&donor("C", "O+", 25, "Chennai", "Tamil Nadu"))
            .await
            .unwrap();

        let filter = DonorFilter::new(None, Some("MAHA".to_string()), Some(30));
        let found = repo.list(&filter).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_name, "A");
    }

    #[tokio::test]
    async fn test_reads_collection_written_elsewhere() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .set(
                DONORS_KEY,
                r#"[{"fullName":"Old","bloodGroup":"AB+","age":50,"gender":"","phone":"1",
                    "city":"delhi","state":"delhi","address":"","medicalHistory":true}]"#,
            )
            .unwrap();
        let repo = LocalDonorRepository::new(store);

        let all = repo.list(&DonorFilter::all()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].medical_history);
        assert_eq!(all[0].gender.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_corrupt_collection_is_an_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set(DONORS_KEY, "not json").unwrap();
        let repo = LocalDonorRepository::new(store);

        let err = repo.list(&DonorFilter::all()).await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[tokio::test]
    async fn test_joined_adds_are_both_kept() {
        let repo = create_test_repo();
        let a = donor("A", "O+", 30, "Pune", "Maharashtra");
        let b = donor("B", "B-", 30, "Pune", "Maharashtra");

        let (first, second) = tokio::join!(repo.add(&a), repo.add(&b));
        first.unwrap();
        second.unwrap();

        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_kind() {
        assert_eq!(create_test_repo().kind(), BackendKind::Local);
    }
}
