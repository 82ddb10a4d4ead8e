//! Donor table rendering.
//!
//! [`TableRenderer`] queries the repository and turns the result into a
//! [`TableView`]: either one row per donor, or a single placeholder row
//! explaining why there is nothing to show.
//!
//! Refreshes may overlap. Each one takes a generation number before it
//! queries, and a result that arrives after a newer refresh has started is
//! dropped instead of overwriting the newer view.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::BackendKind;
use crate::donor::{capitalize, Donor, DonorFilter};
use crate::repository::DonorRepository;

/// Placeholder shown when a search matches no donors.
pub const NO_DONORS_FOUND: &str = "No donors found";

/// Placeholder shown after a reset against the remote backend.
pub const NO_DONORS_TO_DISPLAY: &str = "No donors to display";

/// Placeholder shown when the donor list could not be loaded.
pub const LOAD_FAILED: &str = "Error loading donors";

/// Column headings, in display order.
pub const HEADERS: [&str; 6] = ["Name", "Blood Group", "Age", "City", "State", "Phone"];

/// One displayed donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorRow {
    /// Full name.
    pub full_name: String,
    /// Blood group.
    pub blood_group: String,
    /// Age in years.
    pub age: u32,
    /// City, first letter capitalized.
    pub city: String,
    /// State, first letter capitalized.
    pub state: String,
    /// Phone number.
    pub phone: String,
}

impl DonorRow {
    /// Cell text in column order.
    #[must_use]
    pub fn cells(&self) -> [String; 6] {
        [
            self.full_name.clone(),
            self.blood_group.clone(),
            self.age.to_string(),
            self.city.clone(),
            self.state.clone(),
            self.phone.clone(),
        ]
    }
}

impl From<&Donor> for DonorRow {
    fn from(donor: &Donor) -> Self {
        Self {
            full_name: donor.full_name.clone(),
            blood_group: donor.blood_group.clone(),
            age: donor.age,
            city: capitalize(&donor.city),
            state: capitalize(&donor.state),
            phone: donor.phone.clone(),
        }
    }
}

/// What the donor table should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TableView {
    /// At least one donor.
    Rows(Vec<DonorRow>),
    /// A single informational row spanning every column.
    Placeholder(String),
    /// A single error row spanning every column.
    Error(String),
}

impl TableView {
    /// Build the view for a donor list.
    #[must_use]
    pub fn from_donors(donors: &[Donor]) -> Self {
        if donors.is_empty() {
            Self::Placeholder(NO_DONORS_FOUND.to_string())
        } else {
            Self::Rows(donors.iter().map(DonorRow::from).collect())
        }
    }

    /// Number of table rows, counting a placeholder or error as one.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Placeholder(_) | Self::Error(_) => 1,
        }
    }

    /// The donor rows, empty for placeholders and errors.
    #[must_use]
    pub fn rows(&self) -> &[DonorRow] {
        match self {
            Self::Rows(rows) => rows,
            Self::Placeholder(_) | Self::Error(_) => &[],
        }
    }

    /// Check whether this is an error row.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Renders donor searches into [`TableView`]s.
pub struct TableRenderer {
    repository: Arc<dyn DonorRepository>,
    generation: AtomicU64,
}

impl fmt::Debug for TableRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableRenderer")
            .field("backend", &self.repository.kind())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl TableRenderer {
    /// Create a renderer reading from `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn DonorRepository>) -> Self {
        Self {
            repository,
            generation: AtomicU64::new(0),
        }
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// List donors matching `filter` and build the view.
    ///
    /// Returns `None` when a newer refresh or reset started while this one
    /// was waiting on the repository.
    pub async fn refresh(&self, filter: &DonorFilter) -> Option<TableView> {
        let generation = self.begin();
        let result = self.repository.list(filter).await;

        if !self.is_current(generation) {
            debug!("Dropping stale table refresh #{}", generation);
            return None;
        }

        Some(match result {
            Ok(donors) => TableView::from_donors(&donors),
            Err(err) => {
                warn!("Failed to load donors: {}", err);
                TableView::Error(LOAD_FAILED.to_string())
            }
        })
    }

    /// Clear the search.
    ///
    /// The local backend lists every donor again. The remote backend shows a
    /// placeholder without querying.
    pub async fn reset(&self) -> Option<TableView> {
        match self.repository.kind() {
            BackendKind::Local => self.refresh(&DonorFilter::all()).await,
            BackendKind::Remote => {
                self.begin();
                Some(TableView::Placeholder(NO_DONORS_TO_DISPLAY.to_string()))
            }
        }
    }
}
