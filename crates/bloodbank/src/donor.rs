//! Core donor types for bloodbank.
//!
//! This module defines the donor record, the search filter applied to donor
//! lists, and the text normalization used to make location matching
//! case-insensitive.

use serde::{Deserialize, Serialize};

/// Blood groups offered by the registration form and search box.
pub const BLOOD_GROUPS: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Trim surrounding whitespace and lowercase.
///
/// Applied to city and state before storage so that location searches are
/// case-insensitive.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Uppercase the first character and leave the rest untouched.
///
/// This is not title-case: `"new delhi"` becomes `"New delhi"`.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A registered blood donor.
///
/// Donors have no identifier and are never updated or removed once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    /// Full name, trimmed.
    pub full_name: String,

    /// Blood group, e.g. `O+`.
    pub blood_group: String,

    /// Age in years.
    pub age: u32,

    /// Gender, if given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    /// Contact phone number, trimmed.
    pub phone: String,

    /// City, normalized.
    pub city: String,

    /// State, normalized.
    pub state: String,

    /// Street address, if given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Whether the donor declared a relevant medical history.
    #[serde(default)]
    pub medical_history: bool,
}

/// Search criteria for listing donors.
///
/// Every field is optional; an absent field imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DonorFilter {
    /// Exact blood group to match.
    pub blood_group: Option<String>,
    /// Substring to look for in city or state.
    pub location: Option<String>,
    /// Upper bound on age, inclusive.
    pub max_age: Option<u32>,
}

impl DonorFilter {
    /// A filter that matches every donor.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from raw search inputs.
    ///
    /// Empty strings count as "not given". The location is lowercased so
    /// that it can be compared against normalized city and state values.
    #[must_use]
    pub fn new(
        blood_group: Option<String>,
        location: Option<String>,
        max_age: Option<u32>,
    ) -> Self {
        Self {
            blood_group: blood_group.filter(|b| !b.is_empty()),
            location: location
                .filter(|l| !l.is_empty())
                .map(|l| l.to_lowercase()),
            max_age,
        }
    }

    /// Check whether no criteria are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blood_group.is_none() && self.location.is_none() && self.max_age.is_none()
    }

    /// Check whether a donor satisfies every criterion that is set.
    #[must_use]
    pub fn matches(&self, donor: &Donor) -> bool {
        let blood_ok = self
            .blood_group
            .as_deref()
            .map_or(true, |b| donor.blood_group == b);

        let location_ok = self.location.as_deref().map_or(true, |l| {
            let needle = l.to_lowercase();
            donor.city.contains(&needle) || donor.state.contains(&needle)
        });

        let age_ok = self.max_age.map_or(true, |max| donor.age <= max);

        blood_ok && location_ok && age_ok
    }

    /// Query parameters understood by the donor API.
    ///
    /// All three parameters are always sent; absent criteria are empty.
    #[must_use]
    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("bloodGroup", self.blood_group.clone().unwrap_or_default()),
            ("location", self.location.clone().unwrap_or_default()),
            (
                "maxAge",
                self.max_age.map(|a| a.to_string()).unwrap_or_default(),
            ),
        ]
    }
}
