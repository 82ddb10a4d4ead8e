//! Donor registration form.
//!
//! [`DonorForm`] holds the raw text a user typed. [`FormController`] checks
//! the required fields, turns the input into a [`Donor`], and hands it to the
//! repository, reporting what the caller should show and refresh next.
//!
//! ```text
//! Idle -> Validating -> Submitting -> Idle   (success: form cleared)
//!             |              '------> Idle   (server error: input kept)
//!             '---------------------> Idle   (validation error: input kept)
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::BackendKind;
use crate::donor::{normalize, Donor};
use crate::error::{Error, Result};
use crate::repository::DonorRepository;

/// Raw registration input, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorForm {
    /// Full name.
    pub full_name: String,
    /// Blood group.
    pub blood_group: String,
    /// Age, as typed.
    pub age: String,
    /// Gender.
    pub gender: String,
    /// Phone number.
    pub phone: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Street address.
    pub address: String,
    /// Medical history checkbox.
    pub medical_history: bool,
}

impl DonorForm {
    /// Names of the required fields that are empty, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("fullName", &self.full_name),
            ("bloodGroup", &self.blood_group),
            ("age", &self.age),
            ("phone", &self.phone),
            ("city", &self.city),
            ("state", &self.state),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Check that every required field has a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFields`] naming every empty required field.
    pub fn validate(&self) -> Result<()> {
        let fields = self.missing_fields();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingFields { fields })
        }
    }

    /// Build a donor record from the input.
    ///
    /// Text fields are trimmed, city and state are normalized, and empty
    /// optional fields become `None`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is empty or the age is
    /// not a whole number.
    pub fn to_donor(&self) -> Result<Donor> {
        self.validate()?;

        let age_text = self.age.trim();
        let age = age_text.parse::<u32>().map_err(|_| Error::InvalidAge {
            value: age_text.to_string(),
        })?;

        Ok(Donor {
            full_name: self.full_name.trim().to_string(),
            blood_group: self.blood_group.trim().to_string(),
            age,
            gender: non_empty(&self.gender),
            phone: self.phone.trim().to_string(),
            city: normalize(&self.city),
            state: normalize(&self.state),
            address: non_empty(&self.address),
            medical_history: self.medical_history,
        })
    }

    /// Reset every field to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Where the controller is in a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormState {
    /// Waiting for input.
    #[default]
    Idle,
    /// Checking required fields.
    Validating,
    /// Waiting for the repository.
    Submitting,
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Validating => write!(f, "validating"),
            Self::Submitting => write!(f, "submitting"),
        }
    }
}

/// A display region to redraw after a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Re-run the current donor search.
    RefreshTable,
    /// Re-fetch the dashboard counters.
    RefreshStats,
}

/// Result of a form submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The donor was stored and the form cleared.
    Registered {
        /// The stored record.
        donor: Donor,
        /// Regions to redraw.
        follow_ups: Vec<FollowUp>,
    },
    /// Input was incomplete; nothing was submitted.
    Rejected(Error),
    /// The repository refused or failed; input is kept for a retry.
    Failed(Error),
}

impl SubmitOutcome {
    /// Check whether the donor was stored.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }

    /// The error behind a rejected or failed submission.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Registered { .. } => None,
            Self::Rejected(err) | Self::Failed(err) => Some(err),
        }
    }
}

/// Validates and submits donor registrations.
pub struct FormController {
    repository: Arc<dyn DonorRepository>,
    state: FormState,
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("backend", &self.repository.kind())
            .field("state", &self.state)
            .finish()
    }
}

impl FormController {
    /// Create a controller that submits into `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn DonorRepository>) -> Self {
        Self {
            repository,
            state: FormState::Idle,
        }
    }

    /// Current state. Always `Idle` between submissions.
    #[must_use]
    pub fn state(&self) -> FormState {
        self.state
    }

    fn transition(&mut self, next: FormState) {
        debug!("Form state {} -> {}", self.state, next);
        self.state = next;
    }

    /// Validate `form` and submit it.
    ///
    /// On success the form is cleared. On any error it is left untouched.
    /// Nothing prevents two overlapping submissions of the same input.
    pub async fn submit(&mut self, form: &mut DonorForm) -> SubmitOutcome {
        self.transition(FormState::Validating);
        let donor = match form.to_donor() {
            Ok(donor) => donor,
            Err(err) => {
                warn!("Registration rejected: {}", err);
                self.transition(FormState::Idle);
                return SubmitOutcome::Rejected(err);
            }
        };

        self.transition(FormState::Submitting);
        let result = self.repository.add(&donor).await;
        self.transition(FormState::Idle);

        match result {
            Ok(()) => {
                info!("Registered {} ({})", donor.full_name, donor.blood_group);
                form.clear();
                let mut follow_ups = vec![FollowUp::RefreshTable];
                if self.repository.kind() == BackendKind::Remote {
                    follow_ups.push(FollowUp::RefreshStats);
                }
                SubmitOutcome::Registered { donor, follow_ups }
            }
            Err(err) => {
                warn!("Registration failed: {}", err);
                SubmitOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::testing::RecordingRepository;
    use super::*;

    fn asha() -> DonorForm {
        DonorForm {
            full_name: "  Asha Rao ".to_string(),
            blood_group: "O+".to_string(),
            age: "29".to_string(),
            phone: " 9999999999".to_string(),
            city: " Pune".to_string(),
            state: "Maharashtra ".to_string(),
            ..DonorForm::default()
        }
    }

    #[test]
    fn test_missing_fields_lists_all_empty_required() {
        let form = DonorForm::default();
        assert_eq!(
            form.missing_fields(),
            ["fullName", "bloodGroup", "age", "phone", "city", "state"]
        );
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let mut form = asha();
        form.city = "   ".to_string();
        assert_eq!(form.missing_fields(), ["city"]);
    }

    #[test]
    fn test_optional_fields_not_required() {
        assert!(asha().validate().is_ok());
    }

    #[test]
    fn test_to_donor_normalizes() {
        let mut form = asha();
        form.gender = "Female".to_string();
        form.address = "  ".to_string();
        form.medical_history = true;

        let donor = form.to_donor().unwrap();
        assert_eq!(donor.full_name, "Asha Rao");
        assert_eq!(donor.phone, "9999999999");
        assert_eq!(donor.city, "pune");
        assert_eq!(donor.state, "maharashtra");
        assert_eq!(donor.age, 29);
        assert_eq!(donor.gender.as_deref(), Some("Female"));
        assert_eq!(donor.address, None);
        assert!(donor.medical_history);
    }

    #[test]
    fn test_to_donor_rejects_non_numeric_age() {
        let mut form = asha();
        form.age = "twenty".to_string();

        let err = form.to_donor().unwrap_err();
        assert!(matches!(err, Error::InvalidAge { ref value } if value == "twenty"));
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_clear() {
        let mut form = asha();
        form.clear();
        assert_eq!(form, DonorForm::default());
    }

    #[tokio::test]
    async fn test_submit_missing_phone_does_not_call_add() {
        let repo = Arc::new(RecordingRepository::default());
        let mut controller = FormController::new(repo.clone());
        let mut form = asha();
        form.phone = String::new();

        let outcome = controller.submit(&mut form).await;

        match outcome {
            SubmitOutcome::Rejected(Error::MissingFields { fields }) => {
                assert_eq!(fields, ["phone"]);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(repo.adds(), 0);
        assert_eq!(form.full_name, "  Asha Rao ");
        assert_eq!(controller.state(), FormState::Idle);
    }

    #[tokio::test]
    async fn test_submit_success_clears_form_and_refreshes_table() {
        let repo = Arc::new(RecordingRepository::default());
        let mut controller = FormController::new(repo.clone());
        let mut form = asha();

        let outcome = controller.submit(&mut form).await;

        match outcome {
            SubmitOutcome::Registered { donor, follow_ups } => {
                assert_eq!(donor.full_name, "Asha Rao");
                assert_eq!(follow_ups, [FollowUp::RefreshTable]);
            }
            other => panic!("expected registration, got {other:?}"),
        }
        assert_eq!(repo.adds(), 1);
        assert_eq!(form, DonorForm::default());
        assert_eq!(controller.state(), FormState::Idle);
    }

    #[tokio::test]
    async fn test_submit_remote_also_refreshes_stats() {
        let repo = Arc::new(RecordingRepository::remote());
        let mut controller = FormController::new(repo);
        let mut form = asha();

        let outcome = controller.submit(&mut form).await;

        match outcome {
            SubmitOutcome::Registered { follow_ups, .. } => {
                assert_eq!(follow_ups, [FollowUp::RefreshTable, FollowUp::RefreshStats]);
            }
            other => panic!("expected registration, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_server_error_keeps_input() {
        let repo = Arc::new(RecordingRepository {
            fail_add: true,
            ..RecordingRepository::default()
        });
        let mut controller = FormController::new(repo.clone());
        let mut form = asha();

        let outcome = controller.submit(&mut form).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert!(outcome.error().is_some_and(Error::is_server_error));
        assert_eq!(form, asha());
        assert_eq!(repo.adds(), 1);
        assert_eq!(controller.state(), FormState::Idle);
    }

    #[tokio::test]
    async fn test_double_submit_is_not_guarded() {
        let repo = Arc::new(RecordingRepository::default());
        let mut controller = FormController::new(repo.clone());

        let mut first = asha();
        let mut second = asha();
        assert!(controller.submit(&mut first).await.is_registered());
        assert!(controller.submit(&mut second).await.is_registered());

        assert_eq!(repo.adds(), 2);
    }
}
