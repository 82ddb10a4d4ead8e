//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Args, Subcommand, ValueEnum};

use crate::donor::{DonorFilter, BLOOD_GROUPS};
use crate::form::DonorForm;

/// Register command arguments.
///
/// Required fields are optional here so that missing input is reported by
/// the form validator, naming every missing field at once.
#[derive(Debug, Default, Args)]
pub struct RegisterCommand {
    /// Donor's full name
    #[arg(long)]
    pub full_name: Option<String>,

    /// Blood group
    #[arg(long, value_parser = PossibleValuesParser::new(BLOOD_GROUPS.iter().copied()))]
    pub blood_group: Option<String>,

    /// Age in years
    #[arg(long)]
    pub age: Option<String>,

    /// Gender
    #[arg(long)]
    pub gender: Option<String>,

    /// Contact phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// City
    #[arg(long)]
    pub city: Option<String>,

    /// State
    #[arg(long)]
    pub state: Option<String>,

    /// Street address
    #[arg(long)]
    pub address: Option<String>,

    /// The donor has a relevant medical history
    #[arg(long)]
    pub medical_history: bool,

    /// Output format for the refreshed table
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl RegisterCommand {
    /// Copy the arguments into a registration form.
    #[must_use]
    pub fn to_form(&self) -> DonorForm {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        DonorForm {
            full_name: text(&self.full_name),
            blood_group: text(&self.blood_group),
            age: text(&self.age),
            gender: text(&self.gender),
            phone: text(&self.phone),
            city: text(&self.city),
            state: text(&self.state),
            address: text(&self.address),
            medical_history: self.medical_history,
        }
    }
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Only donors with this blood group
    #[arg(short, long, value_parser = PossibleValuesParser::new(BLOOD_GROUPS.iter().copied()))]
    pub blood_group: Option<String>,

    /// Only donors whose city or state contains this text
    #[arg(short, long)]
    pub location: Option<String>,

    /// Only donors at most this old
    #[arg(short, long)]
    pub max_age: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl SearchCommand {
    /// The donor filter described by the arguments.
    #[must_use]
    pub fn filter(&self) -> DonorFilter {
        DonorFilter::new(
            self.blood_group.clone(),
            self.location.clone(),
            self.max_age,
        )
    }
}

/// Arguments for commands that only print the donor table.
#[derive(Debug, Args)]
pub struct TableCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for donor tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated rows, no header
    Plain,
    /// Aligned columns with a header
    #[default]
    Table,
    /// JSON
    Json,
}
