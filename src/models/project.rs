//! Project entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{validate_required_text, ValidationError};

pub const PROJECT_NAME_MAX: usize = 150;

/// Project status enumeration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Lead that has not been won yet
    Prospect,
    /// Actively being delivered
    Active,
    /// Temporarily on hold
    Paused,
    /// Delivered or abandoned
    Closed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Prospect => "prospect",
            ProjectStatus::Active => "active",
            ProjectStatus::Paused => "paused",
            ProjectStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<ProjectStatus> {
        match s {
            "prospect" => Some(ProjectStatus::Prospect),
            "active" => Some(ProjectStatus::Active),
            "paused" => Some(ProjectStatus::Paused),
            "closed" => Some(ProjectStatus::Closed),
            _ => None,
        }
    }
}

/// A project row.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub status: ProjectStatus,
    pub budget: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectCreate {
    pub name: String,
    /// Defaults to `prospect` when omitted
    pub status: Option<ProjectStatus>,
    pub budget: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl ProjectCreate {
    /// Validate fields and return the normalized name.
    pub fn validated_name(&self) -> Result<String, ValidationError> {
        validate_budget(self.budget)?;
        validate_required_text(&self.name, "Project name", PROJECT_NAME_MAX)
    }
}

/// Request to update a project. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub budget: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl ProjectUpdate {
    pub fn validated_name(&self) -> Result<Option<String>, ValidationError> {
        validate_budget(self.budget)?;
        self.name
            .as_deref()
            .map(|n| validate_required_text(n, "Project name", PROJECT_NAME_MAX))
            .transpose()
    }
}

fn validate_budget(budget: Option<f64>) -> Result<(), ValidationError> {
    match budget {
        Some(b) if b < 0.0 => Err(ValidationError::new("Budget must be positive")),
        _ => Ok(()),
    }
}
