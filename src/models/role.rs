//! Role entity.

use serde::{Deserialize, Serialize};

use super::{validate_optional_text, validate_required_text, ValidationError};

pub const ROLE_NAME_MAX: usize = 50;
pub const ROLE_DESCRIPTION_MAX: usize = 150;

/// A role row. Role names are unique case-insensitively.
#[derive(Debug, Clone, Serialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Request to create a role.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleCreate {
    pub name: String,
    pub description: Option<String>,
}

impl RoleCreate {
    pub fn validated_name(&self) -> Result<String, ValidationError> {
        validate_optional_text(
            self.description.as_deref(),
            "Role description",
            ROLE_DESCRIPTION_MAX,
        )?;
        validate_required_text(&self.name, "Role name", ROLE_NAME_MAX)
    }
}

/// Request to update a role. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl RoleUpdate {
    pub fn validated_name(&self) -> Result<Option<String>, ValidationError> {
        validate_optional_text(
            self.description.as_deref(),
            "Role description",
            ROLE_DESCRIPTION_MAX,
        )?;
        self.name
            .as_deref()
            .map(|n| validate_required_text(n, "Role name", ROLE_NAME_MAX))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_trimmed() {
        let payload = RoleCreate {
            name: " Developer ".to_string(),
            description: None,
        };
        assert_eq!(payload.validated_name().unwrap(), "Developer");
    }

    #[test]
    fn test_empty_role_name_rejected() {
        let payload = RoleCreate {
            name: "  ".to_string(),
            description: None,
        };
        assert!(payload.validated_name().is_err());
    }
}
