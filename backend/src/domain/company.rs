//! Companies and their memberships.
//!
//! A company always has exactly one owner, fixed at creation. The owner is
//! also a member with [`MemberRole::Owner`]; adapters insert both rows in one
//! unit of work.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Maximum company name length.
pub const COMPANY_NAME_MAX: usize = 100;

/// Validation errors for company input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompanyValidationError {
    #[error("company name must not be empty")]
    EmptyName,
    #[error("company name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("no fields to update")]
    EmptyUpdate,
}

/// Storage identifier of a company.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct CompanyId(i64);

impl CompanyId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trimmed, non-empty company name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct CompanyName(String);

impl CompanyName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CompanyValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CompanyValidationError::EmptyName);
        }
        if trimmed.chars().count() > COMPANY_NAME_MAX {
            return Err(CompanyValidationError::NameTooLong {
                max: COMPANY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CompanyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CompanyName> for String {
    fn from(value: CompanyName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CompanyName {
    type Error = CompanyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role of a user inside a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Member,
}

impl MemberRole {
    /// Storage spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
        }
    }

    /// Parse the storage spelling.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "owner" => Some(Self::Owner),
            "member" => Some(Self::Member),
            _ => None,
        }
    }
}

/// Company as seen by one of its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Company {
    pub id: CompanyId,
    pub name: CompanyName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: CompanyName,
    pub description: Option<String>,
    pub created_by: UserId,
}

/// Partial update; at least one field must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyUpdate {
    pub name: Option<CompanyName>,
    pub description: Option<String>,
}

impl CompanyUpdate {
    /// Build an update from optional raw fields.
    ///
    /// # Examples
    /// ```
    /// use crewplan_backend::domain::{CompanyUpdate, CompanyValidationError};
    ///
    /// assert_eq!(
    ///     CompanyUpdate::try_from_parts(None, None),
    ///     Err(CompanyValidationError::EmptyUpdate)
    /// );
    /// let update = CompanyUpdate::try_from_parts(Some(" Acme "), None).unwrap();
    /// assert_eq!(update.name.unwrap().as_ref(), "Acme");
    /// ```
    pub fn try_from_parts(
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Self, CompanyValidationError> {
        if name.is_none() && description.is_none() {
            return Err(CompanyValidationError::EmptyUpdate);
        }
        Ok(Self {
            name: name.map(CompanyName::new).transpose()?,
            description: description.map(str::to_owned),
        })
    }

    /// Whether the update touches nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Acme", "Acme")]
    #[case("  Acme Ltd\t", "Acme Ltd")]
    fn name_is_trimmed(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(CompanyName::new(raw).expect("valid").as_ref(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_names_are_rejected(#[case] raw: &str) {
        assert_eq!(CompanyName::new(raw), Err(CompanyValidationError::EmptyName));
    }

    #[rstest]
    fn overlong_names_are_rejected() {
        let raw = "x".repeat(COMPANY_NAME_MAX + 1);
        assert_eq!(
            CompanyName::new(raw),
            Err(CompanyValidationError::NameTooLong {
                max: COMPANY_NAME_MAX
            })
        );
    }

    #[rstest]
    #[case(MemberRole::Owner, "owner")]
    #[case(MemberRole::Member, "member")]
    fn role_spelling_round_trips(#[case] role: MemberRole, #[case] raw: &str) {
        assert_eq!(role.as_str(), raw);
        assert_eq!(MemberRole::parse(raw), Some(role));
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        assert_eq!(MemberRole::parse("admin"), None);
    }

    #[rstest]
    fn description_only_update_is_allowed() {
        let update = CompanyUpdate::try_from_parts(None, Some("")).expect("valid update");
        assert!(update.name.is_none());
        assert_eq!(update.description.as_deref(), Some(""));
        assert!(!update.is_empty());
    }

    #[rstest]
    fn blank_name_in_update_is_rejected() {
        assert_eq!(
            CompanyUpdate::try_from_parts(Some(" "), Some("x")),
            Err(CompanyValidationError::EmptyName)
        );
    }
}
