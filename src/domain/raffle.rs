//! Raffle configuration and lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::RaffleId;
use crate::error::EngineError;

/// Maximum length of a raffle display name.
pub const MAX_RAFFLE_NAME_LEN: usize = 150;

/// Maximum length of a raffle description.
pub const MAX_DESCRIPTION_LEN: usize = 2_000;

/// Upper bound for the configured winner count.
pub const MAX_WINNER_COUNT: u32 = 10_000;

/// Lifecycle status of a raffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RaffleStatus {
    /// Accepting registrations and draws.
    Active,
    /// Registrations closed; draws still allowed.
    Paused,
    /// Terminal state. No registrations, no draws.
    Finished,
}

impl RaffleStatus {
    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Finished => "finished",
        }
    }

    /// Whether the public form may register new participants.
    #[must_use]
    pub const fn accepts_registrations(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether draws and reversals may run.
    #[must_use]
    pub const fn accepts_draws(self) -> bool {
        !matches!(self, Self::Finished)
    }

    /// Checks that moving from `self` to `next` is a legal transition.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] when leaving `finished`.
    pub fn check_transition(self, next: Self) -> Result<(), EngineError> {
        if self == Self::Finished && next != Self::Finished {
            return Err(EngineError::InvalidRequest(format!(
                "raffle is finished and cannot become {next}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for RaffleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RaffleStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "finished" => Ok(Self::Finished),
            other => Err(EngineError::Internal(format!(
                "unknown raffle status {other:?}"
            ))),
        }
    }
}

/// How the registration form treats an optional participant field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldRequirement {
    /// Not collected. Submitted values are discarded.
    Hidden,
    /// Collected when present.
    #[default]
    Optional,
    /// Must be present and valid.
    Required,
}

impl FieldRequirement {
    /// Whether the field is shown on the form at all.
    #[must_use]
    pub const fn is_collected(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// Per-raffle registration field configuration. The name is always required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldConfig {
    /// National identity document number.
    #[serde(default = "hidden")]
    pub national_id: FieldRequirement,
    /// Phone number.
    #[serde(default)]
    pub phone: FieldRequirement,
    /// Email address.
    #[serde(default)]
    pub email: FieldRequirement,
}

const fn hidden() -> FieldRequirement {
    FieldRequirement::Hidden
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            national_id: FieldRequirement::Hidden,
            phone: FieldRequirement::Optional,
            email: FieldRequirement::Optional,
        }
    }
}

/// A configured giveaway.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Raffle {
    /// Raffle identifier.
    pub id: RaffleId,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Configured number of winners per draw (`k`).
    pub winner_count: u32,
    /// Registration field requirements.
    pub fields: FieldConfig,
    /// Lifecycle status.
    pub status: RaffleStatus,
    /// Administrator who created the raffle.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
    /// Timestamp of the last winner-count change (creation time if never changed).
    pub config_updated_at: DateTime<Utc>,
}

/// Validated input for creating a raffle.
#[derive(Debug, Clone)]
pub struct NewRaffle {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Configured winner count.
    pub winner_count: u32,
    /// Registration field requirements.
    pub fields: FieldConfig,
}

impl NewRaffle {
    /// Validates and normalizes raw raffle settings.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for a blank or overlong name,
    /// an overlong description, or a winner count outside
    /// `1..=MAX_WINNER_COUNT`.
    pub fn new(
        name: &str,
        description: Option<&str>,
        winner_count: u32,
        fields: FieldConfig,
    ) -> Result<Self, EngineError> {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        if name.is_empty() {
            return Err(EngineError::validation("name", "is required"));
        }
        if name.chars().count() > MAX_RAFFLE_NAME_LEN {
            return Err(EngineError::validation(
                "name",
                format!("must be at most {MAX_RAFFLE_NAME_LEN} characters"),
            ));
        }
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if let Some(d) = &description
            && d.chars().count() > MAX_DESCRIPTION_LEN
        {
            return Err(EngineError::validation(
                "description",
                format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
            ));
        }
        validate_winner_count(winner_count)?;
        Ok(Self {
            name,
            description,
            winner_count,
            fields,
        })
    }
}

/// Checks a configured winner count.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when outside `1..=MAX_WINNER_COUNT`.
pub fn validate_winner_count(winner_count: u32) -> Result<(), EngineError> {
    if winner_count == 0 || winner_count > MAX_WINNER_COUNT {
        return Err(EngineError::validation(
            "winner_count",
            format!("must be between 1 and {MAX_WINNER_COUNT}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            RaffleStatus::Active,
            RaffleStatus::Paused,
            RaffleStatus::Finished,
        ] {
            let Ok(parsed) = status.as_str().parse::<RaffleStatus>() else {
                panic!("status should parse");
            };
            assert_eq!(parsed, status);
        }
        assert!("archived".parse::<RaffleStatus>().is_err());
    }

    #[test]
    fn finished_is_terminal() {
        assert!(RaffleStatus::Active.check_transition(RaffleStatus::Paused).is_ok());
        assert!(RaffleStatus::Paused.check_transition(RaffleStatus::Active).is_ok());
        assert!(RaffleStatus::Paused.check_transition(RaffleStatus::Finished).is_ok());
        assert!(RaffleStatus::Finished.check_transition(RaffleStatus::Active).is_err());
        assert!(RaffleStatus::Finished.check_transition(RaffleStatus::Finished).is_ok());
    }

    #[test]
    fn paused_raffles_still_draw() {
        assert!(!RaffleStatus::Paused.accepts_registrations());
        assert!(RaffleStatus::Paused.accepts_draws());
        assert!(!RaffleStatus::Finished.accepts_draws());
    }

    #[test]
    fn new_raffle_collapses_name_whitespace() {
        let Ok(raffle) = NewRaffle::new("  Summer   Giveaway ", Some("  "), 3, FieldConfig::default())
        else {
            panic!("valid raffle");
        };
        assert_eq!(raffle.name, "Summer Giveaway");
        assert!(raffle.description.is_none());
    }

    #[test]
    fn new_raffle_rejects_zero_winners() {
        let result = NewRaffle::new("Giveaway", None, 0, FieldConfig::default());
        assert!(matches!(
            result,
            Err(EngineError::Validation { ref field, .. }) if field == "winner_count"
        ));
    }

    #[test]
    fn field_config_defaults_when_fields_missing() {
        let Ok(config) = serde_json::from_str::<FieldConfig>(r#"{"phone":"required"}"#) else {
            panic!("config should parse");
        };
        assert_eq!(config.national_id, FieldRequirement::Hidden);
        assert_eq!(config.phone, FieldRequirement::Required);
        assert_eq!(config.email, FieldRequirement::Optional);
    }
}
