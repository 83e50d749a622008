//! Participant registration: raw form input, validation, and the identity
//! key used for per-raffle deduplication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::raffle::{FieldRequirement, Raffle};
use super::{ParticipantId, RaffleId};
use crate::error::EngineError;

/// Maximum length of a participant name.
pub const MAX_NAME_LEN: usize = 120;

/// Maximum number of free-form extra fields.
pub const MAX_EXTRA_FIELDS: usize = 20;

/// Maximum length of an extra field key.
pub const MAX_EXTRA_KEY_LEN: usize = 64;

const MAX_EMAIL_LEN: usize = 254;

/// Raw fields submitted through the public registration form.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegistrationForm {
    /// Full name. Always required.
    #[serde(default)]
    pub name: String,
    /// Phone number in any common notation.
    #[serde(default)]
    pub phone: Option<String>,
    /// National identity document number.
    #[serde(default)]
    pub national_id: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Additional raffle-specific answers.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Identifying key used to detect duplicate registrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityKey {
    /// Normalized national identity number.
    NationalId(String),
    /// Case-folded name plus phone digits (empty when no phone given).
    NamePhone {
        /// Lower-cased, whitespace-collapsed name.
        name: String,
        /// Phone digits.
        phone: String,
    },
}

impl IdentityKey {
    /// Returns the string stored in the `identity_key` column.
    #[must_use]
    pub fn as_db_key(&self) -> String {
        match self {
            Self::NationalId(nid) => format!("nid:{nid}"),
            Self::NamePhone { name, phone } => format!("np:{name}|{phone}"),
        }
    }

    /// User-facing message reported when the key is already registered.
    #[must_use]
    pub fn duplicate_message(&self) -> String {
        match self {
            Self::NationalId(_) => {
                "a participant with this national id is already registered in this raffle"
                    .to_string()
            }
            Self::NamePhone { .. } => {
                "a participant with this name and phone is already registered in this raffle"
                    .to_string()
            }
        }
    }
}

/// Registration that passed validation for a specific raffle.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    /// Owning raffle.
    pub raffle_id: RaffleId,
    /// Whitespace-collapsed name.
    pub name: String,
    /// Phone digits (a leading `+` is kept).
    pub phone: Option<String>,
    /// Upper-cased alphanumeric national id.
    pub national_id: Option<String>,
    /// Lower-cased email address.
    pub email: Option<String>,
    /// Extra fields.
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Deduplication key.
    pub identity: IdentityKey,
}

impl NewParticipant {
    /// Validates a registration form against the raffle's field configuration.
    ///
    /// Values for fields the raffle does not collect are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] naming the first offending field.
    pub fn validate(raffle: &Raffle, form: RegistrationForm) -> Result<Self, EngineError> {
        let name = collapse_whitespace(&form.name);
        if name.is_empty() {
            return Err(EngineError::validation("name", "is required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(EngineError::validation(
                "name",
                format!("must be at most {MAX_NAME_LEN} characters"),
            ));
        }

        let phone = collect(
            "phone",
            raffle.fields.phone,
            form.phone.as_deref(),
            normalize_phone,
        )?;
        let national_id = collect(
            "national_id",
            raffle.fields.national_id,
            form.national_id.as_deref(),
            normalize_national_id,
        )?;
        let email = collect(
            "email",
            raffle.fields.email,
            form.email.as_deref(),
            normalize_email,
        )?;

        if form.extra.len() > MAX_EXTRA_FIELDS {
            return Err(EngineError::validation(
                "extra",
                format!("at most {MAX_EXTRA_FIELDS} extra fields are accepted"),
            ));
        }
        if let Some(key) = form
            .extra
            .keys()
            .find(|k| k.trim().is_empty() || k.chars().count() > MAX_EXTRA_KEY_LEN)
        {
            return Err(EngineError::validation(
                "extra",
                format!("invalid field name {key:?}"),
            ));
        }

        let identity = match &national_id {
            Some(nid) => IdentityKey::NationalId(nid.clone()),
            None => IdentityKey::NamePhone {
                name: name.to_lowercase(),
                phone: phone
                    .as_deref()
                    .map(|p| p.trim_start_matches('+').to_string())
                    .unwrap_or_default(),
            },
        };

        Ok(Self {
            raffle_id: raffle.id,
            name,
            phone,
            national_id,
            email,
            extra: form.extra,
            identity,
        })
    }
}

/// A stored registrant.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Participant {
    /// Participant identifier.
    pub id: ParticipantId,
    /// Owning raffle.
    pub raffle_id: RaffleId,
    /// Name as registered.
    pub name: String,
    /// Normalized phone.
    pub phone: Option<String>,
    /// Normalized national id.
    pub national_id: Option<String>,
    /// Normalized email.
    pub email: Option<String>,
    /// Extra fields.
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// `false` once an administrator deactivated the registration.
    pub active: bool,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// One page of a raffle's participants, in registration order.
#[derive(Debug, Clone)]
pub struct ParticipantPage {
    /// Participants on this page.
    pub participants: Vec<Participant>,
    /// Participants in the raffle across all pages.
    pub total: u64,
}

fn collect(
    field: &str,
    requirement: FieldRequirement,
    raw: Option<&str>,
    normalize: fn(&str) -> Result<String, String>,
) -> Result<Option<String>, EngineError> {
    if !requirement.is_collected() {
        return Ok(None);
    }
    let value = raw.map(str::trim).filter(|v| !v.is_empty());
    match (value, requirement) {
        (None, FieldRequirement::Required) => Err(EngineError::validation(field, "is required")),
        (None, _) => Ok(None),
        (Some(v), _) => normalize(v)
            .map(Some)
            .map_err(|message| EngineError::validation(field, message)),
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_phone(raw: &str) -> Result<String, String> {
    let (prefix, rest) = match raw.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", raw),
    };
    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return Err("may only contain digits and separators".to_string()),
        }
    }
    if !(7..=15).contains(&digits.len()) {
        return Err("must contain 7 to 15 digits".to_string());
    }
    Ok(format!("{prefix}{digits}"))
}

fn normalize_national_id(raw: &str) -> Result<String, String> {
    let mut id = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => id.push(c.to_ascii_uppercase()),
            ' ' | '.' | '-' => {}
            _ => return Err("may only contain letters and digits".to_string()),
        }
    }
    if !(4..=20).contains(&id.len()) {
        return Err("must contain 4 to 20 letters or digits".to_string());
    }
    Ok(id)
}

fn normalize_email(raw: &str) -> Result<String, String> {
    let email = raw.to_lowercase();
    if email.len() > MAX_EMAIL_LEN {
        return Err(format!("must be at most {MAX_EMAIL_LEN} characters"));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err("must be a valid email address".to_string());
    };
    let valid = !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace);
    if !valid {
        return Err("must be a valid email address".to_string());
    }
    Ok(email)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::raffle::{FieldConfig, RaffleStatus};

    fn raffle(fields: FieldConfig) -> Raffle {
        let now = Utc::now();
        Raffle {
            id: RaffleId::new(),
            name: "Giveaway".to_string(),
            description: None,
            winner_count: 1,
            fields,
            status: RaffleStatus::Active,
            created_by: "admin".to_string(),
            created_at: now,
            updated_at: now,
            config_updated_at: now,
        }
    }

    fn form(name: &str, phone: Option<&str>, national_id: Option<&str>) -> RegistrationForm {
        RegistrationForm {
            name: name.to_string(),
            phone: phone.map(str::to_string),
            national_id: national_id.map(str::to_string),
            ..RegistrationForm::default()
        }
    }

    #[test]
    fn name_is_always_required() {
        let result = NewParticipant::validate(&raffle(FieldConfig::default()), form("   ", None, None));
        assert!(matches!(
            result,
            Err(EngineError::Validation { ref field, .. }) if field == "name"
        ));
    }

    #[test]
    fn required_field_must_be_present() {
        let fields = FieldConfig {
            national_id: FieldRequirement::Required,
            ..FieldConfig::default()
        };
        let result = NewParticipant::validate(&raffle(fields), form("Ana Ruiz", None, Some(" ")));
        assert!(matches!(
            result,
            Err(EngineError::Validation { ref field, .. }) if field == "national_id"
        ));
    }

    #[test]
    fn hidden_fields_are_discarded() {
        let Ok(p) = NewParticipant::validate(
            &raffle(FieldConfig::default()),
            form("Ana Ruiz", Some("555 123 4567"), Some("X1234567")),
        ) else {
            panic!("valid registration");
        };
        assert!(p.national_id.is_none());
        assert_eq!(
            p.identity,
            IdentityKey::NamePhone {
                name: "ana ruiz".to_string(),
                phone: "5551234567".to_string(),
            }
        );
    }

    #[test]
    fn national_id_drives_identity_when_collected() {
        let fields = FieldConfig {
            national_id: FieldRequirement::Optional,
            ..FieldConfig::default()
        };
        let Ok(p) =
            NewParticipant::validate(&raffle(fields), form("Ana", None, Some("12.345.678-k")))
        else {
            panic!("valid registration");
        };
        assert_eq!(p.national_id.as_deref(), Some("12345678K"));
        assert_eq!(p.identity.as_db_key(), "nid:12345678K");
    }

    #[test]
    fn name_phone_identity_ignores_case_and_spacing() {
        let config = raffle(FieldConfig::default());
        let Ok(a) = NewParticipant::validate(&config, form("Ana  Ruiz", Some("+1 (555) 123-4567"), None))
        else {
            panic!("valid registration");
        };
        let Ok(b) = NewParticipant::validate(&config, form("ana ruiz", Some("15551234567"), None))
        else {
            panic!("valid registration");
        };
        assert_eq!(a.identity, b.identity);
        assert_eq!(a.phone.as_deref(), Some("+15551234567"));
    }

    #[test]
    fn rejects_bad_phone_and_email() {
        let config = raffle(FieldConfig::default());
        assert!(NewParticipant::validate(&config, form("Ana", Some("12ab"), None)).is_err());
        assert!(NewParticipant::validate(&config, form("Ana", Some("123"), None)).is_err());

        let mut bad_email = form("Ana", None, None);
        bad_email.email = Some("ana@localhost".to_string());
        assert!(matches!(
            NewParticipant::validate(&config, bad_email),
            Err(EngineError::Validation { ref field, .. }) if field == "email"
        ));

        let mut good_email = form("Ana", None, None);
        good_email.email = Some(" Ana@Example.ORG ".to_string());
        let Ok(p) = NewParticipant::validate(&config, good_email) else {
            panic!("valid email");
        };
        assert_eq!(p.email.as_deref(), Some("ana@example.org"));
    }

    #[test]
    fn limits_extra_fields() {
        let config = raffle(FieldConfig::default());
        let mut f = form("Ana", None, None);
        for i in 0..=MAX_EXTRA_FIELDS {
            f.extra.insert(format!("q{i}"), serde_json::Value::Bool(true));
        }
        assert!(NewParticipant::validate(&config, f).is_err());
    }
}
