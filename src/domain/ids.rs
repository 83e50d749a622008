//! Type-safe identifiers for raffles, participants and draw events.
//!
//! Each identifier is a newtype wrapper around [`uuid::Uuid`] (v4) so that a
//! participant id can never be passed where a raffle id is expected. The
//! wrappers are transparent for serde and sqlx, so they serialize as plain
//! UUID strings and are stored as the UUID blob.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            sqlx::Type,
            ToSchema,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wraps an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Unique identifier of a raffle.
    RaffleId
);

uuid_id!(
    /// Unique identifier of a registered participant.
    ///
    /// A participant belongs to exactly one raffle for its whole lifetime.
    ParticipantId
);

uuid_id!(
    /// Unique identifier of one committed draw execution.
    ///
    /// Every result row written by the same commit carries the same
    /// `DrawEventId`; reversal removes all rows sharing it.
    DrawEventId
);

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(RaffleId::new(), RaffleId::new());
        assert_ne!(ParticipantId::new(), ParticipantId::new());
        assert_ne!(DrawEventId::new(), DrawEventId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let s = format!("{}", ParticipantId::new());
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn serializes_as_plain_uuid_string() {
        let uuid = uuid::Uuid::new_v4();
        let id = DrawEventId::from_uuid(uuid);
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, format!("\"{uuid}\""));
    }

    #[test]
    fn from_uuid_round_trip() {
        let uuid = uuid::Uuid::new_v4();
        let id = RaffleId::from(uuid);
        assert_eq!(*id.as_uuid(), uuid);
        assert_eq!(uuid::Uuid::from(id), uuid);
    }
}
