//! Strongly typed identifiers for marketplace entities.

use uuid::Uuid;

/// Raised when an identifier fails to parse as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct InvalidId {
    kind: &'static str,
}

impl InvalidId {
    /// Human-readable name of the identifier that failed to parse.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! define_uuid_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identifier from its textual UUID form.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidId> {
                let raw = raw.as_ref();
                if raw.trim() != raw {
                    return Err(InvalidId { kind: $kind });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| InvalidId { kind: $kind })
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

define_uuid_id!(
    /// Identifier of a marketplace member.
    MemberId => "member id"
);
define_uuid_id!(
    /// Identifier of a help request.
    RequestId => "request id"
);
define_uuid_id!(
    /// Identifier of a response (help offer).
    ResponseId => "response id"
);
define_uuid_id!(
    /// Identifier of a two-party chat.
    ChatId => "chat id"
);
define_uuid_id!(
    /// Identifier of a chat message.
    MessageId => "message id"
);
define_uuid_id!(
    /// Identifier of a report lodged against a member.
    ReportId => "report id"
);
define_uuid_id!(
    /// Identifier of a notification.
    NotificationId => "notification id"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_canonical_uuid() {
        let id = MemberId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn rejects_malformed_input(#[case] raw: &str) {
        let err = RequestId::new(raw).expect_err("malformed id");
        assert_eq!(err.kind(), "request id");
    }

    #[rstest]
    fn serialises_as_bare_string() {
        let id = ChatId::random();
        let value = serde_json::to_value(id).expect("serialise");
        assert_eq!(value, serde_json::Value::String(id.to_string()));
    }
}
