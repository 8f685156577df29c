//! Help requests and their lifecycle states.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::text::{TextRuleError, bounded_text, image_url};
use super::{MemberId, RequestId};

/// Minutes after creation during which an unengaged request may be deleted.
pub const DELETION_WINDOW_MINUTES: i64 = 5;
/// Default lifetime of a request.
pub const DEFAULT_EXPIRY_HOURS: u32 = 24;
/// Longest lifetime a caller may ask for.
pub const MAX_EXPIRY_HOURS: u32 = 168;

const TITLE_MIN: usize = 5;
const TITLE_MAX: usize = 200;
const DESCRIPTION_MIN: usize = 10;
const DESCRIPTION_MAX: usize = 1000;
const LOCATION_HINT_MAX: usize = 200;

/// Lifecycle state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    Open,
    InProgress,
    Fulfilled,
    Cancelled,
    /// Never stored; derived at read time once `expires_at` has passed.
    Expired,
}

impl RequestStatus {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Fulfilled => "fulfilled",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $(
                #[doc = $text]
                $variant,
            )+
        }

        impl $name {
            /// Stable storage and wire representation.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err($crate::domain::UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

pub(crate) use string_enum;

/// Raised when an enumerated field receives an unknown value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl std::str::FromStr for RequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in-progress" | "in_progress" => Ok(Self::InProgress),
            "fulfilled" => Ok(Self::Fulfilled),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            _ => Err(UnknownVariant {
                kind: "RequestStatus",
                value: s.to_owned(),
            }),
        }
    }
}

string_enum!(
    /// Topic of a request.
    Category {
        Academic => "academic",
        Technical => "technical",
        General => "general",
        Hostel => "hostel",
        Campus => "campus",
        Other => "other",
    } default General
);

string_enum!(
    /// How quickly help is needed.
    Urgency {
        Normal => "normal",
        Urgent => "urgent",
        Critical => "critical",
    } default Normal
);

string_enum!(
    /// Preferred contact channel once a helper is found.
    ContactPreference {
        Chat => "chat",
        Call => "call",
    } default Chat
);

/// Validated lifetime of a request in hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryHours(u32);

impl ExpiryHours {
    /// Accept lifetimes between one hour and [`MAX_EXPIRY_HOURS`].
    pub fn new(hours: u32) -> Result<Self, RequestValidationError> {
        if (1..=MAX_EXPIRY_HOURS).contains(&hours) {
            Ok(Self(hours))
        } else {
            Err(RequestValidationError::ExpiryOutOfRange {
                min: 1,
                max: MAX_EXPIRY_HOURS,
            })
        }
    }

    /// Lifetime as a time delta.
    pub fn as_delta(self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.0))
    }

    /// Raw number of hours.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for ExpiryHours {
    fn default() -> Self {
        Self(DEFAULT_EXPIRY_HOURS)
    }
}

/// Validation failures for request fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestValidationError {
    /// A text or URL rule failed.
    #[error(transparent)]
    Text(#[from] TextRuleError),
    /// The requested lifetime is outside the supported range.
    #[error("expiryHours must be between {min} and {max}")]
    ExpiryOutOfRange { min: u32, max: u32 },
}

impl RequestValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Text(rule) => rule.field(),
            Self::ExpiryOutOfRange { .. } => "expiryHours",
        }
    }
}

/// Owner-editable fields of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub urgency: Urgency,
    pub contact: ContactPreference,
    pub location_hint: Option<String>,
    pub image_url: Option<String>,
}

/// Unvalidated request fields as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDraft {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub urgency: Option<Urgency>,
    pub contact: Option<ContactPreference>,
    pub location_hint: Option<String>,
    pub image_url: Option<String>,
    /// Requested lifetime; `None` uses the configured default.
    pub expiry_hours: Option<u32>,
}

fn location_hint(raw: Option<&str>) -> Result<Option<String>, TextRuleError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(hint) => bounded_text("locationHint", hint, 1, LOCATION_HINT_MAX).map(Some),
    }
}

impl RequestDraft {
    /// Resolve the requested lifetime against `default`.
    pub fn expiry(&self, default: ExpiryHours) -> Result<ExpiryHours, RequestValidationError> {
        self.expiry_hours.map_or(Ok(default), ExpiryHours::new)
    }

    /// Validate the draft into request details.
    pub fn validate(self) -> Result<RequestDetails, RequestValidationError> {
        Ok(RequestDetails {
            title: bounded_text("title", &self.title, TITLE_MIN, TITLE_MAX)?,
            description: bounded_text(
                "description",
                &self.description,
                DESCRIPTION_MIN,
                DESCRIPTION_MAX,
            )?,
            category: self.category.unwrap_or_default(),
            urgency: self.urgency.unwrap_or_default(),
            contact: self.contact.unwrap_or_default(),
            location_hint: location_hint(self.location_hint.as_deref())?,
            image_url: self
                .image_url
                .as_deref()
                .map(|raw| image_url("imageUrl", raw))
                .transpose()?,
        })
    }
}

/// Allowlisted partial update of a request.
///
/// An empty `location_hint` clears the hint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub urgency: Option<Urgency>,
    pub location_hint: Option<String>,
}

impl RequestEdit {
    /// Whether the edit changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the edit to existing details, validating touched fields.
    pub fn apply(self, current: &RequestDetails) -> Result<RequestDetails, RequestValidationError> {
        let mut next = current.clone();
        if let Some(title) = self.title {
            next.title = bounded_text("title", &title, TITLE_MIN, TITLE_MAX)?;
        }
        if let Some(description) = self.description {
            next.description =
                bounded_text("description", &description, DESCRIPTION_MIN, DESCRIPTION_MAX)?;
        }
        if let Some(category) = self.category {
            next.category = category;
        }
        if let Some(urgency) = self.urgency {
            next.urgency = urgency;
        }
        if let Some(hint) = self.location_hint {
            next.location_hint = location_hint(Some(&hint))?;
        }
        Ok(next)
    }
}

/// A help ask owned by exactly one member.
///
/// ## Invariants
/// - `accepted_helper` is set iff the stored status is in-progress or
///   fulfilled.
/// - The stored status is never [`RequestStatus::Expired`]; expiry is
///   derived with [`HelpRequest::effective_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpRequest {
    pub id: RequestId,
    pub requested_by: MemberId,
    #[serde(flatten)]
    pub details: RequestDetails,
    pub status: RequestStatus,
    pub accepted_helper: Option<MemberId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub fulfilled_at: Option<DateTime<Utc>>,
}

impl HelpRequest {
    /// Create a new open request.
    pub fn open(
        requested_by: MemberId,
        details: RequestDetails,
        expiry: ExpiryHours,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RequestId::random(),
            requested_by,
            details,
            status: RequestStatus::Open,
            accepted_helper: None,
            created_at: now,
            updated_at: now,
            expires_at: now + expiry.as_delta(),
            fulfilled_at: None,
        }
    }

    /// Status as observed at `now`.
    pub fn effective_status(&self, now: DateTime<Utc>) -> RequestStatus {
        if self.status == RequestStatus::Open && now >= self.expires_at {
            RequestStatus::Expired
        } else {
            self.status
        }
    }

    /// Replace the stored status with the effective one for presentation.
    pub fn observed_at(mut self, now: DateTime<Utc>) -> Self {
        self.status = self.effective_status(now);
        self
    }

    /// Whether `member` owns the request.
    pub fn is_owned_by(&self, member: MemberId) -> bool {
        self.requested_by == member
    }

    /// Earliest instant at which deletion is no longer allowed.
    pub fn deletion_deadline(&self) -> DateTime<Utc> {
        self.created_at + TimeDelta::minutes(DELETION_WINDOW_MINUTES)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
