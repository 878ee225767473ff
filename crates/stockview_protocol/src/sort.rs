//! Sort descriptors and the sort-token codec.
//!
//! A sort token is the single string the list API accepts for ordering,
//! formed as `{field}_{asc|desc}`. The codec always emits the direction
//! explicitly so that decoding is a left inverse of encoding for every
//! descriptor, including fields that themselves contain underscores.
//!
//! Tokens without a recognised direction suffix (such as `time` or
//! `rating_to`) decode to the whole token as the field with
//! [`SortDirection::Descending`].

use crate::error::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field used when no sort is requested.
pub const DEFAULT_SORT_FIELD: &str = "time";

/// Sort tokens the backend is known to accept.
///
/// Advisory: used for input validation only, never by [`encode`] or [`decode`].
pub const KNOWN_SORT_TOKENS: &[&str] = &[
    "time",
    "ticker_asc",
    "ticker_desc",
    "rating_to",
    "change_percent_asc",
    "change_percent_desc",
];

/// Ordering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first.
    #[serde(rename = "asc")]
    Ascending,
    /// Largest first.
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Returns the wire suffix (`asc` or `desc`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    /// Parses an exact wire suffix.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "asc" => Some(SortDirection::Ascending),
            "desc" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field and direction to order the list by.
///
/// The field is never empty, so every descriptor survives an
/// encode/decode round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "SortParts")]
pub struct SortDescriptor {
    field: String,
    direction: SortDirection,
}

#[derive(Deserialize)]
struct SortParts {
    #[serde(default)]
    field: String,
    #[serde(default)]
    direction: SortDirection,
}

impl From<SortParts> for SortDescriptor {
    fn from(parts: SortParts) -> Self {
        Self::new(parts.field, parts.direction)
    }
}

impl SortDescriptor {
    /// Creates a new descriptor.
    ///
    /// An empty field falls back to [`DEFAULT_SORT_FIELD`].
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        let field = field.into();
        let field = if field.is_empty() {
            DEFAULT_SORT_FIELD.to_string()
        } else {
            field
        };
        Self { field, direction }
    }

    /// Ascending order on `field`.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    /// Descending order on `field`.
    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }

    /// Field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Ordering direction.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Encodes this descriptor as a sort token.
    pub fn to_token(&self) -> String {
        encode(self)
    }
}

impl Default for SortDescriptor {
    fn default() -> Self {
        Self::descending(DEFAULT_SORT_FIELD)
    }
}

impl fmt::Display for SortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.field, self.direction)
    }
}

/// Encodes a descriptor as `{field}_{direction}`.
pub fn encode(descriptor: &SortDescriptor) -> String {
    descriptor.to_string()
}

/// Decodes a sort token.
///
/// Fails only for the empty token. Any other string decodes: when the final
/// `_`-delimited segment is not exactly `asc` or `desc`, the whole token is the
/// field and the direction is descending.
pub fn decode(token: &str) -> ProtocolResult<SortDescriptor> {
    if token.is_empty() {
        return Err(ProtocolError::InvalidSortToken(token.to_string()));
    }

    if let Some((field, suffix)) = token.rsplit_once('_') {
        if !field.is_empty() {
            if let Some(direction) = SortDirection::from_suffix(suffix) {
                return Ok(SortDescriptor {
                    field: field.to_string(),
                    direction,
                });
            }
        }
    }

    Ok(SortDescriptor {
        field: token.to_string(),
        direction: SortDirection::Descending,
    })
}

/// Decodes a token, using the default descriptor for an empty one.
pub fn decode_or_default(token: &str) -> SortDescriptor {
    decode(token).unwrap_or_default()
}

/// Returns true if the backend is known to accept `token`.
pub fn is_known_sort_token(token: &str) -> bool {
    KNOWN_SORT_TOKENS.contains(&token)
}

/// Advisory validation for user-supplied tokens.
pub fn validate_sort_token(token: &str) -> ProtocolResult<()> {
    if is_known_sort_token(token) {
        Ok(())
    } else {
        Err(ProtocolError::InvalidSortToken(token.to_string()))
    }
}
