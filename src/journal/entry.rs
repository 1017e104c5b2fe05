use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One journal record. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub title: String,
    /// Free text; may carry markup, which is never interpreted.
    pub body: String,
    #[serde(rename = "date", with = "iso8601")]
    pub created_at: OffsetDateTime,
}

impl Entry {
    pub fn new(title: impl Into<String>, body: impl Into<String>, created_at: OffsetDateTime) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            created_at,
        }
    }
}

bitflags! {
    /// Fields that failed validation on the last submit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InvalidFields: u8 {
        const TITLE = 0b01;
        const BODY = 0b10;
    }
}

impl InvalidFields {
    pub fn describe(self) -> &'static str {
        if self.contains(InvalidFields::TITLE | InvalidFields::BODY) {
            "title and body are required"
        } else if self.contains(InvalidFields::TITLE) {
            "title is required"
        } else if self.contains(InvalidFields::BODY) {
            "body is required"
        } else {
            "no invalid fields"
        }
    }
}

/// Only emptiness is checked; whitespace counts as content.
pub fn validate(title: &str, body: &str) -> Result<(), InvalidFields> {
    let mut invalid = InvalidFields::empty();
    if title.is_empty() {
        invalid |= InvalidFields::TITLE;
    }
    if body.is_empty() {
        invalid |= InvalidFields::BODY;
    }
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(invalid)
    }
}

/// Current UTC time at millisecond precision, the resolution the blob has
/// always carried.
pub fn now_millis() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_millisecond(now.millisecond()).unwrap_or(now)
}

mod iso8601 {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::Rfc3339;
    use time::OffsetDateTime;

    pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&raw, &Rfc3339).map_err(serde::de::Error::custom)
    }
}
