//! Shared validation helpers for inbound HTTP payloads.
//!
//! Every helper produces an `invalid_request` error carrying the offending
//! field and a stable machine-readable code in `details`, so clients get
//! uniform field-level feedback across endpoints.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::EventOrdering;
use crate::domain::{Error, Rating, RsvpStatus};

/// Validation error codes attached to request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidChoice,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidChoice => "invalid_choice",
            Self::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: Option<&str>) -> Error {
    let mut details = json!({
        "field": field.as_str(),
        "code": code.as_str(),
    });
    if let (Some(value), Some(map)) = (value, details.as_object_mut()) {
        map.insert("value".into(), json!(value));
    }
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("missing required field: {name}"),
        ErrorCode::MissingField,
        None,
    )
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        let name = field.as_str();
        field_error(
            field,
            format!("{name} must be a valid UUID"),
            ErrorCode::InvalidUuid,
            Some(value),
        )
    })
}

pub(crate) fn parse_uuid_list(values: &[String], field: FieldName) -> Result<Vec<Uuid>, Error> {
    values.iter().map(|value| parse_uuid(value, field)).collect()
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| {
            let name = field.as_str();
            field_error(
                field,
                format!("{name} must be an RFC 3339 timestamp"),
                ErrorCode::InvalidTimestamp,
                Some(value),
            )
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

pub(crate) fn parse_rsvp_status(value: &str, field: FieldName) -> Result<RsvpStatus, Error> {
    RsvpStatus::from_str(value).map_err(|err| {
        field_error(field, err.to_string(), ErrorCode::InvalidChoice, Some(value))
    })
}

pub(crate) fn parse_rating(value: i16, field: FieldName) -> Result<Rating, Error> {
    Rating::new(value).map_err(|err| {
        field_error(
            field,
            err.to_string(),
            ErrorCode::OutOfRange,
            Some(&value.to_string()),
        )
    })
}

pub(crate) fn parse_ordering(
    value: Option<&str>,
    field: FieldName,
) -> Result<EventOrdering, Error> {
    match value {
        None => Ok(EventOrdering::default()),
        Some(raw) => EventOrdering::from_str(raw).map_err(|err| {
            field_error(field, err.to_string(), ErrorCode::InvalidChoice, Some(raw))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_errors_carry_field_details() {
        let err = parse_uuid("nope", FieldName::new("organizer")).expect_err("must fail");
        let details = err.details.expect("details attached");
        assert_eq!(details["field"], "organizer");
        assert_eq!(details["code"], "invalid_uuid");
        assert_eq!(details["value"], "nope");
    }

    #[test]
    fn timestamps_parse_to_utc() {
        let parsed = parse_rfc3339_timestamp("2030-01-01T10:00:00+02:00", FieldName::new("startTime"))
            .expect("valid timestamp");
        assert_eq!(parsed.to_rfc3339(), "2030-01-01T08:00:00+00:00");
        assert!(parse_rfc3339_timestamp("January", FieldName::new("startTime")).is_err());
    }

    #[test]
    fn ratings_out_of_range_carry_codes() {
        assert!(parse_rating(1, FieldName::new("rating")).is_ok());
        assert!(parse_rating(5, FieldName::new("rating")).is_ok());
        for bad in [0, 6] {
            let err = parse_rating(bad, FieldName::new("rating")).expect_err("must fail");
            let details = err.details.expect("details attached");
            assert_eq!(details["code"], "out_of_range");
        }
    }

    #[test]
    fn ordering_defaults_when_absent() {
        let ordering = parse_ordering(None, FieldName::new("ordering")).expect("default");
        assert_eq!(ordering, EventOrdering::StartTimeDesc);
        assert!(parse_ordering(Some("upside_down"), FieldName::new("ordering")).is_err());
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let err = missing_field_error(FieldName::new("startTime"));
        assert!(err.message.contains("startTime"));
    }
}
