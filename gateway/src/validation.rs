//! Syntactic checks applied to request bodies before forwarding.
//!
//! Payloads are decoded into permissive shapes where every field is optional,
//! so a missing field and an ill-formed one produce distinct messages. The
//! original bytes are what gets forwarded; these types never reach the server.

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::GatewayError;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Local part, then one or more dot-separated domain labels.
        let pattern = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Decode a JSON request body.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] when the bytes are not the expected JSON.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, GatewayError> {
    serde_json::from_slice(body)
        .map_err(|err| GatewayError::validation(format!("malformed request body: {err}")))
}

fn require_text(value: Option<&str>, field: &str) -> Result<(), GatewayError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(GatewayError::validation(format!("{field} must not be blank"))),
    }
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, GatewayError> {
    value.ok_or_else(|| GatewayError::validation(format!("{field} is required")))
}

fn check_email(email: &str) -> Result<(), GatewayError> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(GatewayError::validation(format!(
            "email must be a well-formed address, got {email:?}"
        )))
    }
}

fn parse_instant(raw: &str, field: &str) -> Result<NaiveDateTime, GatewayError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map_err(|_| {
            GatewayError::validation(format!(
                "{field} must be a local date-time such as 2024-07-01T10:00:00, got {raw:?}"
            ))
        })
}

/// `POST /users` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUserPayload {
    /// Display name.
    pub name: Option<String>,
    /// Contact address.
    pub email: Option<String>,
}

impl NewUserPayload {
    /// Require a non-blank name and a well-formed e-mail.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] naming the first failing field.
    pub fn validate(&self) -> Result<(), GatewayError> {
        require_text(self.name.as_deref(), "name")?;
        check_email(require(self.email.as_deref(), "email")?)
    }
}

/// `PATCH /users/{id}` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatchPayload {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement contact address.
    pub email: Option<String>,
}

impl UserPatchPayload {
    /// Require a well-formed e-mail when one is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] for a malformed address.
    pub fn validate(&self) -> Result<(), GatewayError> {
        self.email.as_deref().map_or(Ok(()), check_email)
    }
}

/// `POST /items` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemPayload {
    /// Short title.
    pub name: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Initial availability.
    pub available: Option<bool>,
    /// Request being fulfilled.
    pub request_id: Option<i64>,
}

impl NewItemPayload {
    /// Require name, description and availability.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] naming the first failing field.
    pub fn validate(&self) -> Result<(), GatewayError> {
        require_text(self.name.as_deref(), "name")?;
        require_text(self.description.as_deref(), "description")?;
        require(self.available, "available").map(drop)
    }
}

/// `POST /items/{id}/comment` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPayload {
    /// Comment text.
    pub text: Option<String>,
}

impl CommentPayload {
    /// Require non-blank text.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when the text is missing or blank.
    pub fn validate(&self) -> Result<(), GatewayError> {
        require_text(self.text.as_deref(), "text")
    }
}

/// `POST /requests` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRequestPayload {
    /// What the requester is looking for.
    pub description: Option<String>,
}

impl NewRequestPayload {
    /// Require a non-blank description.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when the description is missing or blank.
    pub fn validate(&self) -> Result<(), GatewayError> {
        require_text(self.description.as_deref(), "description")
    }
}

/// `POST /bookings` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookingPayload {
    /// Item to book.
    pub item_id: Option<i64>,
    /// Requested start, local date-time text.
    pub start: Option<String>,
    /// Requested end, local date-time text.
    pub end: Option<String>,
}

impl NewBookingPayload {
    /// Require an item and a window that is not in the past at `now`.
    ///
    /// Ordering between `start` and `end` is left to the server.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] naming the first failing field.
    pub fn validate(&self, now: NaiveDateTime) -> Result<(), GatewayError> {
        require(self.item_id, "itemId")?;
        let start = parse_instant(require(self.start.as_deref(), "start")?, "start")?;
        let end = parse_instant(require(self.end.as_deref(), "end")?, "end")?;
        if start < now {
            return Err(GatewayError::validation("start must not be in the past"));
        }
        if end <= now {
            return Err(GatewayError::validation("end must be in the future"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-06-01T00:00", "%Y-%m-%dT%H:%M").expect("fixture")
    }

    fn message(result: Result<(), GatewayError>) -> String {
        match result {
            Err(GatewayError::Validation { message }) => message,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[rstest]
    #[case(r#"{"email":"a@b.com"}"#, "name must not be blank")]
    #[case(r#"{"name":"  ","email":"a@b.com"}"#, "name must not be blank")]
    #[case(r#"{"name":"Ada"}"#, "email is required")]
    #[case(r#"{"name":"Ada","email":"not-an-address"}"#, "email must be a well-formed address")]
    fn new_user_failures_name_the_field(#[case] body: &str, #[case] fragment: &str) {
        let payload: NewUserPayload = decode(body.as_bytes()).expect("decodes");
        assert!(message(payload.validate()).contains(fragment));
    }

    #[rstest]
    #[case("ada@example.com")]
    #[case("grace.hopper+navy@mail.example.org")]
    #[case("root@localhost")]
    fn accepts_well_formed_addresses(#[case] email: &str) {
        let payload = NewUserPayload {
            name: Some("Ada".to_owned()),
            email: Some(email.to_owned()),
        };
        assert!(payload.validate().is_ok());
    }

    #[rstest]
    fn user_patch_only_checks_supplied_email() {
        assert!(UserPatchPayload::default().validate().is_ok());
        let bad = UserPatchPayload {
            name: None,
            email: Some("a@@b".to_owned()),
        };
        assert!(message(bad.validate()).contains("email"));
    }

    #[rstest]
    #[case(r#"{"description":"drill","available":true}"#, "name must not be blank")]
    #[case(r#"{"name":"Drill","available":true}"#, "description must not be blank")]
    #[case(r#"{"name":"Drill","description":"cordless"}"#, "available is required")]
    fn new_item_failures_name_the_field(#[case] body: &str, #[case] expected: &str) {
        let payload: NewItemPayload = decode(body.as_bytes()).expect("decodes");
        assert_eq!(message(payload.validate()), expected);
    }

    #[rstest]
    fn blank_comment_and_request_are_rejected() {
        let comment = CommentPayload {
            text: Some(" ".to_owned()),
        };
        assert_eq!(message(comment.validate()), "text must not be blank");
        assert_eq!(
            message(NewRequestPayload::default().validate()),
            "description must not be blank"
        );
    }

    #[rstest]
    #[case(r#"{"start":"2024-07-01T10:00","end":"2024-07-02T10:00"}"#, "itemId is required")]
    #[case(r#"{"itemId":1,"end":"2024-07-02T10:00"}"#, "start is required")]
    #[case(r#"{"itemId":1,"start":"2024-07-01T10:00"}"#, "end is required")]
    #[case(
        r#"{"itemId":1,"start":"2024-05-01T10:00","end":"2024-07-02T10:00"}"#,
        "start must not be in the past"
    )]
    #[case(
        r#"{"itemId":1,"start":"2024-06-01T00:00","end":"2024-06-01T00:00"}"#,
        "end must be in the future"
    )]
    fn booking_failures_name_the_field(
        now: NaiveDateTime,
        #[case] body: &str,
        #[case] expected: &str,
    ) {
        let payload: NewBookingPayload = decode(body.as_bytes()).expect("decodes");
        assert_eq!(message(payload.validate(now)), expected);
    }

    #[rstest]
    fn booking_dates_must_be_local_date_times(now: NaiveDateTime) {
        let payload = NewBookingPayload {
            item_id: Some(1),
            start: Some("tomorrow".to_owned()),
            end: Some("2024-07-02T10:00".to_owned()),
        };
        assert!(message(payload.validate(now)).starts_with("start must be a local date-time"));
    }

    #[rstest]
    fn booking_starting_now_is_accepted(now: NaiveDateTime) {
        let payload = NewBookingPayload {
            item_id: Some(1),
            start: Some("2024-06-01T00:00:00".to_owned()),
            end: Some("2024-06-02T00:00:00.000".to_owned()),
        };
        assert!(payload.validate(now).is_ok());
    }

    #[rstest]
    fn malformed_json_is_a_validation_failure() {
        let result = decode::<NewItemPayload>(br#"{"available":"yes"}"#);
        assert!(matches!(
            result,
            Err(GatewayError::Validation { message }) if message.starts_with("malformed request body")
        ));
    }
}
