//! Request bodies and their field checks.
//!
//! Bodies are deserialized loosely: every field is an optional JSON value,
//! so a wrong type fails the same field check as a missing value instead of
//! surfacing as a deserialization error. Checks run in field order and the
//! first failure wins.

use registrar_core::validation::{is_valid_email, is_valid_text, parse_capacity, parse_date_time};
use registrar_core::{EventDraft, RecordId, UserDraft, ValidationError};
use serde::Deserialize;
use serde_json::Value;

/// A request body that can be checked and turned into domain input.
pub trait Validate {
    /// What a valid body becomes.
    type Validated;

    /// Runs the field checks.
    ///
    /// # Errors
    ///
    /// Returns the first failed field check.
    fn validate(self) -> Result<Self::Validated, ValidationError>;
}

/// `POST /api/events` body.
#[derive(Debug, Default, Deserialize)]
pub struct EventRequest {
    /// Event title
    pub title: Option<Value>,
    /// When the event takes place
    pub date_time: Option<Value>,
    /// Where the event takes place
    pub location: Option<Value>,
    /// Maximum number of registrants
    pub capacity: Option<Value>,
}

/// `POST /api/users` and `PUT /api/users/:id` body.
#[derive(Debug, Default, Deserialize)]
pub struct UserRequest {
    /// Display name
    pub name: Option<Value>,
    /// Email address
    pub email: Option<Value>,
}

/// `POST` and `DELETE /api/events/:id/register` body.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationRequest {
    /// The user to register or unregister
    pub user_id: Option<Value>,
}

fn text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

fn valid_text(value: Option<&Value>, error: ValidationError) -> Result<&str, ValidationError> {
    text(value).filter(|s| is_valid_text(s)).ok_or(error)
}

impl Validate for EventRequest {
    type Validated = EventDraft;

    fn validate(self) -> Result<EventDraft, ValidationError> {
        let title = valid_text(self.title.as_ref(), ValidationError::InvalidTitle)?;
        let date_time = text(self.date_time.as_ref())
            .and_then(parse_date_time)
            .ok_or(ValidationError::InvalidDate)?;
        let location = valid_text(self.location.as_ref(), ValidationError::InvalidLocation)?;
        let capacity = self
            .capacity
            .as_ref()
            .and_then(Value::as_f64)
            .and_then(parse_capacity)
            .ok_or(ValidationError::InvalidCapacity)?;

        Ok(EventDraft::new(title, date_time, location, capacity))
    }
}

impl Validate for UserRequest {
    type Validated = UserDraft;

    fn validate(self) -> Result<UserDraft, ValidationError> {
        let name = valid_text(self.name.as_ref(), ValidationError::InvalidName)?;
        let email = text(self.email.as_ref())
            .filter(|s| is_valid_email(s))
            .ok_or(ValidationError::InvalidEmail)?;

        Ok(UserDraft::new(name, email))
    }
}

impl Validate for RegistrationRequest {
    type Validated = RecordId;

    fn validate(self) -> Result<RecordId, ValidationError> {
        text(self.user_id.as_ref())
            .and_then(|s| s.parse().ok())
            .ok_or(ValidationError::InvalidUserId)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(body: Value) -> Result<EventDraft, ValidationError> {
        serde_json::from_value::<EventRequest>(body).unwrap().validate()
    }

    #[test]
    fn test_event_valid() {
        let draft = event(json!({
            "title": "  Rust Meetup ",
            "date_time": "2030-06-01T18:00:00Z",
            "location": "Hall A",
            "capacity": 50
        }))
        .unwrap();
        assert_eq!(draft.title, "Rust Meetup");
        assert_eq!(draft.capacity, 50);
    }

    #[test]
    fn test_event_checks_in_field_order() {
        assert_eq!(event(json!({})), Err(ValidationError::InvalidTitle));
        assert_eq!(
            event(json!({"title": "T", "capacity": 0})),
            Err(ValidationError::InvalidDate)
        );
        assert_eq!(
            event(json!({"title": "T", "date_time": "2030-06-01", "location": "  "})),
            Err(ValidationError::InvalidLocation)
        );
    }

    #[test]
    fn test_event_field_types() {
        let base = |capacity: Value| {
            event(json!({
                "title": "T",
                "date_time": "2030-06-01T18:00",
                "location": "L",
                "capacity": capacity
            }))
        };
        assert!(base(json!(1000)).is_ok());
        assert!(base(json!(10.0)).is_ok());
        assert_eq!(base(json!(10.5)), Err(ValidationError::InvalidCapacity));
        assert_eq!(base(json!("10")), Err(ValidationError::InvalidCapacity));
        assert_eq!(base(json!(1001)), Err(ValidationError::InvalidCapacity));

        assert_eq!(
            event(json!({"title": 42, "date_time": "2030-06-01", "location": "L", "capacity": 1})),
            Err(ValidationError::InvalidTitle)
        );
        assert_eq!(
            event(json!({"title": "T", "date_time": "not a date", "location": "L", "capacity": 1})),
            Err(ValidationError::InvalidDate)
        );
    }

    #[test]
    fn test_user_checks() {
        let user = |body: Value| serde_json::from_value::<UserRequest>(body).unwrap().validate();
        assert!(user(json!({"name": "Ada", "email": "ada@example.com"})).is_ok());
        assert_eq!(
            user(json!({"name": "", "email": "ada@example.com"})),
            Err(ValidationError::InvalidName)
        );
        assert_eq!(
            user(json!({"name": "Ada", "email": "ada@example"})),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(user(json!({"name": "Ada"})), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_registration_user_id() {
        let reg = |body: Value| {
            serde_json::from_value::<RegistrationRequest>(body)
                .unwrap()
                .validate()
        };
        let id = RecordId::new();
        assert_eq!(reg(json!({"user_id": id.to_string()})), Ok(id));
        assert_eq!(
            reg(json!({"user_id": id.to_string().to_uppercase()})),
            Ok(id)
        );
        assert_eq!(reg(json!({"user_id": "123"})), Err(ValidationError::InvalidUserId));
        assert_eq!(reg(json!({})), Err(ValidationError::InvalidUserId));
    }
}
