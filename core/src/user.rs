//! User entity.

use crate::id::RecordId;
use crate::validation::{MAX_TEXT_LEN, char_len};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A person who can register for events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Email address (unique across users)
    pub email: String,
    /// When the user was created
    pub created_at: DateTime<Utc>,
    /// When the user was last modified
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a new user from a draft, stamping both timestamps with `now`.
    #[must_use]
    pub fn create(draft: UserDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(),
            name: draft.name,
            email: draft.email,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the mutable fields, keeping identity and creation time.
    pub fn apply(&mut self, draft: UserDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.email = draft.email;
        self.updated_at = now;
    }
}

/// Input for creating or replacing a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserDraft {
    /// Display name (trimmed)
    pub name: String,
    /// Email address (trimmed)
    pub email: String,
}

impl UserDraft {
    /// Creates a draft, trimming surrounding whitespace.
    #[must_use]
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
        }
    }

    /// Storage-schema checks. Returns one message per violated rule.
    #[must_use]
    pub fn schema_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if self.name.is_empty() {
            violations.push("name is required".to_string());
        } else if char_len(&self.name) > MAX_TEXT_LEN {
            violations.push(format!("name must be at most {MAX_TEXT_LEN} characters"));
        }
        if self.email.is_empty() {
            violations.push("email is required".to_string());
        } else if char_len(&self.email) > MAX_TEXT_LEN {
            violations.push(format!("email must be at most {MAX_TEXT_LEN} characters"));
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_trims_fields() {
        let draft = UserDraft::new("  Ada Lovelace ", " ada@example.com\n");
        assert_eq!(draft.name, "Ada Lovelace");
        assert_eq!(draft.email, "ada@example.com");
        assert!(draft.schema_violations().is_empty());
    }

    #[test]
    fn test_schema_reports_every_violation() {
        let draft = UserDraft::new("   ", "");
        assert_eq!(
            draft.schema_violations(),
            vec!["name is required".to_string(), "email is required".to_string()]
        );
    }

    #[test]
    fn test_apply_keeps_identity() {
        let t0 = Utc::now();
        let mut user = User::create(UserDraft::new("Ada", "ada@example.com"), t0);
        let id = user.id;
        let t1 = t0 + chrono::Duration::seconds(5);

        user.apply(UserDraft::new("Ada L.", "ada@example.org"), t1);

        assert_eq!(user.id, id);
        assert_eq!(user.created_at, t0);
        assert_eq!(user.updated_at, t1);
        assert_eq!(user.email, "ada@example.org");
    }
}
