use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserCreate {
    #[validate(length(min = 3, max = 100, message = "username must be 3-100 characters"))]
    pub(crate) username: String,
    #[validate(email(message = "email must be a valid address"), length(max = 100))]
    pub(crate) email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters long"))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserLogin {
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) is_active: bool,
    pub(crate) is_admin: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: crate::db::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            is_admin: user.is_admin,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_payload_validation() {
        let ok = UserCreate {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "long-enough".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = UserCreate { email: "not-an-email".to_string(), ..ok_clone(&ok) };
        assert!(bad_email.validate().is_err());

        let short_password = UserCreate { password: "short".to_string(), ..ok_clone(&ok) };
        assert!(short_password.validate().is_err());
    }

    fn ok_clone(value: &UserCreate) -> UserCreate {
        UserCreate {
            username: value.username.clone(),
            email: value.email.clone(),
            password: value.password.clone(),
        }
    }
}
