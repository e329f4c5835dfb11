//! User model, authentication claims and permission checks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Named permissions granted to users
pub mod permissions {
    pub const CAN_MARK_RETURNED: &str = "catalog.can_mark_returned";

    pub const ADD_AUTHOR: &str = "catalog.add_author";
    pub const CHANGE_AUTHOR: &str = "catalog.change_author";
    pub const DELETE_AUTHOR: &str = "catalog.delete_author";

    pub const ADD_BOOK: &str = "catalog.add_book";
    pub const CHANGE_BOOK: &str = "catalog.change_book";
    pub const DELETE_BOOK: &str = "catalog.delete_book";

    pub const ADD_BOOKINSTANCE: &str = "catalog.add_bookinstance";
    pub const CHANGE_BOOKINSTANCE: &str = "catalog.change_bookinstance";
    pub const DELETE_BOOKINSTANCE: &str = "catalog.delete_bookinstance";

    pub const ADD_GENRE: &str = "catalog.add_genre";
    pub const ADD_LANGUAGE: &str = "catalog.add_language";

    pub const ALL: &[&str] = &[
        CAN_MARK_RETURNED,
        ADD_AUTHOR,
        CHANGE_AUTHOR,
        DELETE_AUTHOR,
        ADD_BOOK,
        CHANGE_BOOK,
        DELETE_BOOK,
        ADD_BOOKINSTANCE,
        CHANGE_BOOKINSTANCE,
        DELETE_BOOKINSTANCE,
        ADD_GENRE,
        ADD_LANGUAGE,
    ];
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub is_staff: bool,
    pub is_active: bool,
    pub permissions: Vec<String>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Disabled accounts may neither log in nor use an issued token
    pub fn ensure_active(&self) -> Result<(), AppError> {
        if self.is_active {
            Ok(())
        } else {
            Err(AppError::Authentication("Account is disabled".to_string()))
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    /// Named permissions, e.g. "catalog.can_mark_returned"
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub is_staff: bool,
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Staff members may do anything a named permission allows
    pub fn has_perm(&self, permission: &str) -> bool {
        self.is_staff || self.permissions.iter().any(|p| p == permission)
    }

    pub fn require_perm(&self, permission: &str) -> Result<(), AppError> {
        if self.has_perm(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Permission {} required",
                permission
            )))
        }
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff {
            Ok(())
        } else {
            Err(AppError::Authorization("Staff privileges required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(is_staff: bool, permissions: &[&str]) -> UserClaims {
        UserClaims {
            sub: "testuser1".to_string(),
            user_id: 1,
            is_staff,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        }
    }

    #[test]
    fn test_named_permission_grants_access() {
        let user = claims(false, &[permissions::CAN_MARK_RETURNED]);
        assert!(user.has_perm(permissions::CAN_MARK_RETURNED));
        assert!(!user.has_perm(permissions::ADD_AUTHOR));
    }

    #[test]
    fn test_staff_flag_grants_every_permission() {
        let staff = claims(true, &[]);
        for permission in permissions::ALL {
            assert!(staff.require_perm(permission).is_ok());
        }
        assert!(staff.require_staff().is_ok());
    }

    #[test]
    fn test_missing_permission_is_forbidden() {
        let user = claims(false, &[]);
        assert!(matches!(
            user.require_perm(permissions::CAN_MARK_RETURNED),
            Err(AppError::Authorization(_))
        ));
        assert!(user.require_staff().is_err());
    }

    #[test]
    fn test_disabled_account_is_rejected() {
        let mut user = User {
            id: 1,
            username: "testuser1".to_string(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            is_staff: false,
            is_active: true,
            permissions: Vec::new(),
            date_joined: Utc::now(),
        };
        assert!(user.ensure_active().is_ok());

        user.is_active = false;
        assert!(matches!(user.ensure_active(), Err(AppError::Authentication(_))));
    }

    #[test]
    fn test_token_round_trip() {
        let original = claims(false, &[permissions::ADD_BOOK]);
        let token = original.create_token("secret").unwrap();
        let decoded = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(decoded.user_id, 1);
        assert_eq!(decoded.permissions, vec![permissions::ADD_BOOK.to_string()]);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }
}
