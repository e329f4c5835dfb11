//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::book::BookShort;

/// Author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Date of birth
    pub date_of_birth: Option<NaiveDate>,
    /// Date of death
    pub date_of_death: Option<NaiveDate>,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// Author reference embedded in book payloads
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorShort {
    pub id: i32,
    /// "Last, First"
    pub name: String,
}

impl From<&Author> for AuthorShort {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id,
            name: author.to_string(),
        }
    }
}

/// Author with the books attributed to them
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetails {
    #[serde(flatten)]
    pub author: Author,
    pub display_name: String,
    pub books: Vec<BookShort>,
}

/// Create or update author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_lifespan", skip_on_field_errors = true))]
pub struct AuthorForm {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

fn validate_lifespan(form: &AuthorForm) -> Result<(), ValidationError> {
    match (form.date_of_birth, form.date_of_death) {
        (Some(born), Some(died)) if died < born => {
            let mut err = ValidationError::new("lifespan");
            err.message = Some("Date of death cannot precede date of birth".into());
            Err(err)
        }
        _ => Ok(()),
    }
}
