//! Book instance (borrowable copy) model and borrowing state

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Availability of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    /// Single character code stored in the database
    pub fn as_code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status code: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus (stored as its one-letter code)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_code(), buf)
    }
}

/// True when a due-back date exists and is strictly before `today`
pub fn is_overdue(due_back: Option<NaiveDate>, today: NaiveDate) -> bool {
    due_back.map(|due| due < today).unwrap_or(false)
}

/// Copy model from database, joined with its book title and borrower
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    /// Unique id of this copy across the whole library
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
    pub status: LoanStatus,
}

impl BookInstance {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self.due_back, today)
    }

    /// Attach the values derived at read time
    pub fn into_details(self, today: NaiveDate) -> BookInstanceDetails {
        BookInstanceDetails {
            display_name: self.to_string(),
            is_overdue: self.is_overdue(today),
            status_label: self.status.label().to_string(),
            instance: self,
        }
    }
}

impl std::fmt::Display for BookInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.book_title {
            Some(title) => write!(f, "{} ({})", self.id, title),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Copy with derived display values
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookInstanceDetails {
    #[serde(flatten)]
    pub instance: BookInstance,
    /// "{id} ({book title})"
    pub display_name: String,
    pub status_label: String,
    pub is_overdue: bool,
}

/// Create or update copy request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookInstanceForm {
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1-200 characters"))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    /// Defaults to maintenance
    #[serde(default)]
    pub status: LoanStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn copy(due_back: Option<NaiveDate>, title: Option<&str>) -> BookInstance {
        BookInstance {
            id: Uuid::parse_str("6f1c3a57-3c1e-4d8b-9f33-2a4b5c6d7e8f").unwrap(),
            book_id: title.map(|_| 1),
            book_title: title.map(str::to_string),
            imprint: "Unlikely Imprint, 2016".to_string(),
            due_back,
            borrower_id: None,
            borrower_username: None,
            status: LoanStatus::OnLoan,
        }
    }

    #[test]
    fn test_overdue_only_strictly_before_today() {
        for days in 1..=30 {
            assert!(is_overdue(Some(today() - Duration::days(days)), today()));
        }
        for days in 0..=30 {
            assert!(!is_overdue(Some(today() + Duration::days(days)), today()));
        }
        assert!(!is_overdue(None, today()));
    }

    #[test]
    fn test_display_is_id_and_book_title() {
        let copy = copy(None, Some("The Shining"));
        assert_eq!(
            copy.to_string(),
            "6f1c3a57-3c1e-4d8b-9f33-2a4b5c6d7e8f (The Shining)"
        );
    }

    #[test]
    fn test_display_without_book_is_id() {
        assert_eq!(
            copy(None, None).to_string(),
            "6f1c3a57-3c1e-4d8b-9f33-2a4b5c6d7e8f"
        );
    }

    #[test]
    fn test_details_carry_derived_values() {
        let details = copy(Some(today() - Duration::days(1)), Some("Dune")).into_details(today());
        assert!(details.is_overdue);
        assert_eq!(details.status_label, "On loan");
        assert!(details.display_name.ends_with("(Dune)"));
    }

    #[test]
    fn test_status_codes_round_trip() {
        for status in [
            LoanStatus::Maintenance,
            LoanStatus::OnLoan,
            LoanStatus::Available,
            LoanStatus::Reserved,
        ] {
            assert_eq!(status.as_code().parse::<LoanStatus>(), Ok(status));
        }
        assert!("x".parse::<LoanStatus>().is_err());
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
    }
}
