//! Loan renewal form and its date rule

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::error::AppError;

/// Name of the single renewal form field
pub const RENEWAL_DATE_FIELD: &str = "renewal_date";

/// Latest accepted renewal, in days from today (inclusive)
pub const RENEWAL_MAX_DAYS: i64 = 28;

/// Renewal date proposed on a fresh form, in days from today
pub const RENEWAL_DEFAULT_DAYS: i64 = 21;

pub const RENEWAL_HELP_TEXT: &str = "Enter a date between now and 4 weeks (default 3).";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenewalError {
    #[error("This field is required.")]
    Missing,
    #[error("Enter a valid date.")]
    Malformed,
    #[error("Invalid date - renewal in past")]
    InPast,
    #[error("Invalid date - renewal more than 4 weeks ahead")]
    TooFarAhead,
}

impl From<RenewalError> for AppError {
    fn from(err: RenewalError) -> Self {
        AppError::invalid_field(RENEWAL_DATE_FIELD, err.to_string())
    }
}

/// Accept `date` iff `today <= date <= today + 28 days`
pub fn validate_renewal_date(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
    if date < today {
        return Err(RenewalError::InPast);
    }
    if date > today + Duration::days(RENEWAL_MAX_DAYS) {
        return Err(RenewalError::TooFarAhead);
    }
    Ok(date)
}

pub fn default_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(RENEWAL_DEFAULT_DAYS)
}

/// Submitted renewal form (`application/x-www-form-urlencoded`)
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RenewBookForm {
    /// Date in YYYY-MM-DD format
    pub renewal_date: Option<String>,
}

impl RenewBookForm {
    /// Parse and range-check the submitted date
    pub fn clean(&self, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
        let raw = self
            .renewal_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RenewalError::Missing)?;

        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| RenewalError::Malformed)?;
        validate_renewal_date(date, today)
    }
}

/// Renewal form as offered to the caller before submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalFormState {
    pub field: String,
    pub help_text: String,
    /// Proposed value: today + 3 weeks
    pub initial_renewal_date: NaiveDate,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

impl RenewalFormState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            field: RENEWAL_DATE_FIELD.to_string(),
            help_text: RENEWAL_HELP_TEXT.to_string(),
            initial_renewal_date: default_renewal_date(today),
            min_date: today,
            max_date: today + Duration::days(RENEWAL_MAX_DAYS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 18).unwrap()
    }

    fn form(value: &str) -> RenewBookForm {
        RenewBookForm {
            renewal_date: Some(value.to_string()),
        }
    }

    #[test]
    fn test_date_in_past() {
        let date = today() - Duration::days(1);
        let err = validate_renewal_date(date, today()).unwrap_err();
        assert_eq!(err, RenewalError::InPast);
        assert_eq!(err.to_string(), "Invalid date - renewal in past");
    }

    #[test]
    fn test_date_today_is_accepted() {
        assert_eq!(validate_renewal_date(today(), today()), Ok(today()));
    }

    #[test]
    fn test_date_four_weeks_ahead_is_accepted() {
        let date = today() + Duration::weeks(4);
        assert_eq!(validate_renewal_date(date, today()), Ok(date));
    }

    #[test]
    fn test_date_too_far_in_future() {
        let date = today() + Duration::weeks(4) + Duration::days(1);
        let err = validate_renewal_date(date, today()).unwrap_err();
        assert_eq!(err, RenewalError::TooFarAhead);
        assert_eq!(err.to_string(), "Invalid date - renewal more than 4 weeks ahead");
    }

    #[test]
    fn test_default_is_three_weeks_ahead() {
        assert_eq!(default_renewal_date(today()), today() + Duration::weeks(3));
        let state = RenewalFormState::new(today());
        assert_eq!(state.initial_renewal_date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(state.help_text, "Enter a date between now and 4 weeks (default 3).");
    }

    #[test]
    fn test_clean_parses_form_value() {
        let march_first = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(form("2024-03-01").clean(today()), Ok(march_first));
        assert_eq!(form("2024-02-11").clean(today()), Err(RenewalError::InPast));
        assert_eq!(form("not-a-date").clean(today()), Err(RenewalError::Malformed));
        assert_eq!(form("  ").clean(today()), Err(RenewalError::Missing));
        assert_eq!(RenewBookForm::default().clean(today()), Err(RenewalError::Missing));
    }

    #[test]
    fn test_error_maps_to_renewal_field() {
        match AppError::from(RenewalError::InPast) {
            AppError::InvalidField { field, message } => {
                assert_eq!(field, "renewal_date");
                assert_eq!(message, "Invalid date - renewal in past");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
