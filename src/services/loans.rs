//! Copies and borrowing service

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstanceDetails, BookInstanceForm, LoanStatus},
        pagination::{PageRequest, PaginatedResponse},
        renewal::{RenewBookForm, RenewalFormState},
    },
    repository::Repository,
};

/// A copy together with the renewal form offered for it
#[derive(Debug, Serialize, ToSchema)]
pub struct RenewalForm {
    pub copy: BookInstanceDetails,
    pub form: RenewalFormState,
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // =========================================================================
    // COPIES
    // =========================================================================

    /// Copies of a book
    pub async fn list_copies(
        &self,
        book_id: i32,
        today: NaiveDate,
    ) -> AppResult<Vec<BookInstanceDetails>> {
        if !self.repository.books.exists(book_id).await? {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }

        let copies = self.repository.book_instances.list_for_book(book_id).await?;
        Ok(copies.into_iter().map(|c| c.into_details(today)).collect())
    }

    pub async fn get_copy(&self, id: Uuid, today: NaiveDate) -> AppResult<BookInstanceDetails> {
        let copy = self.repository.book_instances.get_by_id(id).await?;
        Ok(copy.into_details(today))
    }

    pub async fn create_copy(
        &self,
        book_id: i32,
        form: BookInstanceForm,
        today: NaiveDate,
    ) -> AppResult<BookInstanceDetails> {
        if !self.repository.books.exists(book_id).await? {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }
        self.check_copy_form(&form).await?;

        let copy = self.repository.book_instances.create(book_id, &form).await?;
        tracing::info!("Created copy {}", copy);
        Ok(copy.into_details(today))
    }

    pub async fn update_copy(
        &self,
        id: Uuid,
        form: BookInstanceForm,
        today: NaiveDate,
    ) -> AppResult<BookInstanceDetails> {
        self.check_copy_form(&form).await?;

        let copy = self.repository.book_instances.update(id, &form).await?;
        tracing::info!("Updated copy {} (status: {})", copy, copy.status);
        Ok(copy.into_details(today))
    }

    pub async fn delete_copy(&self, id: Uuid) -> AppResult<()> {
        self.repository.book_instances.delete(id).await?;
        tracing::info!("Deleted copy {}", id);
        Ok(())
    }

    async fn check_copy_form(&self, form: &BookInstanceForm) -> AppResult<()> {
        form.validate()?;

        if let Some(borrower_id) = form.borrower_id {
            if !self.repository.users.exists(borrower_id).await? {
                return Err(AppError::invalid_field(
                    "borrower_id",
                    format!("Unknown user {}", borrower_id),
                ));
            }
        }

        // Status and due date are stored independently; flag the odd pairing
        if form.status == LoanStatus::OnLoan && form.due_back.is_none() {
            tracing::warn!("Copy marked on loan without a due-back date");
        }

        Ok(())
    }

    // =========================================================================
    // BORROWING
    // =========================================================================

    /// Copies on loan to one user, soonest due first
    pub async fn borrowed_by(
        &self,
        user_id: i32,
        page: Option<i64>,
        today: NaiveDate,
    ) -> AppResult<PaginatedResponse<BookInstanceDetails>> {
        self.on_loan(Some(user_id), page, today).await
    }

    /// Every copy on loan, soonest due first
    pub async fn all_borrowed(
        &self,
        page: Option<i64>,
        today: NaiveDate,
    ) -> AppResult<PaginatedResponse<BookInstanceDetails>> {
        self.on_loan(None, page, today).await
    }

    async fn on_loan(
        &self,
        borrower_id: Option<i32>,
        page: Option<i64>,
        today: NaiveDate,
    ) -> AppResult<PaginatedResponse<BookInstanceDetails>> {
        let total = self.repository.book_instances.count_on_loan(borrower_id).await?;
        let request = PageRequest::resolve(page, total)?;
        let copies = self
            .repository
            .book_instances
            .list_on_loan(borrower_id, request.limit(), request.offset())
            .await?
            .into_iter()
            .map(|c| c.into_details(today))
            .collect();

        Ok(PaginatedResponse::new(copies, request))
    }

    /// Renewal form for a copy, proposing a date three weeks out
    pub async fn renewal_form(&self, id: Uuid, today: NaiveDate) -> AppResult<RenewalForm> {
        let copy = self.repository.book_instances.get_by_id(id).await?;
        Ok(RenewalForm {
            copy: copy.into_details(today),
            form: RenewalFormState::new(today),
        })
    }

    /// Move a copy's due-back date after checking the submitted date.
    /// Nothing is written when the date is rejected.
    pub async fn renew(
        &self,
        id: Uuid,
        form: &RenewBookForm,
        today: NaiveDate,
    ) -> AppResult<BookInstanceDetails> {
        let copy = self.repository.book_instances.get_by_id(id).await?;
        let renewal_date = form.clean(today)?;

        let renewed = self
            .repository
            .book_instances
            .set_due_back(copy.id, renewal_date)
            .await?;
        tracing::info!(
            "Renewed copy {}: due back {} (was {:?})",
            renewed,
            renewal_date,
            copy.due_back
        );

        Ok(renewed.into_details(today))
    }
}
