//! Book instances (copies) repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{BookInstance, BookInstanceForm, LoanStatus},
};

/// Copy columns joined with the book title and borrower name.
/// Expects the copy row aliased as `bi`.
const INSTANCE_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint, bi.due_back,
           bi.borrower_id, u.username AS borrower_username, bi.status
"#;

const INSTANCE_JOINS: &str = r#"
    LEFT JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Book instance {} not found", id))
}

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get copy by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(&format!(
            "{} FROM book_instances bi {} WHERE bi.id = $1",
            INSTANCE_SELECT, INSTANCE_JOINS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// All copies of a book, ordered by due-back date
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let copies = sqlx::query_as::<_, BookInstance>(&format!(
            "{} FROM book_instances bi {} WHERE bi.book_id = $1 ORDER BY bi.due_back ASC NULLS LAST, bi.id",
            INSTANCE_SELECT, INSTANCE_JOINS
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(copies)
    }

    /// Count copies, optionally restricted to one status
    pub async fn count(&self, status: Option<LoanStatus>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Count copies on loan, optionally only those lent to `borrower_id`
    pub async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM book_instances
            WHERE status = $1 AND ($2::INTEGER IS NULL OR borrower_id = $2)
            "#,
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// One page of copies on loan, optionally only those lent to
    /// `borrower_id`, ordered by due-back date ascending
    pub async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookInstance>> {
        let copies = sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            {} FROM book_instances bi {}
            WHERE bi.status = $1 AND ($2::INTEGER IS NULL OR bi.borrower_id = $2)
            ORDER BY bi.due_back ASC NULLS LAST, bi.id
            LIMIT $3 OFFSET $4
            "#,
            INSTANCE_SELECT, INSTANCE_JOINS
        ))
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(copies)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Create a copy of a book with a fresh random id
    pub async fn create(&self, book_id: i32, form: &BookInstanceForm) -> AppResult<BookInstance> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, borrower_id, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(book_id)
        .bind(&form.imprint)
        .bind(form.due_back)
        .bind(form.borrower_id)
        .bind(form.status)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Replace a copy's imprint, due-back date, borrower and status
    pub async fn update(&self, id: Uuid, form: &BookInstanceForm) -> AppResult<BookInstance> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET imprint = $2, due_back = $3, borrower_id = $4, status = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&form.imprint)
        .bind(form.due_back)
        .bind(form.borrower_id)
        .bind(form.status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        self.get_by_id(id).await
    }

    /// Move a copy's due-back date
    pub async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $2 WHERE id = $1")
            .bind(id)
            .bind(due_back)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }
}
