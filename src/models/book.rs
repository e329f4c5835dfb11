//! Book (catalog title) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    author::AuthorShort, book_instance::BookInstanceDetails, genre::Genre, language::Language,
};

/// Number of genres shown in a book's genre summary
pub const DISPLAY_GENRE_LIMIT: usize = 3;

/// Book model from database (a title, not a specific copy)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    /// 13 character ISBN
    pub isbn: String,
    pub language_id: Option<i32>,
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    /// Author display name ("Last, First"), if any
    pub author_name: Option<String>,
}

/// Book with its author, language, genres and copies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<AuthorShort>,
    pub language: Option<Language>,
    /// Genres in stored order
    pub genres: Vec<Genre>,
    /// Names of the first three genres, comma separated
    pub display_genre: String,
    pub copies: Vec<BookInstanceDetails>,
}

/// Comma-joined names of the first three genres, in the order given
pub fn display_genre(genres: &[Genre]) -> String {
    genres
        .iter()
        .take(DISPLAY_GENRE_LIMIT)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Create or update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    pub summary: String,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1-13 characters"))]
    pub isbn: String,
    /// Genre ids, in display order
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    pub language_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(id: i32, name: &str) -> Genre {
        Genre {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_display_genre_keeps_first_three_in_order() {
        let genres = vec![
            genre(4, "Science Fiction"),
            genre(1, "Fantasy"),
            genre(9, "Horror"),
            genre(2, "Poetry"),
        ];
        assert_eq!(display_genre(&genres), "Science Fiction, Fantasy, Horror");
    }

    #[test]
    fn test_display_genre_short_lists() {
        assert_eq!(display_genre(&[]), "");
        assert_eq!(display_genre(&[genre(1, "Fantasy")]), "Fantasy");
        assert_eq!(
            display_genre(&[genre(1, "Science Fiction"), genre(2, "Fantasy")]),
            "Science Fiction, Fantasy"
        );
    }

    #[test]
    fn test_form_isbn_length() {
        let form = BookForm {
            title: "A Test Book".to_string(),
            author_id: None,
            summary: "Test Summary".to_string(),
            isbn: "12345678901234".to_string(),
            genre_ids: vec![],
            language_id: None,
        };
        assert!(form.validate().is_err());

        let form = BookForm {
            isbn: "1234567890123".to_string(),
            ..form
        };
        assert!(form.validate().is_ok());
    }
}
