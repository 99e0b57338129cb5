use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TITLE_MAX_LEN: usize = 200;
pub const AUTHOR_MAX_LEN: usize = 100;
pub const ISBN_MAX_LEN: usize = 20;

/// A stored book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Store-assigned identifier
    pub id: i32,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// ISBN, unique across all books
    pub isbn: String,
}

/// Request body for creating a book. Fields are optional here so that a
/// missing field surfaces as a validation error rather than a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
}

/// Request body for a partial update. `null` and absent are equivalent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
}

/// A validated book ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

/// Validated changes for a partial update; `None` leaves the column as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.isbn.is_none()
    }

    /// Apply the supplied fields to `book` in place.
    pub fn apply_to(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = isbn;
        }
    }
}

/// Response body for a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field } | Self::Empty { field } | Self::TooLong { field, .. } => field,
        }
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

fn required(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.is_empty() => {
            check_len(field, &value, max)?;
            Ok(value)
        }
        _ => Err(ValidationError::Required { field }),
    }
}

fn optional(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value {
        None => Ok(None),
        Some(value) if value.is_empty() => Err(ValidationError::Empty { field }),
        Some(value) => {
            check_len(field, &value, max)?;
            Ok(Some(value))
        }
    }
}

impl CreateBook {
    /// Check that every field is present, non-empty and within its limit.
    pub fn validate(self) -> Result<NewBook, ValidationError> {
        Ok(NewBook {
            title: required("title", self.title, TITLE_MAX_LEN)?,
            author: required("author", self.author, AUTHOR_MAX_LEN)?,
            isbn: required("isbn", self.isbn, ISBN_MAX_LEN)?,
        })
    }
}

impl UpdateBook {
    /// Check every supplied field is non-empty and within its limit.
    pub fn validate(self) -> Result<BookChanges, ValidationError> {
        Ok(BookChanges {
            title: optional("title", self.title, TITLE_MAX_LEN)?,
            author: optional("author", self.author, AUTHOR_MAX_LEN)?,
            isbn: optional("isbn", self.isbn, ISBN_MAX_LEN)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> CreateBook {
        CreateBook {
            title: Some("Dune".into()),
            author: Some("Herbert".into()),
            isbn: Some("9780441013593".into()),
        }
    }

    #[test]
    fn create_accepts_complete_book() {
        let book = dune().validate().unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.isbn, "9780441013593");
    }

    #[test]
    fn create_rejects_missing_and_empty_fields() {
        let missing = CreateBook {
            author: None,
            ..dune()
        };
        assert_eq!(
            missing.validate().unwrap_err(),
            ValidationError::Required { field: "author" }
        );

        let empty = CreateBook {
            isbn: Some(String::new()),
            ..dune()
        };
        assert_eq!(empty.validate().unwrap_err().to_string(), "isbn is required");
    }

    #[test]
    fn length_limit_counts_characters() {
        let at_limit = CreateBook {
            title: Some("é".repeat(TITLE_MAX_LEN)),
            ..dune()
        };
        assert!(at_limit.validate().is_ok());

        let over = CreateBook {
            isbn: Some("9".repeat(ISBN_MAX_LEN + 1)),
            ..dune()
        };
        let err = over.validate().unwrap_err();
        assert_eq!(err.field(), "isbn");
        assert_eq!(
            err.to_string(),
            "isbn exceeds maximum length of 20 characters"
        );
    }

    #[test]
    fn update_keeps_absent_fields_absent() {
        let changes = UpdateBook {
            title: Some("Dune Messiah".into()),
            ..UpdateBook::default()
        }
        .validate()
        .unwrap();

        assert_eq!(changes.title.as_deref(), Some("Dune Messiah"));
        assert!(changes.author.is_none());
        assert!(changes.isbn.is_none());
        assert!(!changes.is_empty());
    }

    #[test]
    fn update_rejects_empty_value() {
        let err = UpdateBook {
            author: Some(String::new()),
            ..UpdateBook::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "author" });
    }

    #[test]
    fn update_body_treats_null_as_absent() {
        let body: UpdateBook = serde_json::from_str(r#"{"title": null, "isbn": "123"}"#).unwrap();
        let changes = body.validate().unwrap();
        assert!(changes.title.is_none());
        assert_eq!(changes.isbn.as_deref(), Some("123"));
    }

    #[test]
    fn apply_changes_only_supplied_fields() {
        let mut book = Book {
            id: 1,
            title: "Dune".into(),
            author: "Herbert".into(),
            isbn: "9780441013593".into(),
        };
        BookChanges {
            author: Some("Frank Herbert".into()),
            ..BookChanges::default()
        }
        .apply_to(&mut book);

        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.isbn, "9780441013593");
    }
}
