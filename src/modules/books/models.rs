use serde::{Deserialize, Serialize};

/// A book row as stored in the `Books` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Store-assigned identifier
    pub book_id: i64,
    pub title: String,
    pub author: String,
    /// Page count; `None` means unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_pages: Option<i64>,
    /// Publication date, `YYYY-MM-DD`
    pub pub_date: String,
}

/// Request body for creating or fully replacing a book.
///
/// Missing string fields decode as empty so validation can name them;
/// a `book_id` in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub num_pages: Option<i64>,
    #[serde(default)]
    pub pub_date: String,
}

impl NewBook {
    pub fn into_book(self, book_id: i64) -> Book {
        Book {
            book_id,
            title: self.title,
            author: self.author,
            num_pages: self.num_pages,
            pub_date: self.pub_date,
        }
    }
}

/// Optional paging parameters for the list endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}
