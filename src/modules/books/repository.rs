//! Data access for the `Books` table.

use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;

use super::models::{Book, NewBook};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Book not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Every book; empty when the table is empty.
    async fn list(&self) -> StoreResult<Vec<Book>>;
    async fn list_page(&self, limit: u32, offset: u32) -> StoreResult<Vec<Book>>;
    async fn get(&self, book_id: i64) -> StoreResult<Book>;
    /// Insert and return the assigned id.
    async fn create(&self, book: &NewBook) -> StoreResult<i64>;
    /// Replace every mutable column of an existing row.
    async fn update(&self, book_id: i64, book: &NewBook) -> StoreResult<()>;
    async fn delete(&self, book_id: i64) -> StoreResult<()>;
}

pub struct SqliteBookRepository {
    db: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

fn ensure_affected(rows_affected: u64) -> StoreResult<()> {
    if rows_affected == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn list(&self) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT book_id, title, author, num_pages, pub_date FROM Books",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(books)
    }

    async fn list_page(&self, limit: u32, offset: u32) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT book_id, title, author, num_pages, pub_date FROM Books ORDER BY book_id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(books)
    }

    async fn get(&self, book_id: i64) -> StoreResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT book_id, title, author, num_pages, pub_date FROM Books WHERE book_id = ?",
        )
        .bind(book_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn create(&self, book: &NewBook) -> StoreResult<i64> {
        let result = sqlx::query(
            "INSERT INTO Books (title, author, num_pages, pub_date) VALUES (?, ?, ?, ?)",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.num_pages)
        .bind(&book.pub_date)
        .execute(&self.db)
        .await?;

        ensure_affected(result.rows_affected())?;
        Ok(result.last_insert_rowid())
    }

    async fn update(&self, book_id: i64, book: &NewBook) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE Books SET title = ?, author = ?, num_pages = ?, pub_date = ? WHERE book_id = ?",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.num_pages)
        .bind(&book.pub_date)
        .bind(book_id)
        .execute(&self.db)
        .await?;

        ensure_affected(result.rows_affected())
    }

    async fn delete(&self, book_id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM Books WHERE book_id = ?")
            .bind(book_id)
            .execute(&self.db)
            .await?;

        ensure_affected(result.rows_affected())
    }
}
