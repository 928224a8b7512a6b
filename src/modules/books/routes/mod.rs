//! HTTP handlers for the books resource.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequestParts, Path, Query, State,
    },
    http::{request::Parts, StatusCode},
    routing::{get, MethodRouter},
    Json, Router,
};
use bookit_http::error::{AppError, AppResult};

use super::models::{Book, ListParams, NewBook};
use super::repository::{BookRepository, StoreError};
use super::validation::{check_page_count, check_required_fields, validate_date};
use crate::utils::{method_not_allowed, send_options};

pub type SharedRepository = Arc<dyn BookRepository>;

/// Routes for `/books` and `/books/{id}`, with and without trailing slash.
pub fn router(repository: SharedRepository) -> Router {
    Router::new()
        .route("/books", collection())
        .route("/books/", collection())
        .route("/books/{id}", item())
        .route("/books/{id}/", item())
        .with_state(repository)
}

fn collection() -> MethodRouter<SharedRepository> {
    get(list_books)
        .post(create_book)
        .options(send_options)
        .fallback(method_not_allowed)
}

fn item() -> MethodRouter<SharedRepository> {
    get(get_book)
        .put(update_book)
        .delete(delete_book)
        .options(send_options)
        .fallback(method_not_allowed)
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::not_found("Book not found"),
            StoreError::Database(e) => AppError::Internal(e.into()),
        }
    }
}

/// Integer id taken from the `{id}` path segment.
#[derive(Debug, Clone, Copy)]
pub struct BookId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for BookId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(segment) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        segment
            .parse::<i64>()
            .map(BookId)
            .map_err(|_| AppError::bad_request(format!("Invalid book id '{}'", segment)))
    }
}

fn validate(book: &NewBook) -> AppResult<()> {
    let empty_fields = check_required_fields(book);
    if !empty_fields.is_empty() {
        return Err(AppError::bad_request(format!(
            "The following fields are empty: {}",
            empty_fields.join(", ")
        )));
    }

    if !validate_date(&book.pub_date) {
        return Err(AppError::bad_request(
            "Invalid date format. Should be YYYY-MM-DD",
        ));
    }

    if !check_page_count(book.num_pages) {
        return Err(AppError::bad_request("num_pages must not be negative"));
    }

    Ok(())
}

async fn list_books(
    State(repository): State<SharedRepository>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Json<Vec<Book>>> {
    let Query(params) = params?;

    let books = match params {
        ListParams {
            limit: None,
            offset: None,
        } => repository.list().await?,
        ListParams { limit, offset } => {
            repository
                .list_page(limit.unwrap_or(u32::MAX), offset.unwrap_or(0))
                .await?
        }
    };

    if books.is_empty() {
        return Err(AppError::not_found("No books found"));
    }

    Ok(Json(books))
}

async fn get_book(
    State(repository): State<SharedRepository>,
    BookId(book_id): BookId,
) -> AppResult<Json<Book>> {
    Ok(Json(repository.get(book_id).await?))
}

async fn create_book(
    State(repository): State<SharedRepository>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let Json(book) = payload?;
    validate(&book)?;

    // Any store failure on insert, including the zero-rows sentinel, is a 500.
    let book_id = repository
        .create(&book)
        .await
        .map_err(|err| AppError::Internal(err.into()))?;

    tracing::info!(book_id, "book created");
    Ok((StatusCode::CREATED, Json(book.into_book(book_id))))
}

async fn update_book(
    State(repository): State<SharedRepository>,
    BookId(book_id): BookId,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let Json(book) = payload?;
    validate(&book)?;

    repository.update(book_id, &book).await?;

    tracing::info!(book_id, "book updated");
    Ok(Json(book.into_book(book_id)))
}

async fn delete_book(
    State(repository): State<SharedRepository>,
    BookId(book_id): BookId,
) -> AppResult<StatusCode> {
    repository.delete(book_id).await?;

    tracing::info!(book_id, "book deleted");
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::repository::SqliteBookRepository;
    use crate::modules::books::test_support::migrated_pool;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> Router {
        router(Arc::new(SqliteBookRepository::new(migrated_pool().await)))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        app.clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn orwell() -> Value {
        json!({
            "title": "1984",
            "author": "George Orwell",
            "num_pages": 328,
            "pub_date": "1949-06-08"
        })
    }

    #[tokio::test]
    async fn list_on_empty_store_is_not_found() {
        let app = app().await;
        let response = send(&app, Method::GET, "/books", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["msg"], "No books found");
    }

    #[tokio::test]
    async fn create_then_get_returns_the_same_book() {
        let app = app().await;

        let response = send(&app, Method::POST, "/books", Some(orwell())).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        let id = created["book_id"].as_i64().unwrap();

        let response = send(&app, Method::GET, &format!("/books/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = json_body(response).await;

        assert_eq!(fetched, created);
        assert_eq!(fetched["title"], "1984");
        assert_eq!(fetched["num_pages"], 328);
    }

    #[tokio::test]
    async fn list_returns_every_book() {
        let app = app().await;
        send(&app, Method::POST, "/books/", Some(orwell())).await;
        send(
            &app,
            Method::POST,
            "/books",
            Some(json!({"title": "Emma", "author": "Jane Austen", "pub_date": "1815-12-23"})),
        )
        .await;

        let response = send(&app, Method::GET, "/books/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let books = json_body(response).await;
        assert_eq!(books.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn list_honours_limit_and_offset() {
        let app = app().await;
        for title in ["A", "B", "C"] {
            send(
                &app,
                Method::POST,
                "/books",
                Some(json!({"title": title, "author": "X", "pub_date": "2000-01-01"})),
            )
            .await;
        }

        let response = send(&app, Method::GET, "/books?limit=1&offset=2", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let books = json_body(response).await;
        assert_eq!(books.as_array().unwrap().len(), 1);
        assert_eq!(books[0]["title"], "C");

        let response = send(&app, Method::GET, "/books?limit=-1", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn absent_page_count_is_omitted_from_json() {
        let app = app().await;
        let response = send(
            &app,
            Method::POST,
            "/books",
            Some(json!({"title": "Emma", "author": "Jane Austen", "pub_date": "1815-12-23"})),
        )
        .await;

        let created = json_body(response).await;
        assert!(created.get("num_pages").is_none());
    }

    #[tokio::test]
    async fn create_rejects_missing_fields() {
        let app = app().await;
        let response = send(
            &app,
            Method::POST,
            "/books",
            Some(json!({"pub_date": "1949-06-08"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["msg"],
            "The following fields are empty: title, author"
        );
    }

    #[tokio::test]
    async fn create_rejects_invalid_date() {
        let app = app().await;
        let mut book = orwell();
        book["pub_date"] = json!("1949-16-08");

        let response = send(&app, Method::POST, "/books", Some(book)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["msg"],
            "Invalid date format. Should be YYYY-MM-DD"
        );
    }

    #[tokio::test]
    async fn create_rejects_negative_page_count() {
        let app = app().await;
        let mut book = orwell();
        book["num_pages"] = json!(-3);

        let response = send(&app, Method::POST, "/books", Some(book)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_rejects_malformed_json() {
        let app = app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/books")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\": "))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["msg"].is_string());
    }

    #[tokio::test]
    async fn update_replaces_book_using_path_id() {
        let app = app().await;
        let created = json_body(send(&app, Method::POST, "/books", Some(orwell())).await).await;
        let id = created["book_id"].as_i64().unwrap();

        let replacement = json!({
            "book_id": 999,
            "title": "Nineteen Eighty-Four",
            "author": "George Orwell",
            "pub_date": "1949-06-08"
        });
        let response = send(&app, Method::PUT, &format!("/books/{id}"), Some(replacement)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = json_body(response).await;
        assert_eq!(updated["book_id"], id);
        assert!(updated.get("num_pages").is_none());

        let fetched = json_body(send(&app, Method::GET, &format!("/books/{id}/"), None).await).await;
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn update_missing_book_is_not_found() {
        let app = app().await;
        let response = send(&app, Method::PUT, "/books/42", Some(orwell())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["msg"], "Book not found");

        let response = send(&app, Method::GET, "/books", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_rejects_invalid_date() {
        let app = app().await;
        let created = json_body(send(&app, Method::POST, "/books", Some(orwell())).await).await;
        let id = created["book_id"].as_i64().unwrap();

        let mut book = orwell();
        book["pub_date"] = json!("1949-some-string");
        let response = send(&app, Method::PUT, &format!("/books/{id}"), Some(book)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_twice_is_not_found_the_second_time() {
        let app = app().await;
        let created = json_body(send(&app, Method::POST, "/books", Some(orwell())).await).await;
        let uri = format!("/books/{}", created["book_id"]);

        let first = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(first.status(), StatusCode::OK);
        let bytes = to_bytes(first.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());

        let second = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_integer_id_is_bad_request() {
        let app = app().await;
        for method in [Method::GET, Method::DELETE] {
            let response = send(&app, method, "/books/abc", None).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(response).await["msg"], "Invalid book id 'abc'");
        }
    }

    #[tokio::test]
    async fn unsupported_verbs_are_method_not_allowed() {
        let app = app().await;

        let response = send(&app, Method::DELETE, "/books", None).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = send(&app, Method::POST, "/books/1", Some(orwell())).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json_body(response).await["msg"], "Method not allowed");
    }

    #[tokio::test]
    async fn options_answers_with_cors_headers_and_no_body() {
        let app = app().await;
        for uri in ["/books", "/books/7"] {
            let response = send(&app, Method::OPTIONS, uri, None).await;
            assert_eq!(response.status(), StatusCode::OK);
            let headers = response.headers();
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert_eq!(
                headers[header::ACCESS_CONTROL_ALLOW_METHODS],
                "GET, POST, PUT, DELETE"
            );
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert!(bytes.is_empty());
        }
    }

    #[tokio::test]
    async fn storage_failures_are_internal_errors() {
        let pool = migrated_pool().await;
        let app = router(Arc::new(SqliteBookRepository::new(pool.clone())));
        sqlx::query("DROP TABLE Books").execute(&pool).await.unwrap();

        let requests = [
            (Method::GET, "/books", None),
            (Method::POST, "/books", Some(orwell())),
            (Method::PUT, "/books/1", Some(orwell())),
            (Method::DELETE, "/books/1", None),
        ];
        for (method, uri, body) in requests {
            let response = send(&app, method.clone(), uri, body).await;
            assert_eq!(
                response.status(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "{method} {uri}"
            );
            assert!(json_body(response).await["msg"].is_string());
        }
    }
}
