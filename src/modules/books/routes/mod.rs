//! The book resource: one route, four verbs.

use axum::{extract::State, response::Html, routing::get, Json, Router};
use bookshelf_http::{error::AppError, extract::Payload};

use super::models::{Ack, BookFields, DeleteBook, UpdateBook};
use super::BooksState;

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route(
            "/",
            get(list_books)
                .post(create_book)
                .put(update_book)
                .delete(delete_book),
        )
        .with_state(state)
}

/// Render every book into the index page.
async fn list_books(State(state): State<BooksState>) -> Result<Html<String>, AppError> {
    let books = state.store.list().await?;
    let page = state.view.render(&books)?;
    Ok(Html(page))
}

async fn create_book(
    State(state): State<BooksState>,
    Payload(fields): Payload<BookFields>,
) -> Result<Json<Ack>, AppError> {
    let outcome = state.store.insert(fields).await?;
    tracing::info!(book_id = outcome.last_insert_id, "book added");
    Ok(Json(Ack::ADDED))
}

/// Wholesale update. An unknown id matches nothing and still succeeds.
async fn update_book(
    State(state): State<BooksState>,
    Payload(update): Payload<UpdateBook>,
) -> Result<Json<Ack>, AppError> {
    let outcome = state.store.update(update.id, update.fields).await?;
    tracing::info!(
        book_id = update.id,
        rows_affected = outcome.rows_affected,
        "book updated"
    );
    Ok(Json(Ack::UPDATED))
}

/// An unknown id matches nothing and still succeeds.
async fn delete_book(
    State(state): State<BooksState>,
    Payload(delete): Payload<DeleteBook>,
) -> Result<Json<Ack>, AppError> {
    let outcome = state.store.delete(delete.id).await?;
    tracing::info!(
        book_id = delete.id,
        rows_affected = outcome.rows_affected,
        "book deleted"
    );
    Ok(Json(Ack::DELETED))
}
