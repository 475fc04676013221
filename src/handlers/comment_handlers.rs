use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::comment::{self, NewComment};
use crate::models::thread::{self, ThreadStatus};

/// POST /api/threads/{id}/comments
/// Appends a comment and returns only the new comment, not the thread.
/// Locked threads reject new comments.
pub async fn create(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    body: web::Json<NewComment>,
) -> Result<HttpResponse, AppError> {
    let thread_id = path.into_inner();
    let mut new = body.into_inner();
    new.content = new.content.trim().to_string();
    if new.content.is_empty() {
        return Err(AppError::Validation("Comment content is required".to_string()));
    }

    let conn = pool.get()?;
    match thread::status_of(&conn, thread_id)? {
        None => return Err(AppError::NotFound),
        Some(ThreadStatus::Locked) => {
            return Err(AppError::Validation("Thread is locked".to_string()));
        }
        Some(_) => {}
    }

    let created = comment::create(&conn, thread_id, &new)?;
    Ok(HttpResponse::Created().json(created))
}

#[derive(Debug, Deserialize)]
pub struct CommentEdit {
    pub content: String,
}

/// PUT /api/threads/{id}/comments/{comment_id}
/// Replaces the comment's content and stamps its edit time.
pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<(i64, i64)>,
    body: web::Json<CommentEdit>,
) -> Result<HttpResponse, AppError> {
    let (thread_id, comment_id) = path.into_inner();
    let content = body.content.trim().to_string();
    if content.is_empty() {
        return Err(AppError::Validation("Comment content is required".to_string()));
    }

    let conn = pool.get()?;
    let updated = comment::update_content(&conn, thread_id, comment_id, &content)?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/threads/{id}/comments/{comment_id}
pub async fn delete(
    pool: web::Data<DbPool>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (thread_id, comment_id) = path.into_inner();
    let conn = pool.get()?;
    if !comment::delete(&conn, thread_id, comment_id)? {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Comment deleted" })))
}
