use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::tag;
use crate::models::thread::{self, NewThread, ThreadPatch, VoteDirection};

/// GET /api/threads
/// All threads, pinned first, then newest first. Filtering is client-side.
pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let threads = thread::find_all(&conn)?;
    Ok(HttpResponse::Ok().json(threads))
}

/// GET /api/threads/{id}
pub async fn read(pool: web::Data<DbPool>, path: web::Path<i64>) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let thread = thread::find_by_id(&conn, path.into_inner())?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(thread))
}

/// POST /api/threads
/// Requires a non-empty title and content; author and tags are optional.
pub async fn create(
    pool: web::Data<DbPool>,
    body: web::Json<NewThread>,
) -> Result<HttpResponse, AppError> {
    let mut new = body.into_inner();
    new.title = new.title.trim().to_string();
    new.content = new.content.trim().to_string();
    if new.title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if new.content.is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }
    new.tags = tag::canonicalize(&new.tags)
        .map_err(|id| AppError::Validation(format!("Unknown tag id {id}")))?;

    let conn = pool.get()?;
    let created = thread::create(&conn, &new)?;
    log::info!("Created thread {} '{}'", created.id, created.title);
    Ok(HttpResponse::Created().json(created))
}

/// PUT /api/threads/{id}
/// Typed partial update; unknown body fields are rejected by the extractor.
pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    body: web::Json<ThreadPatch>,
) -> Result<HttpResponse, AppError> {
    let mut patch = body.into_inner();
    if let Some(title) = &patch.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        patch.title = Some(title);
    }
    if let Some(content) = &patch.content {
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::Validation("Content is required".to_string()));
        }
        patch.content = Some(content);
    }
    if let Some(tags) = &patch.tags {
        patch.tags = Some(
            tag::canonicalize(tags)
                .map_err(|id| AppError::Validation(format!("Unknown tag id {id}")))?,
        );
    }

    let conn = pool.get()?;
    let updated = thread::update(&conn, path.into_inner(), &patch)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/threads/{id}
pub async fn delete(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let conn = pool.get()?;
    if !thread::delete(&conn, id)? {
        return Err(AppError::NotFound);
    }
    log::info!("Deleted thread {id}");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Thread deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct VoteBody {
    pub direction: VoteDirection,
}

/// POST /api/threads/{id}/vote
/// Applies a flat +1/-1 and returns the new count. No deduplication:
/// the per-agent ledger lives on the client.
pub async fn vote(
    pool: web::Data<DbPool>,
    path: web::Path<i64>,
    body: web::Json<VoteBody>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let votes =
        thread::vote(&conn, path.into_inner(), body.direction)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "votes": votes })))
}
