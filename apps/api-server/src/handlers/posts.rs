//! Post CRUD handlers.

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{Post, PostChanges, User};
use quill_core::policy;
use quill_shared::dto::{AuthorResponse, PostResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart payload for POST /post. The cover file is required.
#[derive(Debug, MultipartForm)]
pub struct CreatePostForm {
    pub title: Text<String>,
    pub summary: Text<String>,
    pub content: Text<String>,
    pub file: Option<TempFile>,
}

/// Multipart payload for PUT /post/{id}. The cover file is optional;
/// when absent the existing cover is kept.
#[derive(Debug, MultipartForm)]
pub struct UpdatePostForm {
    pub title: Text<String>,
    pub summary: Text<String>,
    pub content: Text<String>,
    pub file: Option<TempFile>,
}

fn to_response(post: Post, author_id: Uuid, author_username: String) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        title: post.title,
        summary: post.summary,
        content: post.content,
        cover: post.cover,
        author: AuthorResponse {
            id: author_id.to_string(),
            username: author_username,
        },
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.to_rfc3339(),
    }
}

fn joined_response((post, author): (Post, User)) -> PostResponse {
    let author_id = author.id;
    to_response(post, author_id, author.username)
}

/// Read the uploaded temp file and move its bytes into the upload store.
async fn store_cover(state: &AppState, file: TempFile) -> AppResult<String> {
    let original_name = file
        .file_name
        .ok_or_else(|| AppError::BadRequest("Uploaded file has no name".to_string()))?;

    let data = tokio::fs::read(file.file.path())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(state.uploads.store(&original_name, &data).await?)
}

/// POST /post
pub async fn create_post(
    identity: Identity,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<CreatePostForm>,
) -> AppResult<HttpResponse> {
    let file = form
        .file
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let title = form.title.into_inner();
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }

    let cover = store_cover(state.get_ref(), file).await?;

    let post = Post::new(
        identity.user_id,
        title,
        form.summary.into_inner(),
        form.content.into_inner(),
        cover,
    );
    let saved = state.posts.insert(post).await?;

    tracing::info!(post_id = %saved.id, author = %identity.username, "Post created");

    Ok(HttpResponse::Ok().json(to_response(saved, identity.user_id, identity.username)))
}

/// GET /post - all posts, newest first, authors joined.
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_recent().await?;

    let body: Vec<PostResponse> = posts.into_iter().map(joined_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /post/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let joined = state
        .posts
        .find_with_author(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(joined_response(joined)))
}

/// PUT /post/{id}
pub async fn update_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    MultipartForm(form): MultipartForm<UpdatePostForm>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let mut post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    // Ownership gate: only the author may mutate.
    if !policy::can_mutate(&post, identity.user_id) {
        return Err(AppError::Forbidden(
            "You are not authorized to update this post".to_string(),
        ));
    }

    let title = form.title.into_inner();
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }

    let cover = match form.file {
        Some(file) => Some(store_cover(state.get_ref(), file).await?),
        None => None,
    };

    post.apply(PostChanges {
        title,
        summary: form.summary.into_inner(),
        content: form.content.into_inner(),
        cover,
    });

    let saved = state.posts.update(post).await?;

    tracing::info!(post_id = %saved.id, author = %identity.username, "Post updated");

    Ok(HttpResponse::Ok().json(to_response(saved, identity.user_id, identity.username)))
}
