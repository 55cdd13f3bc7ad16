//! Post persistence. Every read is scoped to the owning user.

use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::analytics::tracking::track_selection;
use crate::errors::AppError;
use crate::generation::generator::GeneratedContent;
use crate::models::post::{ContentType, PostRow, PostWithAuthor, SelectedOption};

const POST_NOT_FOUND: &str = "Post not found";

/// Inserts a freshly generated post and returns it joined with its author.
pub async fn insert_post(
    pool: &PgPool,
    user_id: Uuid,
    prompt: &str,
    content_type: ContentType,
    content: &GeneratedContent,
) -> Result<PostWithAuthor, sqlx::Error> {
    sqlx::query_as::<_, PostWithAuthor>(
        r#"
        WITH inserted AS (
            INSERT INTO posts
                (id, user_id, prompt, content_type, option_a, option_b, ai_model, response_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
        )
        SELECT inserted.*, u.full_name AS author_full_name, u.email AS author_email
        FROM inserted
        JOIN users u ON u.id = inserted.user_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(prompt)
    .bind(content_type)
    .bind(Json(&content.option_a))
    .bind(Json(&content.option_b))
    .bind(content.ai_model)
    .bind(content.response_time_ms)
    .fetch_one(pool)
    .await
}

/// All of a user's posts, newest first.
pub async fn list_posts_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<PostWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, PostWithAuthor>(
        r#"
        SELECT p.*, u.full_name AS author_full_name, u.email AS author_email
        FROM posts p
        JOIN users u ON u.id = p.user_id
        WHERE p.user_id = $1
        ORDER BY p.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

async fn fetch_owned(
    conn: &mut PgConnection,
    user_id: Uuid,
    post_id: Uuid,
) -> Result<Option<PostWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, PostWithAuthor>(
        r#"
        SELECT p.*, u.full_name AS author_full_name, u.email AS author_email
        FROM posts p
        JOIN users u ON u.id = p.user_id
        WHERE p.id = $1 AND p.user_id = $2
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

/// One post owned by `user_id`. Another user's post is reported as not found.
pub async fn find_post_for_user(
    pool: &PgPool,
    user_id: Uuid,
    post_id: Uuid,
) -> Result<PostWithAuthor, AppError> {
    let mut conn = pool.acquire().await?;
    fetch_owned(&mut conn, user_id, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(POST_NOT_FOUND.to_string()))
}

/// Records the user's choice and its analytics row in one transaction.
///
/// The post row is locked first, so concurrent selections serialize: the
/// first one wins and the rest see `selected_option` already set.
pub async fn record_selection(
    pool: &PgPool,
    user_id: Uuid,
    post_id: Uuid,
    selected: SelectedOption,
) -> Result<PostWithAuthor, AppError> {
    let mut tx = pool.begin().await?;

    let post = sqlx::query_as::<_, PostRow>(
        "SELECT * FROM posts WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(POST_NOT_FOUND.to_string()))?;

    if let Some(existing) = post.selected_option {
        return Err(AppError::Conflict(format!(
            "Option {} was already selected for this post",
            existing.as_str()
        )));
    }

    sqlx::query("UPDATE posts SET selected_option = $1, updated_at = NOW() WHERE id = $2")
        .bind(selected)
        .bind(post.id)
        .execute(&mut *tx)
        .await?;

    track_selection(&mut tx, &post, selected).await?;

    let updated = fetch_owned(&mut tx, user_id, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(POST_NOT_FOUND.to_string()))?;

    tx.commit().await?;

    Ok(updated)
}
