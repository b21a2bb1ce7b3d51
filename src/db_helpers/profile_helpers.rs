use sqlx::{Sqlite, SqlitePool};

use crate::{
    errors::RequestError,
    models::{Follow, User},
};

use super::{count_posts_by_author_in_db, get_user_by_username};

pub async fn get_profile_in_db(
    pool: &SqlitePool,
    viewer_id: Option<i64>,
    username: &str,
) -> Result<(User, i64, bool), RequestError> {
    let author = match get_user_by_username(pool, username).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound("User not found")),
    };
    let post_count = count_posts_by_author_in_db(pool, author.id).await?;
    let following = match viewer_id {
        Some(viewer_id) => follow_exists_in_db(pool, viewer_id, author.id).await?,
        None => false,
    };
    Ok((author, post_count, following))
}

pub async fn follow_exists_in_db(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, RequestError> {
    let follow = sqlx::query_as::<Sqlite, Follow>(
        "SELECT user_id, author_id FROM follows WHERE user_id = $1 AND author_id = $2",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await?;
    Ok(follow.is_some())
}

/// Idempotent: the follows table has a UNIQUE (user_id, author_id) pair and
/// the insert is ON CONFLICT DO NOTHING, so a repeated follow is a no-op.
pub async fn follow_author_in_db(
    pool: &SqlitePool,
    user_id: i64,
    username: &str,
) -> Result<(User, i64), RequestError> {
    let author = match get_user_by_username(pool, username).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound("User not found")),
    };
    if author.id == user_id {
        return Err(RequestError::RunTimeError("You cannot follow yourself"));
    }

    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        INSERT INTO follows (user_id, author_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, author_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(author.id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;

    let post_count = count_posts_by_author_in_db(pool, author.id).await?;
    Ok((author, post_count))
}

pub async fn unfollow_author_in_db(
    pool: &SqlitePool,
    user_id: i64,
    username: &str,
) -> Result<(User, i64), RequestError> {
    let author = match get_user_by_username(pool, username).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound("User not found")),
    };
    if author.id == user_id {
        return Err(RequestError::RunTimeError("You cannot unfollow yourself"));
    }

    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
        .bind(user_id)
        .bind(author.id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;

    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Follow not found"));
    }

    let post_count = count_posts_by_author_in_db(pool, author.id).await?;
    Ok((author, post_count))
}
