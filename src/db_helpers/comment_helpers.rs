use sqlx::{Sqlite, SqlitePool};

use crate::{data_formats::CommentRequest, errors::RequestError, models::Comment};

use super::get_post_by_id_in_db;

const COMMENT_QUERY: &str = r#"
            SELECT comments.id         AS "id",
                   comments.text       AS "text",
                   comments.created_at AS "created_at",
                   comments.post_id    AS "post_id",
                   comments.author_id  AS "author_id",
                   users.username      AS "author_username"
            FROM   comments
                JOIN users
                    ON comments.author_id = users.id
    "#;

pub async fn add_comment_to_post_in_db(
    pool: &SqlitePool,
    author_id: i64,
    post_id: i64,
    CommentRequest { text }: CommentRequest,
) -> Result<Comment, RequestError> {
    let post = get_post_by_id_in_db(pool, post_id).await?;

    let mut tx = pool.begin().await?;
    let id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO comments (text, author_id, post_id)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(text)
    .bind(author_id)
    .bind(post.id)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;

    get_comment_by_id_in_db(pool, id).await
}

async fn get_comment_by_id_in_db(pool: &SqlitePool, id: i64) -> Result<Comment, RequestError> {
    let query = format!("{} WHERE comments.id = $1", COMMENT_QUERY);
    let comment = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match comment {
        Some(comment) => Ok(comment),
        None => Err(RequestError::NotFound("Comment not found")),
    }
}

/// Comments come back oldest first, the order the detail page shows them.
pub async fn get_comments_for_post_in_db(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<Comment>, RequestError> {
    let post = get_post_by_id_in_db(pool, post_id).await?;
    let query = format!(
        "{} WHERE comments.post_id = $1 ORDER BY comments.created_at ASC, comments.id ASC",
        COMMENT_QUERY
    );
    let comments = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(post.id)
        .fetch_all(pool)
        .await?;
    Ok(comments)
}
