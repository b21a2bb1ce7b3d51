use sqlx::{Sqlite, SqlitePool};

use crate::config;
use crate::data_formats::{CreatePostRequest, UpdatePostRequest};
use crate::errors::RequestError;
use crate::models::Post;

use super::{get_group_by_slug_in_db, Pagination, SqlParam, UpdateBuilder};

const POST_QUERY: &str = r#"
            SELECT posts.id          AS "id",
                   posts.text        AS "text",
                   posts.image       AS "image",
                   posts.created_at  AS "created_at",
                   posts.author_id   AS "author_id",
                   users.username    AS "author_username",
                   groups.slug       AS "group_slug",
                   groups.title      AS "group_title"
            FROM   posts
                JOIN users
                    ON posts.author_id = users.id
                LEFT JOIN groups
                    ON posts.group_id = groups.id
            WHERE  ( users.username = $1
                    OR $1 IS NULL )
                AND ( groups.slug = $2
                        OR $2 IS NULL )
                AND ( $3 IS NULL
                        OR posts.author_id IN (SELECT author_id
                                               FROM   follows
                                               WHERE  user_id = $3) )
            ORDER  BY posts.created_at DESC, posts.id DESC
            LIMIT  $4 OFFSET $5
    "#;

const POST_COUNT_QUERY: &str = r#"
            SELECT Count(*)
            FROM   posts
                JOIN users
                    ON posts.author_id = users.id
                LEFT JOIN groups
                    ON posts.group_id = groups.id
            WHERE  ( users.username = $1
                    OR $1 IS NULL )
                AND ( groups.slug = $2
                        OR $2 IS NULL )
                AND ( $3 IS NULL
                        OR posts.author_id IN (SELECT author_id
                                               FROM   follows
                                               WHERE  user_id = $3) )
    "#;

const SINGLE_POST_QUERY: &str = r#"
            SELECT posts.id          AS "id",
                   posts.text        AS "text",
                   posts.image       AS "image",
                   posts.created_at  AS "created_at",
                   posts.author_id   AS "author_id",
                   users.username    AS "author_username",
                   groups.slug       AS "group_slug",
                   groups.title      AS "group_title"
            FROM   posts
                JOIN users
                    ON posts.author_id = users.id
                LEFT JOIN groups
                    ON posts.group_id = groups.id
            WHERE  posts.id = $1
    "#;

/// Filter for the shared listing query. `None` fields match everything, so
/// the index, group, profile, and feed listings are one query with different
/// bindings.
#[derive(Debug, Default)]
pub struct PostFilter {
    pub author: Option<String>,
    pub group: Option<String>,
    pub followed_by: Option<i64>,
}

pub async fn list_posts_in_db(
    pool: &SqlitePool,
    filter: PostFilter,
    page: u32,
) -> Result<(Vec<Post>, Pagination), RequestError> {
    let per_page = config::max_records_per_page();
    let count: i64 = sqlx::query_scalar::<Sqlite, i64>(POST_COUNT_QUERY)
        .bind(filter.author.clone())
        .bind(filter.group.clone())
        .bind(filter.followed_by)
        .fetch_one(pool)
        .await?;

    let pagination = Pagination::clamp(page, count, per_page);
    let posts = sqlx::query_as::<Sqlite, Post>(POST_QUERY)
        .bind(filter.author)
        .bind(filter.group)
        .bind(filter.followed_by)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(pool)
        .await?;

    Ok((posts, pagination))
}

pub async fn get_post_by_id_in_db(pool: &SqlitePool, id: i64) -> Result<Post, RequestError> {
    let post = sqlx::query_as::<Sqlite, Post>(SINGLE_POST_QUERY)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match post {
        Some(post) => Ok(post),
        None => Err(RequestError::NotFound("Post not found")),
    }
}

pub async fn count_posts_by_author_in_db(
    pool: &SqlitePool,
    author_id: i64,
) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<Sqlite, i64>("SELECT Count(*) FROM posts WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create_post_in_db(
    pool: &SqlitePool,
    author_id: i64,
    CreatePostRequest { text, group, image }: CreatePostRequest,
) -> Result<Post, RequestError> {
    let group_id = match group {
        Some(slug) => {
            let group = get_group_by_slug_in_db(pool, &slug)
                .await
                .map_err(|_| RequestError::RunTimeError("Group not found"))?;
            Some(group.id)
        }
        None => None,
    };

    let mut tx = pool.begin().await?;
    let id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO posts (text, author_id, group_id, image)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(text)
    .bind(author_id)
    .bind(group_id)
    .bind(image)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;

    get_post_by_id_in_db(pool, id).await
}

pub async fn update_post_in_db(
    pool: &SqlitePool,
    author_id: i64,
    post_id: i64,
    UpdatePostRequest { text, group, image }: UpdatePostRequest,
) -> Result<Post, RequestError> {
    let post = get_post_by_id_in_db(pool, post_id).await?;
    if post.author_id != author_id {
        return Err(RequestError::Forbidden);
    }

    let group_id = match group {
        Some(slug) => {
            let group = get_group_by_slug_in_db(pool, &slug)
                .await
                .map_err(|_| RequestError::RunTimeError("Group not found"))?;
            Some(group.id)
        }
        None => None,
    };

    let built = UpdateBuilder::new()
        .set("text", text)
        .set_id("group_id", group_id)
        .set("image", image)
        .build();
    let (set_clause, params) = match built {
        Some(built) => built,
        None => return Ok(post),
    };

    let query = format!("UPDATE posts SET {} WHERE id = ? AND author_id = ?", set_clause);
    let mut query = sqlx::query(&query);
    for param in params {
        query = match param {
            SqlParam::Text(value) => query.bind(value),
            SqlParam::Int(value) => query.bind(value),
        };
    }

    let mut tx = pool.begin().await?;
    query.bind(post_id).bind(author_id).execute(&mut tx).await?;
    tx.commit().await?;

    get_post_by_id_in_db(pool, post_id).await
}
