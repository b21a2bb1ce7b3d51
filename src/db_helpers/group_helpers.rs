use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Group};

pub async fn get_group_by_slug_in_db(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Group, RequestError> {
    let group = sqlx::query_as::<Sqlite, Group>(
        "SELECT id, title, slug, description FROM groups WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    match group {
        Some(group) => Ok(group),
        None => Err(RequestError::NotFound("Group not found")),
    }
}

/// Groups have no creation route; admin tooling and the test suite insert
/// them directly.
pub async fn create_group_in_db(
    pool: &SqlitePool,
    title: &str,
    slug: &str,
    description: &str,
) -> Result<Group, RequestError> {
    let mut tx = pool.begin().await?;
    let group = sqlx::query_as::<Sqlite, Group>(
        r#"
        INSERT INTO groups (title, slug, description)
        VALUES ($1, $2, $3)
        RETURNING id, title, slug, description
        "#,
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(group)
}
