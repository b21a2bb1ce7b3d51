use sqlx::{Sqlite, SqlitePool};

use crate::{data_formats::RegisterRequest, errors::RequestError, models::User};

pub async fn insert_user(pool: &SqlitePool, user: &RegisterRequest) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<Sqlite, User>(
        r#"
        INSERT INTO users (email, username, password)
        VALUES ($1, $2, $3)
        RETURNING id, username, email, password, image, bio, created_at
        "#,
    )
    .bind(user.email.clone())
    .bind(user.username.clone())
    .bind(user.password.clone())
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(user)
}
