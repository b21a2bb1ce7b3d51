use sqlx::{Sqlite, SqlitePool};

use crate::models::User;

mod comment_helpers;
mod group_helpers;
mod post_helpers;
mod profile_helpers;
mod user_helpers;

pub use comment_helpers::*;
pub use group_helpers::*;
pub use post_helpers::*;
pub use profile_helpers::*;
pub use user_helpers::*;

/// A parameter for a built query, kept typed so integer columns are bound as
/// integers rather than coerced through text affinity.
#[derive(Debug, PartialEq)]
enum SqlParam {
    Text(String),
    Int(i64),
}

/// Accumulates `column = ?` fragments for a partial UPDATE, skipping fields
/// the request left out.
struct UpdateBuilder {
    columns: Vec<&'static str>,
    params: Vec<SqlParam>,
}

impl UpdateBuilder {
    fn new() -> Self {
        UpdateBuilder {
            columns: Vec::new(),
            params: Vec::new(),
        }
    }

    fn set(mut self, column: &'static str, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.columns.push(column);
            self.params.push(SqlParam::Text(value));
        }
        self
    }

    fn set_id(mut self, column: &'static str, value: Option<i64>) -> Self {
        if let Some(value) = value {
            self.columns.push(column);
            self.params.push(SqlParam::Int(value));
        }
        self
    }

    /// Returns the SET clause and its parameters, or None when no field was
    /// provided at all.
    fn build(self) -> Option<(String, Vec<SqlParam>)> {
        if self.columns.is_empty() {
            return None;
        }
        let clause = self
            .columns
            .iter()
            .map(|column| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");
        Some((clause, self.params))
    }
}

/// Paginator bookkeeping with `get_page` clamping semantics: a listing always
/// has at least one page, and out-of-range requests land on the nearest valid
/// page instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub num_pages: u32,
    pub count: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn clamp(requested: u32, count: i64, per_page: i64) -> Self {
        let num_pages = ((count + per_page - 1) / per_page).max(1) as u32;
        let page = requested.clamp(1, num_pages);
        let offset = (page as i64 - 1) * per_page;
        Pagination {
            page,
            num_pages,
            count,
            limit: per_page,
            offset,
        }
    }
}

// ----------------- Helper Functions -----------------

const USER_QUERY: &str =
    "SELECT id, username, email, password, image, bio, created_at FROM users";

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    let query = format!("{} WHERE username = $1", USER_QUERY);
    sqlx::query_as::<Sqlite, User>(&query)
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    let query = format!("{} WHERE email = $1", USER_QUERY);
    sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let query = format!("{} WHERE id = $1", USER_QUERY);
    sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}
