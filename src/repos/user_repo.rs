/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - PgPool を受け取り作成・検索を提供
 * - unique 制約違反は RepoError::Conflict に変換
 */
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
    pub dob: NaiveDate,
    pub country: String,
    pub gender: String,
    pub created_at: DateTime<Utc>,
}

/// Normalized signup data (password already hashed).
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub first_name: &'a str,
    pub middle_name: Option<&'a str>,
    pub surname: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub dob: NaiveDate,
    pub country: &'a str,
    pub gender: &'a str,
}

const COLUMNS: &str = r#"
    user_id, username, first_name, middle_name, surname, email,
    password_hash, dob, country, gender, created_at
"#;

pub async fn create(db: &PgPool, user: &NewUser<'_>) -> RepoResult<UserRow> {
    let sql = format!(
        r#"
        INSERT INTO users
            (username, first_name, middle_name, surname, email,
             password_hash, dob, country, gender)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {COLUMNS}
        "#
    );

    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(user.username)
        .bind(user.first_name)
        .bind(user.middle_name)
        .bind(user.surname)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.dob)
        .bind(user.country)
        .bind(user.gender)
        .fetch_one(db)
        .await
        .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn get(db: &PgPool, user_id: Uuid) -> RepoResult<Option<UserRow>> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE user_id = $1");

    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(user_id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> RepoResult<Option<UserRow>> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");

    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(email)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

pub async fn find_by_username(db: &PgPool, username: &str) -> RepoResult<Option<UserRow>> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE username = $1");

    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(username)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

/// Login identifier lookup: email first, then username.
pub async fn find_by_login(db: &PgPool, login: &str) -> RepoResult<Option<UserRow>> {
    if let Some(row) = find_by_email(db, login).await? {
        return Ok(Some(row));
    }
    find_by_username(db, login).await
}

pub async fn exists(db: &PgPool, email: &str, username: &str) -> RepoResult<bool> {
    let (found,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM users WHERE email = $1 OR username = $2
        )
        "#,
    )
    .bind(email)
    .bind(username)
    .fetch_one(db)
    .await?;

    Ok(found)
}
