/*
 * Responsibility
 * - Users の request/response DTO
 * - signup の形式チェック + 正規化 (trim + lowercase) は validate() で行う
 * - password は response に含めない
 */
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::user_repo::UserRow;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 50;
const EMAIL_MAX: usize = 100;
const PASSWORD_MIN: usize = 4;
const MIN_AGE_YEARS: i32 = 18;

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub dob: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
}

/// Signup data after validation, normalized for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSignup {
    pub username: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub dob: NaiveDate,
    pub country: String,
    pub gender: String,
}

impl CreateUserRequest {
    /// First failing rule wins; its message is returned to the client.
    pub fn validate(self, today: NaiveDate) -> Result<ValidSignup, String> {
        let username = name("username", self.username)?;
        let first_name = name("first_name", self.first_name)?;
        let middle_name = match self.middle_name {
            Some(raw) => Some(name("middle_name", Some(raw))?),
            None => None,
        };
        let surname = name("surname", self.surname)?;
        let email = email(self.email)?;

        let password = required("password", self.password)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(format!(
                "password must be at least {PASSWORD_MIN} characters long"
            ));
        }

        let dob = required("dob", self.dob)?;
        let dob = NaiveDate::parse_from_str(dob.trim(), "%Y-%m-%d")
            .map_err(|_| "dob must be a date (YYYY-MM-DD)".to_string())?;
        // calendar-year difference, not exact age
        if today.year() - dob.year() <= MIN_AGE_YEARS {
            return Err(format!("users must be older than {MIN_AGE_YEARS}"));
        }

        let country = normalize(&required("country", self.country)?);
        if country.is_empty() {
            return Err("country is required".to_string());
        }

        let gender = normalize(&required("gender", self.gender)?);
        if gender != "male" && gender != "female" {
            return Err("gender must be one of [male, female]".to_string());
        }

        Ok(ValidSignup {
            username,
            first_name,
            middle_name,
            surname,
            email,
            password,
            dob,
            country,
            gender,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, String> {
    value.ok_or_else(|| format!("{field} is required"))
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn name(field: &str, value: Option<String>) -> Result<String, String> {
    let value = normalize(&required(field, value)?);
    let len = value.chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Err(format!(
            "{field} must be between {NAME_MIN} and {NAME_MAX} characters long"
        ));
    }
    Ok(value)
}

fn email(value: Option<String>) -> Result<String, String> {
    let value = normalize(&required("email", value)?);
    if value.chars().count() > EMAIL_MAX || !looks_like_email(&value) {
        return Err("email must be a valid email".to_string());
    }
    Ok(value)
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub surname: String,
    pub email: String,
    pub dob: NaiveDate,
    pub country: String,
    pub gender: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.user_id,
            username: row.username,
            first_name: row.first_name,
            middle_name: row.middle_name,
            surname: row.surname,
            email: row.email,
            dob: row.dob,
            country: row.country,
            gender: row.gender,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PictureResponse {
    pub url: String,
}
