use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::InputError;

/// A diver's profile. The password digest lives only in [`UserWithDigest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
    pub age: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserWithDigest {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Search result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Signup / create-user body. `password` is plaintext here and is hashed
/// before it reaches the store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
    pub age: i32,
    pub password: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), InputError> {
        let mut missing = Vec::new();
        if self.first_name.trim().is_empty() {
            missing.push("first_name");
        }
        if self.last_name.trim().is_empty() {
            missing.push("last_name");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if self.password.is_empty() {
            missing.push("password");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(InputError::MissingFields(missing))
        }
    }
}

/// Profile update. Absent fields keep their stored value; the password is
/// never touched here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub age: Option<i32>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl UserUpdate {
    pub fn apply_to(&self, user: &mut User) {
        if let Some(v) = &self.first_name {
            user.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            user.last_name = v.clone();
        }
        if let Some(v) = &self.email {
            user.email = v.clone();
        }
        if let Some(v) = self.latitude {
            user.latitude = v;
        }
        if let Some(v) = self.longitude {
            user.longitude = v;
        }
        if let Some(v) = self.age {
            user.age = v;
        }
        if let Some(v) = &self.bio {
            user.bio = Some(v.clone());
        }
        if let Some(v) = &self.avatar {
            user.avatar = Some(v.clone());
        }
    }
}
