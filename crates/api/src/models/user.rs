//! User record and view.

use serde::Serialize;

use comercio_core::{Email, UserId};

/// A registered user.
///
/// Users are created via signup and immutable afterwards. The password is
/// stored as an argon2 hash; it never leaves the storage layer.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password_hash: String,
}

/// Data needed to create a user. The storage layer assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
}

/// Public JSON shape of a user. No password material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
