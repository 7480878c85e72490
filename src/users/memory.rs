use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    repo::{RepoError, UserStore},
    repo_types::{NewUser, User},
};

/// `UserStore` over a `Vec`, with the same uniqueness rules as the table.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn rows(&self) -> Vec<User> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<i64, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(clash) = rows
            .iter()
            .find(|r| r.username == user.username || r.email == user.email)
        {
            let constraint = if clash.username == user.username {
                "users_username_key"
            } else {
                "users_email_key"
            };
            return Err(RepoError::Conflict {
                constraint: Some(constraint.into()),
            });
        }
        let id = rows.len() as i64 + 1;
        rows.push(User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            created_at: user.created_at,
            is_active: true,
        });
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.id == id).cloned())
    }
}

/// Store whose every call fails, for exercising the 500 path.
pub struct BrokenUserStore;

#[async_trait]
impl UserStore for BrokenUserStore {
    async fn insert(&self, _user: NewUser) -> Result<i64, RepoError> {
        Err(RepoError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, RepoError> {
        Err(RepoError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<User>, RepoError> {
        Err(RepoError::Database(sqlx::Error::PoolTimedOut))
    }
}
