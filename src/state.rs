use std::sync::Arc;

use sqlx::PgPool;

use crate::users::{
    password::{HashError, PasswordHasher},
    repo::{PgUserRepository, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub hasher: PasswordHasher,
}

impl AppState {
    /// Production wiring: Postgres-backed store, fixed bcrypt cost.
    pub fn with_pool(db: PgPool) -> Result<Self, HashError> {
        Ok(Self::from_parts(
            Arc::new(PgUserRepository::new(db)),
            PasswordHasher::new()?,
        ))
    }

    pub fn from_parts(users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }
}
