use anyhow::{Context, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ColumnTrait, DatabaseTransaction, ModelTrait, Set};
use tokio::task;

use super::generic::Repository;
use crate::entities::{
    prelude::{Roles, Users},
    roles, user_roles, users,
};

pub struct UsersRepository<'u> {
    inner: Repository<'u, Users>,
}

impl<'u> UsersRepository<'u> {
    #[must_use]
    pub const fn new(txn: &'u DatabaseTransaction) -> Self {
        Self {
            inner: Repository::new(txn),
        }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        self.inner.get(users::Column::Username.eq(username)).await
    }

    /// Names of every role assigned to the user.
    pub async fn roles_for(&self, user: &users::Model) -> Result<Vec<String>> {
        let roles = user
            .find_related(Roles)
            .all(self.inner.txn())
            .await
            .context("Failed to load user roles")?;

        Ok(roles.into_iter().map(|role| role.name).collect())
    }

    pub async fn create(&self, model: users::ActiveModel) -> Result<users::Model> {
        self.inner.create(model).await
    }

    pub async fn update(&self, model: users::ActiveModel) -> Result<users::Model> {
        self.inner.update(model).await
    }

    pub async fn get_role_by_name(&self, name: &str) -> Result<Option<roles::Model>> {
        let repo: Repository<'_, Roles> = Repository::new(self.inner.txn());
        repo.get(roles::Column::Name.eq(name)).await
    }

    pub async fn create_role(&self, name: &str) -> Result<roles::Model> {
        let repo: Repository<'_, Roles> = Repository::new(self.inner.txn());
        repo.create(roles::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn assign_role(&self, user_id: i32, role_id: i32) -> Result<()> {
        let repo: Repository<'_, crate::entities::prelude::UserRoles> =
            Repository::new(self.inner.txn());
        repo.create(user_roles::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
        })
        .await?;
        Ok(())
    }
}

/// Check a password against a stored Argon2id hash.
/// Note: this uses `spawn_blocking` because Argon2 verification is
/// CPU-intensive and would block the async runtime if run directly.
pub async fn verify_password(password_hash: String, password: String) -> Result<bool> {
    let is_valid = task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        let argon2 = Argon2::default();
        Ok::<bool, anyhow::Error>(
            argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")??;

    Ok(is_valid)
}

/// Hash a password with Argon2id on a blocking task.
pub async fn hash_password(password: String) -> Result<String> {
    task::spawn_blocking(move || hash_password_sync(&password))
        .await
        .context("Password hashing task panicked")?
}

pub fn hash_password_sync(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
