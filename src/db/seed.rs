use anyhow::Result;
use chrono::Utc;
use sea_orm::Set;
use tracing::info;

use super::Store;
use super::repositories::hash_password;
use crate::config::Config;
use crate::entities::users;

/// Role name that gates the admin-only endpoints.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Ensure the ADMIN role and the configured admin user exist. Runs at
/// every startup and is a no-op once both are in place.
pub async fn seed_admin(store: &Store, config: &Config) -> Result<()> {
    let uow = store.begin().await?;

    let role = match uow.users().get_role_by_name(ADMIN_ROLE).await? {
        Some(role) => role,
        None => uow.users().create_role(ADMIN_ROLE).await?,
    };

    if uow
        .users()
        .get_by_username(&config.admin.username)
        .await?
        .is_none()
    {
        let password_hash = hash_password(config.admin.password.clone()).await?;
        let now = Utc::now().to_rfc3339();

        let user = uow
            .users()
            .create(users::ActiveModel {
                username: Set(config.admin.username.clone()),
                email: Set(config.admin.email.clone()),
                password_hash: Set(password_hash),
                refresh_token: Set(None),
                refresh_token_expires_at: Set(None),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            })
            .await?;

        uow.users().assign_role(user.id, role.id).await?;

        info!("Seeded admin user '{}'", config.admin.username);
    }

    uow.commit().await?;

    Ok(())
}
