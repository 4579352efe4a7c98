use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::users::{CreateUser, UpdateUser};

/// Creates the configured administrator, or repairs its password, admin flag
/// and active flag when the row already exists.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let username = &admin.first_superuser_username;
    let now = primitive_now_utc();

    if let Some(user) = repositories::users::find_by_username(state.db(), username).await? {
        let verified =
            security::verify_password(&admin.first_superuser_password, &user.hashed_password)
                .unwrap_or(false);

        let update = UpdateUser {
            hashed_password: if verified {
                None
            } else {
                Some(security::hash_password(&admin.first_superuser_password)?)
            },
            is_active: (!user.is_active).then_some(true),
            is_admin: (!user.is_admin).then_some(true),
            updated_at: now,
        };

        if update.hashed_password.is_some() || update.is_active.is_some() || update.is_admin.is_some()
        {
            repositories::users::update(state.db(), &user.id, update).await?;
            tracing::info!(username = %username, "Updated default superuser");
        } else {
            tracing::info!("Default superuser already up to date");
        }

        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_superuser_password)?;
    repositories::users::create(
        state.db(),
        CreateUser {
            id: &Uuid::new_v4().to_string(),
            username,
            email: &admin.first_superuser_email,
            hashed_password,
            is_active: true,
            is_admin: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!(username = %username, "Created default superuser");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_superuser;
    use crate::core::security;
    use crate::repositories;
    use crate::test_support;

    #[tokio::test]
    async fn creates_then_repairs_superuser() {
        let ctx = test_support::setup_test_context().await;
        let admin = ctx.state.settings().admin().clone();

        ensure_superuser(&ctx.state).await.expect("create superuser");
        let user = repositories::users::find_by_username(ctx.state.db(), &admin.first_superuser_username)
            .await
            .expect("query")
            .expect("superuser exists");
        assert!(user.is_admin);
        assert!(user.is_active);

        sqlx::query("UPDATE users SET is_admin = FALSE, hashed_password = 'stale' WHERE id = $1")
            .bind(&user.id)
            .execute(ctx.state.db())
            .await
            .expect("demote");

        ensure_superuser(&ctx.state).await.expect("repair superuser");
        let repaired = repositories::users::find_by_id(ctx.state.db(), &user.id)
            .await
            .expect("query")
            .expect("superuser exists");
        assert!(repaired.is_admin);
        assert!(
            security::verify_password(&admin.first_superuser_password, &repaired.hashed_password)
                .expect("verify")
        );
    }
}
