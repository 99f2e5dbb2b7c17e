use sqlx::PgPool;
use tracing::info;

use crate::auth::password::hash_password;
use crate::roles::repo::Role;
use crate::users::repo::User;

const DEMO_PASSWORD: &str = "Test@1234";

/// Idempotent startup seeding: the standard roles always, demo accounts
/// only when `SEED_DEMO_USERS=true`.
pub async fn run(db: &PgPool) -> anyhow::Result<()> {
    seed_roles(db).await?;

    let demo = std::env::var("SEED_DEMO_USERS")
        .map(|v| v == "true")
        .unwrap_or(false);
    if demo {
        seed_users(db).await?;
    }
    Ok(())
}

async fn seed_roles(db: &PgPool) -> anyhow::Result<()> {
    if Role::count(db).await? > 0 {
        info!("roles already exist, skipping seeding");
        return Ok(());
    }

    let roles = [
        ("Super Admin", "All access to all features"),
        ("Admin", "Limited access to all features"),
        ("User", "User-related modules permission."),
    ];
    for (name, description) in roles {
        Role::create(db, name, Some(description)).await?;
    }
    info!("roles seeded");
    Ok(())
}

async fn seed_users(db: &PgPool) -> anyhow::Result<()> {
    if User::count(db).await? > 0 {
        info!("users already exist, skipping seeding");
        return Ok(());
    }

    let accounts = [
        ("Super", Some("Admin"), "superadmin@yopmail.com", "Super Admin"),
        ("Admin", None, "admin@yopmail.com", "Admin"),
        ("Normal", Some("User"), "testuser@yopmail.com", "User"),
    ];
    for (first, last, email, role_name) in accounts {
        let role = Role::find_by_name(db, role_name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("seed role {:?} missing", role_name))?;
        let hash = hash_password(DEMO_PASSWORD)?;
        User::create(db, first, last, email, &hash, role.id).await?;
    }
    info!("demo users seeded");
    Ok(())
}
