use sqlx::PgPool;
use tracing::info;

use crate::{
    auth::password::hash_password,
    users::repo::{Role, User},
};

const DEMO_USERS: [(&str, &str, Role, &str); 3] = [
    ("admin@demo.com", "Admin", Role::Admin, "Admin123!"),
    ("manager@demo.com", "Manager", Role::Manage, "Manager123!"),
    ("employee@demo.com", "Employee", Role::Employee, "Employee123!"),
];

/// Ensures the three demo accounts exist, keyed by case-insensitive email.
/// Existing rows get a password hash if theirs is blank and their role
/// corrected if it drifted.
pub async fn seed_demo_users(db: &PgPool) -> anyhow::Result<()> {
    for (email, full_name, role, password) in DEMO_USERS {
        match User::find_by_email(db, email).await? {
            None => {
                let hash = hash_password(password)?;
                let user = User::create(db, full_name, email, role, &hash).await?;
                info!(user_id = %user.id, %email, role = role.as_str(), "seeded demo user");
            }
            Some(existing) => {
                if existing.password_hash.trim().is_empty() {
                    let hash = hash_password(password)?;
                    User::set_password_hash(db, existing.id, &hash).await?;
                    info!(user_id = %existing.id, %email, "reset blank demo password hash");
                }
                if existing.role != role {
                    User::update(db, existing.id, &existing.full_name, &existing.email, role)
                        .await?;
                    info!(user_id = %existing.id, %email, role = role.as_str(), "corrected demo user role");
                }
            }
        }
    }
    Ok(())
}
