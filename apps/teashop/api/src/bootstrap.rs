//! Data every fresh deployment needs before serving traffic.

use domain_catalog::{CatalogRepository, CatalogService};
use domain_users::{UserRepository, UserService};
use tracing::info;

use crate::config::AdminAccount;

/// Seed the default categories and, when configured, the admin account.
///
/// Both steps are idempotent, so this runs on every start.
pub async fn run<C, U>(
    catalog: &CatalogService<C>,
    users: &UserService<U>,
    admin: Option<&AdminAccount>,
) -> eyre::Result<()>
where
    C: CatalogRepository,
    U: UserRepository,
{
    let seeded = catalog.seed_default_categories().await?;
    if seeded > 0 {
        info!(count = seeded, "Default categories created");
    }

    if let Some(admin) = admin {
        if users.ensure_admin(&admin.email, &admin.password).await? {
            info!(email = %admin.email, "Bootstrap administrator created");
        }
    }

    Ok(())
}
