//! Cached admin role lookups.
//!
//! Positive and negative answers are cached for the configured TTL, so a
//! grant or revoke takes effect within that window. Failed lookups are
//! never cached and are reported as "not admin".

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, warn};

use prompt_market_core::UserId;

use crate::db::RepositoryError;
use crate::db::roles::RoleRepository;

/// Admin role checker with a short-lived cache.
#[derive(Clone)]
pub struct AdminCheck {
    inner: Arc<AdminCheckInner>,
}

struct AdminCheckInner {
    cache: Cache<UserId, bool>,
}

impl AdminCheck {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(AdminCheckInner { cache }),
        }
    }

    /// Whether `user_id` is an administrator.
    ///
    /// Any failure reading roles yields `false`.
    pub async fn is_admin(&self, pool: &PgPool, user_id: UserId) -> bool {
        self.resolve(user_id, RoleRepository::new(pool).is_admin(user_id))
            .await
    }

    /// Drop the cached answer for `user_id`, e.g. after a grant.
    pub async fn invalidate(&self, user_id: UserId) {
        self.inner.cache.invalidate(&user_id).await;
    }

    async fn resolve(
        &self,
        user_id: UserId,
        lookup: impl Future<Output = Result<bool, RepositoryError>>,
    ) -> bool {
        if let Some(is_admin) = self.inner.cache.get(&user_id).await {
            debug!(%user_id, is_admin, "Admin check cache hit");
            return is_admin;
        }

        match lookup.await {
            Ok(is_admin) => {
                self.inner.cache.insert(user_id, is_admin).await;
                is_admin
            }
            Err(e) => {
                warn!(%user_id, error = %e, "Admin role lookup failed; denying");
                false
            }
        }
    }
}
