//! # Session
//!
//! Everything that lives from login to logout: the bearer token, the signed-in
//! user, the advisory cache and the polling tasks. Views receive a
//! [`SessionContext`] explicitly instead of reaching for globals.
//!
//! ```ignore
//! let mut session = Session::start(backend, token, user, &config).await;
//! let view = views::orders::load(session.context()).await;
//! session.poll_orders(|view| render(view));
//! session.logout().await;
//! ```

pub mod cache;
pub mod poller;

pub use cache::{AdvisoryCache, CacheError, CacheKey};
pub use poller::{spawn_poller, PollHandle};

use crate::api::{AuthToken, StorefrontBackend};
use crate::config::StorefrontConfig;
use crate::views::orders::{self, OrdersView};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// What a view needs to talk to the backend on behalf of the signed-in user.
#[derive(Clone)]
pub struct SessionContext {
    backend: Arc<dyn StorefrontBackend>,
    auth: AuthToken,
    user: SessionUser,
    cache: AdvisoryCache,
}

impl SessionContext {
    pub fn backend(&self) -> &dyn StorefrontBackend {
        self.backend.as_ref()
    }

    pub fn auth(&self) -> &AuthToken {
        &self.auth
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn cache(&self) -> &AdvisoryCache {
        &self.cache
    }

    /// Stores a value in the advisory cache. Failures are logged and ignored.
    pub async fn remember<T: Serialize + ?Sized>(&self, key: CacheKey, value: &T) {
        if let Err(e) = self.cache.store(key, value).await {
            warn!(%key, error = %e, "Could not update advisory cache");
        }
    }

    /// Reads a value from the advisory cache. Failures read as absent.
    pub async fn recall<T: serde::de::DeserializeOwned>(&self, key: CacheKey) -> Option<T> {
        match self.cache.load(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(%key, error = %e, "Could not read advisory cache");
                None
            }
        }
    }

    /// Updates the cart-length marker shown in the header.
    pub async fn set_cart_length(&self, lines: usize) {
        self.remember(CacheKey::CartLength, &lines).await;
    }
}

/// A signed-in session. Created by [`Session::start`], ended by [`Session::logout`].
///
/// Dropping a session without logging out still stops its pollers.
pub struct Session {
    context: SessionContext,
    poll_interval: Duration,
    pollers: Vec<PollHandle>,
    cache_task: JoinHandle<()>,
}

impl Session {
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn start(
        backend: Arc<dyn StorefrontBackend>,
        auth: AuthToken,
        user: SessionUser,
        config: &StorefrontConfig,
    ) -> Self {
        let (cache, cache_task) = AdvisoryCache::start();
        let context = SessionContext {
            backend,
            auth,
            user,
            cache,
        };
        context.remember(CacheKey::Profile, context.user()).await;
        context
            .remember(CacheKey::AuthSession, context.auth().expose())
            .await;
        info!("Session started");
        Self {
            context,
            poll_interval: config.poll_interval,
            pollers: Vec::new(),
            cache_task,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn active_pollers(&self) -> usize {
        self.pollers.iter().filter(|p| !p.is_finished()).count()
    }

    /// Refreshes the orders screen every poll interval.
    ///
    /// `on_update` receives each successfully loaded view. A failed refresh is
    /// logged and the previous view stays on screen.
    pub fn poll_orders<F>(&mut self, on_update: F)
    where
        F: Fn(OrdersView) + Send + Sync + 'static,
    {
        let context = self.context.clone();
        let on_update = Arc::new(on_update);
        let handle = spawn_poller("orders", self.poll_interval, move || {
            let context = context.clone();
            let on_update = on_update.clone();
            async move {
                let snapshot = orders::fetch(&context).await?;
                on_update(OrdersView::Loaded(snapshot));
                Ok(())
            }
        });
        self.pollers.push(handle);
    }

    /// Stops every poller, empties the cache and waits for the cache actor to stop.
    ///
    /// [`SessionContext`] clones still held elsewhere outlive the session but no
    /// longer reach a cache: `remember` is a no-op and `recall` reads as absent.
    #[instrument(skip_all, fields(user_id = %self.context.user.id))]
    pub async fn logout(self) {
        let Session {
            context,
            pollers,
            cache_task,
            ..
        } = self;

        for poller in pollers {
            poller.cancel().await;
        }
        if let Err(e) = context.cache.clear().await {
            warn!(error = %e, "Could not clear advisory cache");
        }
        if let Err(e) = context.cache.shutdown().await {
            warn!(error = %e, "Could not stop advisory cache");
        }
        if let Err(e) = cache_task.await {
            warn!(error = %e, "Cache task failed");
        }
        info!("Session ended");
    }
}
