//! Application state shared across handlers.

use std::collections::HashMap;
use std::sync::Arc;

use bigcommerce_client::auth::AuthUser;
use bigcommerce_client::{App, AuthContext, BigCommerceError, Client};
use bigcommerce_core::StoreHash;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

use crate::config::AppConfig;

/// A store that has installed the app.
#[derive(Clone)]
pub struct Install {
    pub store_hash: StoreHash,
    pub access_token: SecretString,
    pub scope: String,
    pub user: AuthUser,
    pub installed_at: DateTime<Utc>,
}

impl std::fmt::Debug for Install {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Install")
            .field("store_hash", &self.store_hash)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("user", &self.user)
            .field("installed_at", &self.installed_at)
            .finish()
    }
}

impl Install {
    /// Record a completed token exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the context does not name a valid store.
    pub fn from_auth_context(context: &AuthContext) -> Result<Self, BigCommerceError> {
        Ok(Self {
            store_hash: context.store_hash()?,
            access_token: SecretString::from(context.access_token.expose_secret()),
            scope: context.scope.clone(),
            user: context.user.clone(),
            installed_at: Utc::now(),
        })
    }
}

/// Installed stores, keyed by store hash.
///
/// Kept in memory; a restart forgets every install.
#[derive(Debug, Default)]
pub struct InstallRegistry {
    installs: RwLock<HashMap<StoreHash, Install>>,
}

impl InstallRegistry {
    /// Record an install, replacing any earlier one for the same store.
    pub async fn insert(&self, install: Install) -> Option<Install> {
        self.installs
            .write()
            .await
            .insert(install.store_hash.clone(), install)
    }

    /// Forget a store.
    pub async fn remove(&self, store_hash: &StoreHash) -> Option<Install> {
        self.installs.write().await.remove(store_hash)
    }

    /// Look up a store's install.
    pub async fn get(&self, store_hash: &StoreHash) -> Option<Install> {
        self.installs.read().await.get(store_hash).cloned()
    }

    /// Whether a store has the app installed.
    pub async fn contains(&self, store_hash: &StoreHash) -> bool {
        self.installs.read().await.contains_key(store_hash)
    }

    /// Number of installed stores.
    pub async fn len(&self) -> usize {
        self.installs.read().await.len()
    }

    /// Whether no store has the app installed.
    pub async fn is_empty(&self) -> bool {
        self.installs.read().await.is_empty()
    }
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    app: App,
    installs: InstallRegistry,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the OAuth app cannot be built from `config`.
    pub fn new(config: AppConfig) -> Result<Self, BigCommerceError> {
        let app = config.build_app()?;
        Ok(Self::with_app(config, app))
    }

    /// Create state around an already-built app.
    #[must_use]
    pub fn with_app(config: AppConfig, app: App) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                app,
                installs: InstallRegistry::default(),
            }),
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the OAuth app.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.inner.app
    }

    /// Get the install registry.
    #[must_use]
    pub fn installs(&self) -> &InstallRegistry {
        &self.inner.installs
    }

    /// A REST client for an installed store, or `None` if it is not installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub async fn client_for(&self, store_hash: &StoreHash) -> Result<Option<Client>, BigCommerceError> {
        let Some(install) = self.installs().get(store_hash).await else {
            return Ok(None);
        };
        self.app()
            .client_for(install.store_hash, install.access_token)
            .map(Some)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bigcommerce_core::UserId;

    use super::*;

    fn install(hash: &str) -> Install {
        Install {
            store_hash: StoreHash::parse(hash).unwrap(),
            access_token: SecretString::from("tok_q8Zr1LmX"),
            scope: "store_v2_products_read_only".to_string(),
            user: AuthUser {
                id: UserId::new(24654),
                username: "owner".to_string(),
                email: "owner@example.test".to_string(),
            },
            installed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_registry_insert_replace_remove() {
        let registry = InstallRegistry::default();
        let hash = StoreHash::parse("abc123").unwrap();

        assert!(registry.insert(install("abc123")).await.is_none());
        assert!(registry.insert(install("abc123")).await.is_some());
        assert_eq!(registry.len().await, 1);
        assert!(registry.contains(&hash).await);

        assert!(registry.remove(&hash).await.is_some());
        assert!(registry.is_empty().await);
        assert!(registry.remove(&hash).await.is_none());
    }

    #[test]
    fn test_install_debug_redacts_token() {
        let debug = format!("{:?}", install("abc123"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("tok_q8Zr1LmX"));
    }
}
