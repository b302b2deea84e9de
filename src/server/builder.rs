//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::AppState;
use super::list_registry::{ListRegistry, RegisteredList};
use super::router::{build_health_routes, build_list_routes};
use crate::config::ListsConfig;
use crate::core::adapter::{ClientFetcher, ListConfig, ServerFetcher};
use crate::core::auth::{DEFAULT_USER_HEADER, NoSession};
use crate::core::store::RecordStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for creating HTTP servers serving registered lists
///
/// Lists configured with ownership scoping are served by a server-context
/// fetcher reading the caller from the session header on every request;
/// all other lists are served unscoped.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryRecordStore::new())
///     .register_catalogue(&ListsConfig::default_config())?
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn RecordStore>>,
    lists: Vec<(String, ListConfig)>,
    session_header: String,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            lists: Vec::new(),
            session_header: DEFAULT_USER_HEADER.to_string(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the record store (required)
    pub fn with_store(mut self, store: impl RecordStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set an already shared record store (required)
    pub fn with_shared_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Header the upstream gateway uses to forward the caller id
    pub fn with_session_header(mut self, header: impl Into<String>) -> Self {
        self.session_header = header.into().to_ascii_lowercase();
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Serve `config` under `/lists/{name}`
    pub fn register_list(mut self, name: impl Into<String>, config: ListConfig) -> Self {
        self.lists.push((name.into(), config));
        self
    }

    /// Register every list of a catalogue
    pub fn register_catalogue(mut self, catalogue: &ListsConfig) -> Result<Self> {
        catalogue.validate()?;
        for definition in &catalogue.lists {
            self.lists
                .push((definition.name.clone(), definition.to_list_config()?));
        }
        Ok(self)
    }

    /// Build the list registry
    pub fn build_registry(&mut self) -> Result<ListRegistry> {
        let store = self
            .store
            .clone()
            .ok_or_else(|| anyhow::anyhow!("RecordStore is required. Call .with_store()"))?;

        let mut registry = ListRegistry::new();
        for (name, config) in self.lists.drain(..) {
            let list = if config.scope_column().is_some() {
                RegisteredList::Server(ServerFetcher::new(
                    config,
                    store.clone(),
                    Arc::new(NoSession),
                ))
            } else {
                RegisteredList::Client(ClientFetcher::new(config, store.clone()))
            };

            tracing::debug!(
                list = %name,
                collection = list.collection(),
                scoped = list.is_scoped(),
                "Registered list"
            );
            registry.register(name, list);
        }

        Ok(registry)
    }

    /// Build the final REST router
    ///
    /// This generates:
    /// - Health check routes
    /// - List routes
    /// - Custom routes
    pub fn build(mut self) -> Result<Router> {
        let registry = self.build_registry()?;
        let state = AppState {
            registry: Arc::new(registry),
            session_header: Arc::from(self.session_header.as_str()),
        };

        let mut app = build_health_routes().merge(build_list_routes(state));
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ConfigError;
    use crate::storage::InMemoryRecordStore;

    #[test]
    fn test_build_requires_store() {
        let err = ServerBuilder::new().build().err().unwrap();
        assert!(err.to_string().contains("RecordStore is required"));
    }

    #[test]
    fn test_register_catalogue_rejects_invalid_definition() {
        let mut catalogue = ListsConfig::default_config();
        catalogue.lists[0].search_fields.push("plate".to_string());

        let err = ServerBuilder::new()
            .with_store(InMemoryRecordStore::new())
            .register_catalogue(&catalogue)
            .err()
            .unwrap();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::DuplicateSearchField { field, .. }) if field == "plate"
        ));
    }

    #[test]
    fn test_registry_splits_scoped_and_unscoped() {
        let mut builder = ServerBuilder::new()
            .with_store(InMemoryRecordStore::new())
            .register_catalogue(&ListsConfig::default_config())
            .unwrap();
        let registry = builder.build_registry().unwrap();

        assert_eq!(
            registry.names(),
            vec!["vehicles", "employees", "services", "accounts", "reports"]
        );
        assert!(!registry.get("vehicles").unwrap().is_scoped());
        assert!(registry.get("reports").unwrap().is_scoped());
    }
}
