use std::sync::Arc;

use serde::Serialize;
use shared::models::SongRequest;
use shared::order::TabEvent;
use tokio::sync::broadcast;

use crate::core::Config;
use crate::orders::{OrdersManager, TabStorage};
use crate::services::{CatalogService, SongService};
use crate::sessions::{SessionConfig, SessionService};

/// Change feed broadcast capacity
const CHANGE_FEED_CAPACITY: usize = 4096;

/// One entry on the server-push change feed (SSE)
///
/// Clients that miss entries (lagged receiver) fall back to re-reading the
/// query endpoints; the feed is a notification layer, not a source of truth.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeFeedEvent {
    Order { event: TabEvent },
    Song { song: SongRequest },
}

/// Server state - shared handles to every service
///
/// Cheap to clone (Arc inside); one instance is created at boot and handed
/// to the axum router as application state.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Read-only catalog: tables and menu
    pub catalog: Arc<CatalogService>,
    /// Tab command pipeline
    pub orders: Arc<OrdersManager>,
    /// QR / guest session issuer
    pub sessions: SessionService,
    /// Song requests with spend gate
    pub songs: SongService,
    /// Server-push change feed
    change_tx: broadcast::Sender<ChangeFeedEvent>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("environment", &self.config.environment)
            .field("catalog", &self.catalog)
            .finish()
    }
}

impl ServerState {
    /// Initialize all services
    ///
    /// Order matters: storage first (everything persists there), catalog
    /// next (actions price items from it), then the services that combine
    /// the two.
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        config.ensure_work_dir_structure()?;

        let storage = TabStorage::open(config.database_path())?;

        let catalog = Arc::new(CatalogService::new());
        let catalog_file = config.catalog_file();
        match catalog.load_from_file(&catalog_file) {
            Ok((tables, items)) => {
                tracing::info!(tables, items, path = %catalog_file.display(), "Catalog loaded");
            }
            Err(e) => {
                tracing::warn!(path = %catalog_file.display(), error = %e, "Catalog not loaded, starting empty");
            }
        }

        let (change_tx, _) = broadcast::channel(CHANGE_FEED_CAPACITY);

        let orders = Arc::new(OrdersManager::new(storage.clone(), catalog.clone()));

        let sessions = SessionService::new(
            storage.clone(),
            catalog.clone(),
            SessionConfig {
                qr_expiry_secs: config.qr_expiry_secs,
                session_expiry_secs: config.session_expiry_secs,
                public_url: config.public_url.clone(),
            },
        );

        let songs = SongService::new(
            storage,
            config.min_song_spend,
            change_tx.clone(),
        );

        Ok(Self {
            config: config.clone(),
            catalog,
            orders,
            sessions,
            songs,
            change_tx,
        })
    }

    /// Subscribe to the change feed
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ChangeFeedEvent> {
        self.change_tx.subscribe()
    }

    /// Start background tasks
    ///
    /// Must be called before `Server::run()` accepts traffic. Forwards
    /// committed tab events onto the change feed.
    pub fn start_background_tasks(&self) {
        let mut events = self.orders.subscribe();
        let change_tx = self.change_tx.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let _ = change_tx.send(ChangeFeedEvent::Order { event });
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Change feed forwarder lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}
