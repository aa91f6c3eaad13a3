//! Composition root: wires the concrete adapters into a `GameSessionStore`.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::application::GameSessionStore;
use crate::config::ClientConfig;
use crate::ports::outbound::{ClockPort, RawApiPort, SocketConnector};

/// Everything the store talks to.
pub struct ClientDeps {
    pub raw_api: Arc<dyn RawApiPort>,
    pub connector: Arc<dyn SocketConnector>,
    pub clock: Arc<dyn ClockPort>,
}

impl ClientDeps {
    /// reqwest for the lobby, tokio-tungstenite for the game socket.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn desktop(config: &ClientConfig) -> anyhow::Result<Self> {
        use crate::infrastructure::{HttpApiAdapter, SystemClock, WsConnector};

        Ok(Self {
            raw_api: Arc::new(HttpApiAdapter::new(config)?),
            connector: Arc::new(WsConnector::new()),
            clock: Arc::new(SystemClock::new()),
        })
    }
}

pub fn build_store(deps: ClientDeps, config: &ClientConfig) -> Arc<GameSessionStore> {
    tracing::info!(
        api_url = %config.api_url,
        ws_url = %config.ws_url,
        "Building game session store"
    );
    Arc::new(GameSessionStore::new(
        deps.raw_api,
        deps.connector,
        deps.clock,
        config,
    ))
}

/// Build a desktop client from the environment and start applying server
/// events in the background. Must be called inside a tokio runtime.
///
/// The returned task finishes once every handle to the store is dropped.
#[cfg(not(target_arch = "wasm32"))]
pub fn desktop_store_from_env() -> anyhow::Result<(Arc<GameSessionStore>, JoinHandle<()>)> {
    let config = ClientConfig::from_env()?;
    let store = build_store(ClientDeps::desktop(&config)?, &config);
    let updates = store.spawn_update_loop();
    Ok((store, updates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::testing::{FixedClock, InMemoryConnector, ScriptedApi};
    use crate::state::GameStatus;

    #[test]
    fn built_store_starts_idle_and_disconnected() {
        let deps = ClientDeps {
            raw_api: Arc::new(ScriptedApi::new()),
            connector: Arc::new(InMemoryConnector::new()),
            clock: Arc::new(FixedClock::at_epoch()),
        };

        let store = build_store(deps, &ClientConfig::default());

        assert_eq!(store.snapshot().status, GameStatus::Idle);
        assert_eq!(
            store.connection_state(),
            crate::ports::outbound::ConnectionState::Disconnected
        );
    }

    #[tokio::test]
    async fn desktop_deps_open_nothing_until_asked() {
        let config = ClientConfig::default();
        let deps = ClientDeps::desktop(&config).expect("default config builds");
        let store = build_store(deps, &config);

        assert!(store.snapshot().is_idle());
        assert_eq!(store.pending_request(), None);
    }

    #[tokio::test]
    async fn update_task_ends_with_the_store() {
        let deps = ClientDeps {
            raw_api: Arc::new(ScriptedApi::new()),
            connector: Arc::new(InMemoryConnector::new()),
            clock: Arc::new(FixedClock::at_epoch()),
        };
        let store = build_store(deps, &ClientConfig::default());
        let updates = store.spawn_update_loop();

        drop(store);

        tokio::time::timeout(std::time::Duration::from_millis(500), updates)
            .await
            .expect("update task finished")
            .expect("update task did not panic");
    }
}
