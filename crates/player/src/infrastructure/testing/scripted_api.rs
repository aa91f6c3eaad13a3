//! Scripted lobby API.
//!
//! Responses are queued per path. A gated response holds the request open
//! until the test releases it, which is how tests observe a lifecycle call
//! that is still pending.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::ports::outbound::{ApiError, RawApiPort};

/// One request the fake received.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

enum Scripted {
    Ready(Result<Value, ApiError>),
    Gated(oneshot::Receiver<Result<Value, ApiError>>),
}

#[derive(Default)]
struct State {
    responses: HashMap<String, VecDeque<Scripted>>,
    calls: Vec<ApiCall>,
}

/// `RawApiPort` that replays queued responses.
///
/// A request to a path with nothing queued fails with `RequestFailed`.
#[derive(Clone, Default)]
pub struct ScriptedApi {
    state: Arc<Mutex<State>>,
}

/// Releases one gated response.
pub struct ApiGate {
    tx: oneshot::Sender<Result<Value, ApiError>>,
}

impl ApiGate {
    pub fn release(self, response: Result<Value, ApiError>) {
        // The request may have been dropped already; nothing to deliver then.
        let _ = self.tx.send(response);
    }
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an immediate response for the next request to `path`.
    pub fn respond(&self, path: &str, response: Result<Value, ApiError>) {
        self.push(path, Scripted::Ready(response));
    }

    /// Queue a response for `path` that is held until the gate is released.
    pub fn respond_gated(&self, path: &str) -> ApiGate {
        let (tx, rx) = oneshot::channel();
        self.push(path, Scripted::Gated(rx));
        ApiGate { tx }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn push(&self, path: &str, scripted: Scripted) {
        self.lock()
            .responses
            .entry(path.to_string())
            .or_default()
            .push_back(scripted);
    }

    async fn answer(
        &self,
        method: &'static str,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let next = {
            let mut s = self.lock();
            s.calls.push(ApiCall {
                method,
                path: path.to_string(),
                body,
            });
            s.responses.get_mut(path).and_then(|queue| queue.pop_front())
        };

        match next {
            Some(Scripted::Ready(response)) => response,
            Some(Scripted::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::RequestFailed("gate dropped".to_string()))),
            None => Err(ApiError::RequestFailed(format!(
                "no scripted response for {method} {path}"
            ))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RawApiPort for ScriptedApi {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        self.answer("GET", path, None).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.answer("POST", path, Some(body.clone())).await
    }
}
