use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::message::MockRequestKey;
use crate::ArcStr;

/// Mock implementation of the Net actor for testing purposes.
///
/// Returns predefined responses keyed by HTTP method and URL; requests with
/// no matching entry fail.
#[derive(Debug, Clone)]
pub struct Mock {
    responses: Arc<Mutex<HashMap<MockRequestKey, ArcStr>>>,
}

impl Mock {
    /// Creates a new mock instance with the provided response map.
    pub fn new(responses: HashMap<MockRequestKey, ArcStr>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
        }
    }

    /// Creates a new mock instance with an empty response map.
    pub fn empty() -> Self {
        Self::new(HashMap::new())
    }

    /// Registers a response for a request key.
    pub async fn set_response(&self, key: MockRequestKey, response: ArcStr) {
        self.responses.lock().await.insert(key, response);
    }

    pub async fn get(
        &self,
        url: ArcStr,
        _headers: Option<HashMap<ArcStr, ArcStr>>,
    ) -> anyhow::Result<ArcStr> {
        let responses = self.responses.lock().await;
        responses
            .get(&MockRequestKey::get(url.clone()))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No mock response for GET {}", url))
    }

    pub async fn post(
        &self,
        url: ArcStr,
        _headers: Option<HashMap<ArcStr, ArcStr>>,
        _body: Option<ArcStr>,
    ) -> anyhow::Result<ArcStr> {
        let responses = self.responses.lock().await;
        responses
            .get(&MockRequestKey::post(url.clone()))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No mock response for POST {}", url))
    }
}
