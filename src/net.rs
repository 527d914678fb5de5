use std::collections::HashMap;

use anyhow::Context;
use tokio::sync::mpsc::Sender;

use crate::{ArcStr, config::Config, log::Log};

mod core;
pub mod message;
mod mock;

pub use message::{Method, MockRequestKey};

use message::Message;

/// The networking actor that provides a thread-safe interface for HTTP
/// operations.
///
/// This enum represents either a real networking actor or a mock
/// implementation for testing purposes.
///
/// # Examples
/// ```ignore
/// let net = Net::spawn(config, log).await;
/// let response = net.get(url, None).await?;
/// ```
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender or mock reference.
#[derive(Debug, Clone)]
pub enum Net {
    /// A real networking actor that performs HTTP requests
    Actual(Sender<Message>),
    /// A mock implementation for testing
    Mock(mock::Mock),
}

impl Net {
    /// Creates a new networking instance and spawns its actor.
    pub async fn spawn(config: Config, log: Log) -> Self {
        let (net, _) = core::Core::new(config, log).await.spawn();
        net
    }

    /// Creates a new mock networking instance with predefined responses.
    pub fn mock(responses: HashMap<MockRequestKey, ArcStr>) -> Self {
        Self::Mock(mock::Mock::new(responses))
    }

    /// Creates a new empty mock networking instance.
    pub fn mock_empty() -> Self {
        Self::Mock(mock::Mock::empty())
    }

    /// Registers a mock response. No-op for the real actor.
    pub async fn set_mock_response(&self, key: MockRequestKey, response: ArcStr) {
        if let Self::Mock(mock) = self {
            mock.set_response(key, response).await;
        }
    }

    /// Performs an HTTP GET request to the specified URL.
    pub async fn get(
        &self,
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
    ) -> anyhow::Result<ArcStr> {
        match self {
            Net::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Get { url, headers, tx })
                    .await
                    .context("Sending message to Net actor")
                    .expect("Net actor died");
                rx.await
                    .context("Awaiting response from Net actor")
                    .expect("Net actor died")
            }
            Net::Mock(mock) => mock.get(url, headers).await,
        }
    }

    /// Performs an HTTP POST request to the specified URL.
    pub async fn post(
        &self,
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        body: Option<ArcStr>,
    ) -> anyhow::Result<ArcStr> {
        match self {
            Net::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Post {
                        url,
                        headers,
                        body,
                        tx,
                    })
                    .await
                    .context("Sending message to Net actor")
                    .expect("Net actor died");
                rx.await
                    .context("Awaiting response from Net actor")
                    .expect("Net actor died")
            }
            Net::Mock(mock) => mock.post(url, headers, body).await,
        }
    }
}
