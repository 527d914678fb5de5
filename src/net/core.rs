use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tokio::task::JoinHandle;

use super::{Net, message::Message};
use crate::{
    ArcStr,
    config::{Config, USizeOpt},
    log::Log,
};

const SCOPE: &str = "net";

/// The core of the networking system that handles HTTP requests.
///
/// Wraps a [`reqwest::Client`] configured with the request timeout from the
/// configuration actor. Requests are processed sequentially from the
/// mailbox.
#[derive(Debug)]
pub struct Core {
    /// Logging actor for request logging
    log: Log,
    /// HTTP client for making requests
    client: Client,
}

impl Core {
    /// Creates a new networking core instance.
    ///
    /// The request timeout is read from the configuration once, at
    /// construction time.
    pub async fn new(config: Config, log: Log) -> Self {
        let timeout = config.usize(USizeOpt::Timeout).await;
        let client = match Client::builder()
            .timeout(Duration::from_secs(timeout as u64))
            .build()
        {
            Ok(client) => client,
            Err(err) => {
                log.warn(
                    SCOPE,
                    format!("Falling back to default HTTP client: {}", err),
                );
                Client::new()
            }
        };

        Self { log, client }
    }

    /// Transforms the networking core instance into an actor.
    ///
    /// # Returns
    /// A tuple containing:
    /// - The [`Net`] interface
    /// - A join handle for the spawned task
    pub fn spawn(self) -> (Net, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(100);

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Get { url, headers, tx } => {
                        let response = self
                            .handle_get_request(url.clone(), headers)
                            .await
                            .with_context(|| format!("GET request failed for URL: {}", url));
                        let _ = tx.send(response);
                    }
                    Message::Post {
                        url,
                        headers,
                        body,
                        tx,
                    } => {
                        let response = self
                            .handle_post_request(url.clone(), headers, body)
                            .await
                            .with_context(|| format!("POST request failed for URL: {}", url));
                        let _ = tx.send(response);
                    }
                }
            }
        });

        (Net::Actual(tx), handle)
    }

    async fn handle_get_request(
        &self,
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
    ) -> anyhow::Result<ArcStr> {
        self.log.info(SCOPE, format!("GET {}", url));

        let mut request = self.client.get(&*url);
        request = Self::apply_headers(request, headers);

        let response = request.send().await.context("Sending GET request")?;
        let response = response
            .error_for_status()
            .context("Server reported failure")?;
        let body = response.text().await.context("Reading response body")?;
        Ok(Arc::from(body))
    }

    async fn handle_post_request(
        &self,
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        body: Option<ArcStr>,
    ) -> anyhow::Result<ArcStr> {
        self.log.info(SCOPE, format!("POST {}", url));

        let mut request = self.client.post(&*url);
        request = Self::apply_headers(request, headers);
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = request.send().await.context("Sending POST request")?;
        let response = response
            .error_for_status()
            .context("Server reported failure")?;
        let body = response.text().await.context("Reading response body")?;
        Ok(Arc::from(body))
    }

    fn apply_headers(
        mut request: reqwest::RequestBuilder,
        headers: Option<HashMap<ArcStr, ArcStr>>,
    ) -> reqwest::RequestBuilder {
        if let Some(headers) = headers {
            for (name, value) in headers {
                request = request.header(&*name, &*value);
            }
        }
        request
    }
}
