use std::collections::HashMap;

use crate::ArcStr;

/// HTTP method of a request, used to key mock responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

/// Key identifying a mocked request: its method and URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockRequestKey {
    pub method: Method,
    pub url: ArcStr,
}

impl MockRequestKey {
    pub fn get(url: impl Into<ArcStr>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
        }
    }

    pub fn post(url: impl Into<ArcStr>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
        }
    }
}

/// Messages that can be sent to the Net actor.
#[derive(Debug)]
pub enum Message {
    /// Performs an HTTP GET request
    Get {
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<ArcStr>>,
    },
    /// Performs an HTTP POST request
    Post {
        url: ArcStr,
        headers: Option<HashMap<ArcStr, ArcStr>>,
        body: Option<ArcStr>,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<ArcStr>>,
    },
}
