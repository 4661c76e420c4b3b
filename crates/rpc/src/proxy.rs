use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct RpcProxy {
    client: Arc<HttpClient>,
}

impl RpcProxy {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Self::with_timeout(url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = HttpClientBuilder::default()
            .request_timeout(timeout)
            .build(url)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }
}

impl Deref for RpcProxy {
    type Target = HttpClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}
