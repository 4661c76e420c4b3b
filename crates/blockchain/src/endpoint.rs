use std::fmt;
use std::str::FromStr;

use url::Url;

/// The chain the pipeline talks to. Created once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEndpoint {
    chain_id: u64,
    rpc_url: Url,
}

impl ChainEndpoint {
    pub fn new(chain_id: u64, rpc_url: Url) -> Self {
        Self { chain_id, rpc_url }
    }

    pub fn parse(chain_id: u64, rpc_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(chain_id, Url::from_str(rpc_url)?))
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }
}

impl fmt::Display for ChainEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain {} via {}", self.chain_id, self.rpc_url)
    }
}
