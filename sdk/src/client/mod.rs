use std::sync::Arc;

use blockchain::{ChainEndpoint, SigningIdentity, TxPipeline, TxPolicy};
use rpc::proxy::RpcProxy;

use crate::{config::Config, delegation::MechChannel, error::ClientError};

use self::{delegator::DelegatorClient, operator::OperatorClient};

pub mod delegator;
pub mod operator;

struct Inner {
    cfg: Config,
    pipeline: TxPipeline,
    mech: Option<Arc<dyn MechChannel>>,
}

#[derive(Clone)]
struct ClientCtx(Arc<Inner>);

impl ClientCtx {
    async fn new(cfg: Config) -> Result<Self, ClientError> {
        let endpoint = ChainEndpoint::new(cfg.chain_id, cfg.rpc_url.clone());
        let pipeline = TxPipeline::connect(endpoint, tx_policy(&cfg))
            .await
            .map_err(|e| ClientError::Provider(e.to_string()))?;

        let mech = match &cfg.mech.rpc_url {
            Some(url) => {
                let proxy = RpcProxy::with_timeout(url.as_str(), cfg.mech.response_timeout)
                    .map_err(|e| ClientError::Rpc(e.to_string()))?;
                Some(Arc::new(proxy) as Arc<dyn MechChannel>)
            }
            None => None,
        };

        Ok(Self::from_parts(cfg, pipeline, mech))
    }

    fn from_parts(cfg: Config, pipeline: TxPipeline, mech: Option<Arc<dyn MechChannel>>) -> Self {
        Self(Arc::new(Inner {
            cfg,
            pipeline,
            mech,
        }))
    }

    fn cfg(&self) -> &Config {
        &self.0.cfg
    }

    fn pipeline(&self) -> &TxPipeline {
        &self.0.pipeline
    }

    fn mech(&self) -> Option<Arc<dyn MechChannel>> {
        self.0.mech.clone()
    }

    fn signer(&self) -> &SigningIdentity {
        &self.0.cfg.wallet_private_key
    }
}

/// Pipeline settings carried by `cfg`.
pub fn tx_policy(cfg: &Config) -> TxPolicy {
    TxPolicy {
        gas: cfg.gas,
        rpc_timeout: cfg.rpc_timeout,
        nonce_strategy: cfg.nonce_strategy,
    }
}

#[derive(Clone)]
pub struct Client {
    pub operator: OperatorClient,
    pub delegator: DelegatorClient,
}

impl Client {
    pub async fn new(cfg: Config) -> Result<Self, ClientError> {
        Ok(Self::from_ctx(ClientCtx::new(cfg).await?))
    }

    /// Builds a client over an existing pipeline and mech channel instead of
    /// the transports named in `cfg`.
    pub fn with_parts(
        cfg: Config,
        pipeline: TxPipeline,
        mech: Option<Arc<dyn MechChannel>>,
    ) -> Self {
        Self::from_ctx(ClientCtx::from_parts(cfg, pipeline, mech))
    }

    fn from_ctx(ctx: ClientCtx) -> Self {
        Self {
            operator: OperatorClient::new(ctx.clone()),
            delegator: DelegatorClient::new(ctx),
        }
    }
}
