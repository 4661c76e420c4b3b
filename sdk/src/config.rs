use std::time::Duration;

use alloy::primitives::Address;
use blockchain::{GasPolicy, NonceStrategy, SigningIdentity, pipeline::DEFAULT_RPC_TIMEOUT};
use url::Url;

use crate::{
    delegation::{
        DEFAULT_DELEGATION_DEADLINE, DEFAULT_POLL_INTERVAL, DEFAULT_RESPONSE_TIMEOUT,
        DelegationMode,
    },
    error::ConfigError,
    validators::{
        validate_address, validate_secs, validate_u64, validate_u128, validate_url,
        validate_wallet_private_key,
    },
};

pub const DEFAULT_RPC_URL: &str = "https://westend-asset-hub-eth-rpc.polkadot.io";
pub const DEFAULT_CHAIN_ID: u64 = 420420421;
pub const DEFAULT_MECH_TOOL: &str = "openai-gpt-3.5-turbo";
pub const DEFAULT_MECH_CHAIN_CONFIG: &str = "gnosis";

#[derive(Debug, Clone)]
pub struct MechConfig {
    pub rpc_url: Option<Url>,
    pub marketplace_address: Option<Address>,
    pub priority_mech: Option<Address>,
    pub tool: String,
    pub chain_config: String,
    pub mode: DelegationMode,
    pub poll_interval: Duration,
    pub deadline: Duration,
    pub response_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: Url,
    pub chain_id: u64,
    pub wallet_private_key: SigningIdentity,
    pub contract_address: Option<Address>,
    pub staking_address: Option<Address>,
    pub gas: GasPolicy,
    pub rpc_timeout: Duration,
    pub nonce_strategy: NonceStrategy,
    pub mech: MechConfig,
}

#[derive(Default)]
pub struct ConfigBuilder {
    rpc_url: Option<String>,
    chain_id: Option<String>,
    wallet_private_key: Option<String>,
    contract_address: Option<String>,
    staking_address: Option<String>,
    gas_limit: Option<String>,
    gas_price: Option<String>,
    rpc_timeout: Option<String>,
    nonce_strategy: Option<String>,
    mech_rpc_url: Option<String>,
    marketplace_address: Option<String>,
    priority_mech: Option<String>,
    mech_tool: Option<String>,
    mech_chain_config: Option<String>,
    delegation_mode: Option<String>,
    poll_interval: Option<String>,
    delegation_deadline: Option<String>,
    response_timeout: Option<String>,
}

impl ConfigBuilder {
    pub fn rpc_url(mut self, rpc_url: String) -> Self {
        self.rpc_url = Some(rpc_url);
        self
    }

    pub fn chain_id(mut self, chain_id: String) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn wallet_private_key(mut self, wallet_private_key: String) -> Self {
        self.wallet_private_key = Some(wallet_private_key);
        self
    }

    /// Address of the SleepFine contract.
    pub fn contract_address(mut self, contract_address: String) -> Self {
        self.contract_address = Some(contract_address);
        self
    }

    /// Address of the validator staking contract that receives nominations.
    pub fn staking_address(mut self, staking_address: String) -> Self {
        self.staking_address = Some(staking_address);
        self
    }

    pub fn gas_limit(mut self, gas_limit: String) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Gas price in wei.
    pub fn gas_price(mut self, gas_price: String) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    /// Per-step network timeout, in seconds.
    pub fn rpc_timeout(mut self, rpc_timeout: String) -> Self {
        self.rpc_timeout = Some(rpc_timeout);
        self
    }

    /// `remote` or `tracked`.
    pub fn nonce_strategy(mut self, nonce_strategy: String) -> Self {
        self.nonce_strategy = Some(nonce_strategy);
        self
    }

    pub fn mech_rpc_url(mut self, mech_rpc_url: String) -> Self {
        self.mech_rpc_url = Some(mech_rpc_url);
        self
    }

    pub fn marketplace_address(mut self, marketplace_address: String) -> Self {
        self.marketplace_address = Some(marketplace_address);
        self
    }

    /// Route every decision to this mech. Leave unset to let the marketplace pick.
    pub fn priority_mech(mut self, priority_mech: String) -> Self {
        self.priority_mech = Some(priority_mech);
        self
    }

    pub fn mech_tool(mut self, mech_tool: String) -> Self {
        self.mech_tool = Some(mech_tool);
        self
    }

    pub fn mech_chain_config(mut self, mech_chain_config: String) -> Self {
        self.mech_chain_config = Some(mech_chain_config);
        self
    }

    /// `on_chain` or `off_chain`.
    pub fn delegation_mode(mut self, delegation_mode: String) -> Self {
        self.delegation_mode = Some(delegation_mode);
        self
    }

    pub fn poll_interval(mut self, poll_interval: String) -> Self {
        self.poll_interval = Some(poll_interval);
        self
    }

    pub fn delegation_deadline(mut self, delegation_deadline: String) -> Self {
        self.delegation_deadline = Some(delegation_deadline);
        self
    }

    pub fn response_timeout(mut self, response_timeout: String) -> Self {
        self.response_timeout = Some(response_timeout);
        self
    }

    pub fn from_env(mut self) -> Self {
        let vars: [(&str, fn(Self, String) -> Self); 18] = [
            ("OPERATOR_RPC_URL", Self::rpc_url),
            ("OPERATOR_CHAIN_ID", Self::chain_id),
            ("OPERATOR_WALLET_PRIVATE_KEY", Self::wallet_private_key),
            ("OPERATOR_CONTRACT_ADDRESS", Self::contract_address),
            ("OPERATOR_STAKING_ADDRESS", Self::staking_address),
            ("OPERATOR_GAS_LIMIT", Self::gas_limit),
            ("OPERATOR_GAS_PRICE", Self::gas_price),
            ("OPERATOR_RPC_TIMEOUT", Self::rpc_timeout),
            ("OPERATOR_NONCE_STRATEGY", Self::nonce_strategy),
            ("OPERATOR_MECH_RPC_URL", Self::mech_rpc_url),
            ("OPERATOR_MARKETPLACE_ADDRESS", Self::marketplace_address),
            ("OPERATOR_PRIORITY_MECH", Self::priority_mech),
            ("OPERATOR_MECH_TOOL", Self::mech_tool),
            ("OPERATOR_MECH_CHAIN_CONFIG", Self::mech_chain_config),
            ("OPERATOR_DELEGATION_MODE", Self::delegation_mode),
            ("OPERATOR_POLL_INTERVAL", Self::poll_interval),
            ("OPERATOR_DELEGATION_DEADLINE", Self::delegation_deadline),
            ("OPERATOR_RESPONSE_TIMEOUT", Self::response_timeout),
        ];
        for (name, setter) in vars {
            if let Ok(v) = std::env::var(name) {
                self = setter(self, v);
            }
        }
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let wallet_private_key = Self::required(self.wallet_private_key, "wallet_private_key")?;
        let wallet_private_key = validate_wallet_private_key(&wallet_private_key)
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let rpc_url = validate_url(self.rpc_url.as_deref().unwrap_or(DEFAULT_RPC_URL))
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        let chain_id = Self::optional(self.chain_id, |v| validate_u64(v, "chain_id"))?
            .unwrap_or(DEFAULT_CHAIN_ID);

        let contract_address = Self::optional(self.contract_address, validate_address)?;
        let staking_address = Self::optional(self.staking_address, validate_address)?;

        let defaults = GasPolicy::default();
        let gas = GasPolicy {
            gas_limit: Self::optional(self.gas_limit, |v| validate_u64(v, "gas_limit"))?
                .unwrap_or(defaults.gas_limit),
            gas_price: Self::optional(self.gas_price, |v| validate_u128(v, "gas_price"))?
                .unwrap_or(defaults.gas_price),
        };
        let rpc_timeout = Self::optional(self.rpc_timeout, |v| validate_secs(v, "rpc_timeout"))?
            .unwrap_or(DEFAULT_RPC_TIMEOUT);
        let nonce_strategy = Self::optional(self.nonce_strategy, |v| {
            v.parse::<NonceStrategy>().map_err(anyhow::Error::msg)
        })?
        .unwrap_or_default();

        let mech = MechConfig {
            rpc_url: Self::optional(self.mech_rpc_url, validate_url)?,
            marketplace_address: Self::optional(self.marketplace_address, validate_address)?,
            priority_mech: Self::optional(
                self.priority_mech.filter(|v| !v.trim().is_empty()),
                validate_address,
            )?,
            tool: self
                .mech_tool
                .unwrap_or_else(|| DEFAULT_MECH_TOOL.to_string()),
            chain_config: self
                .mech_chain_config
                .unwrap_or_else(|| DEFAULT_MECH_CHAIN_CONFIG.to_string()),
            mode: Self::optional(self.delegation_mode, |v| {
                v.parse::<DelegationMode>().map_err(anyhow::Error::msg)
            })?
            .unwrap_or_default(),
            poll_interval: Self::optional(self.poll_interval, |v| {
                validate_secs(v, "poll_interval")
            })?
            .unwrap_or(DEFAULT_POLL_INTERVAL),
            deadline: Self::optional(self.delegation_deadline, |v| {
                validate_secs(v, "delegation_deadline")
            })?
            .unwrap_or(DEFAULT_DELEGATION_DEADLINE),
            response_timeout: Self::optional(self.response_timeout, |v| {
                validate_secs(v, "response_timeout")
            })?
            .unwrap_or(DEFAULT_RESPONSE_TIMEOUT),
        };

        Ok(Config {
            rpc_url,
            chain_id,
            wallet_private_key,
            contract_address,
            staking_address,
            gas,
            rpc_timeout,
            nonce_strategy,
            mech,
        })
    }

    fn required(value: Option<String>, field: &str) -> Result<String, ConfigError> {
        value.ok_or_else(|| ConfigError::Missing(field.to_string()))
    }

    fn optional<T>(
        value: Option<String>,
        parser: impl FnOnce(&str) -> anyhow::Result<T>,
    ) -> Result<Option<T>, ConfigError> {
        match value {
            Some(raw) => parser(&raw)
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue(e.to_string())),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VALID_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const VALID_ADDRESS: &str = "0x0308D149EA4cBa0Bede727e01411879a88267432";
    const VALID_RPC_URL: &str = "http://localhost:8545/";
    const VALID_MECH_URL: &str = "http://localhost:9000/";

    #[test]
    fn test_default_builder() {
        let builder = ConfigBuilder::default();
        assert!(builder.rpc_url.is_none());
        assert!(builder.wallet_private_key.is_none());
        assert!(builder.contract_address.is_none());
        assert!(builder.priority_mech.is_none());
    }

    #[test]
    fn test_build_with_required_fields_only() {
        let config = ConfigBuilder::default()
            .wallet_private_key(VALID_PRIVATE_KEY.to_string())
            .build()
            .unwrap();

        assert_eq!(config.rpc_url.as_str(), "https://westend-asset-hub-eth-rpc.polkadot.io/");
        assert_eq!(config.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(
            config.wallet_private_key.address(),
            validate_wallet_private_key(VALID_PRIVATE_KEY).unwrap().address()
        );
        assert_eq!(config.gas.gas_limit, 300_000);
        assert_eq!(config.gas.gas_price, 1_000_000_000);
        assert_eq!(config.rpc_timeout, Duration::from_secs(10));
        assert_eq!(config.nonce_strategy, NonceStrategy::Remote);
        assert!(config.contract_address.is_none());

        assert_eq!(config.mech.mode, DelegationMode::OnChain);
        assert_eq!(config.mech.tool, DEFAULT_MECH_TOOL);
        assert_eq!(config.mech.chain_config, DEFAULT_MECH_CHAIN_CONFIG);
        assert_eq!(config.mech.poll_interval, Duration::from_secs(10));
        assert_eq!(config.mech.deadline, Duration::from_secs(300));
        assert_eq!(config.mech.response_timeout, Duration::from_secs(300));
        assert!(config.mech.priority_mech.is_none());
    }

    #[test]
    fn test_build_with_all_fields() {
        let config = ConfigBuilder::default()
            .rpc_url(VALID_RPC_URL.to_string())
            .chain_id("31337".to_string())
            .wallet_private_key(VALID_PRIVATE_KEY.to_string())
            .contract_address(VALID_ADDRESS.to_string())
            .staking_address(VALID_ADDRESS.to_string())
            .gas_limit("500000".to_string())
            .gas_price("2000000000".to_string())
            .rpc_timeout("3".to_string())
            .nonce_strategy("tracked".to_string())
            .mech_rpc_url(VALID_MECH_URL.to_string())
            .marketplace_address(VALID_ADDRESS.to_string())
            .priority_mech(VALID_ADDRESS.to_string())
            .mech_tool("prediction-online".to_string())
            .mech_chain_config("base".to_string())
            .delegation_mode("off_chain".to_string())
            .poll_interval("1".to_string())
            .delegation_deadline("30".to_string())
            .response_timeout("60".to_string())
            .build()
            .unwrap();

        assert_eq!(config.rpc_url.as_str(), VALID_RPC_URL);
        assert_eq!(config.chain_id, 31337);
        assert_eq!(config.contract_address.unwrap().to_string(), VALID_ADDRESS);
        assert_eq!(config.staking_address.unwrap().to_string(), VALID_ADDRESS);
        assert_eq!(config.gas.gas_limit, 500_000);
        assert_eq!(config.gas.gas_price, 2_000_000_000);
        assert_eq!(config.rpc_timeout, Duration::from_secs(3));
        assert_eq!(config.nonce_strategy, NonceStrategy::Tracked);
        assert_eq!(config.mech.rpc_url.unwrap().as_str(), VALID_MECH_URL);
        assert_eq!(config.mech.priority_mech.unwrap().to_string(), VALID_ADDRESS);
        assert_eq!(config.mech.tool, "prediction-online");
        assert_eq!(config.mech.chain_config, "base");
        assert_eq!(config.mech.mode, DelegationMode::OffChain);
        assert_eq!(config.mech.poll_interval, Duration::from_secs(1));
        assert_eq!(config.mech.deadline, Duration::from_secs(30));
        assert_eq!(config.mech.response_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_build_missing_wallet_private_key() {
        match ConfigBuilder::default().build().unwrap_err() {
            ConfigError::Missing(field) => assert_eq!(field, "wallet_private_key"),
            _ => panic!("Expected Missing error"),
        }
    }

    #[test]
    fn test_build_invalid_rpc_url() {
        let config = ConfigBuilder::default()
            .rpc_url("not-a-valid-url".to_string())
            .wallet_private_key(VALID_PRIVATE_KEY.to_string())
            .build();

        match config.unwrap_err() {
            ConfigError::InvalidValue(msg) => assert!(msg.contains("invalid URL")),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_build_invalid_wallet_private_key() {
        let config = ConfigBuilder::default()
            .wallet_private_key("not-a-valid-key".to_string())
            .build();

        match config.unwrap_err() {
            ConfigError::InvalidValue(msg) => {
                assert!(msg.contains("invalid private key"));
                assert!(!msg.contains("not-a-valid-key"));
            }
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_build_invalid_contract_address() {
        let config = ConfigBuilder::default()
            .wallet_private_key(VALID_PRIVATE_KEY.to_string())
            .contract_address("not-a-valid-address".to_string())
            .build();

        match config.unwrap_err() {
            ConfigError::InvalidValue(msg) => assert!(msg.contains("invalid address")),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_build_rejects_zero_poll_interval() {
        let config = ConfigBuilder::default()
            .wallet_private_key(VALID_PRIVATE_KEY.to_string())
            .poll_interval("0".to_string())
            .build();

        match config.unwrap_err() {
            ConfigError::InvalidValue(msg) => assert!(msg.contains("poll_interval")),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_build_rejects_unknown_mode() {
        let config = ConfigBuilder::default()
            .wallet_private_key(VALID_PRIVATE_KEY.to_string())
            .delegation_mode("carrier-pigeon".to_string())
            .build();
        assert!(matches!(config, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_blank_priority_mech_means_marketplace_choice() {
        let config = ConfigBuilder::default()
            .wallet_private_key(VALID_PRIVATE_KEY.to_string())
            .priority_mech("  ".to_string())
            .build()
            .unwrap();
        assert!(config.mech.priority_mech.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_with_all_vars() {
        unsafe {
            std::env::set_var("OPERATOR_RPC_URL", VALID_RPC_URL);
            std::env::set_var("OPERATOR_WALLET_PRIVATE_KEY", VALID_PRIVATE_KEY);
            std::env::set_var("OPERATOR_CONTRACT_ADDRESS", VALID_ADDRESS);
            std::env::set_var("OPERATOR_MECH_RPC_URL", VALID_MECH_URL);
            std::env::set_var("OPERATOR_DELEGATION_MODE", "off_chain");
        }

        let config = ConfigBuilder::default().from_env().build();

        unsafe {
            std::env::remove_var("OPERATOR_RPC_URL");
            std::env::remove_var("OPERATOR_WALLET_PRIVATE_KEY");
            std::env::remove_var("OPERATOR_CONTRACT_ADDRESS");
            std::env::remove_var("OPERATOR_MECH_RPC_URL");
            std::env::remove_var("OPERATOR_DELEGATION_MODE");
        }

        let config = config.unwrap();
        assert_eq!(config.rpc_url.as_str(), VALID_RPC_URL);
        assert_eq!(config.contract_address.unwrap().to_string(), VALID_ADDRESS);
        assert_eq!(config.mech.rpc_url.unwrap().as_str(), VALID_MECH_URL);
        assert_eq!(config.mech.mode, DelegationMode::OffChain);
    }

    #[test]
    #[serial]
    fn test_from_env_override() {
        unsafe {
            std::env::set_var("OPERATOR_RPC_URL", "http://env-url:3000/");
        }

        let config = ConfigBuilder::default()
            .rpc_url(VALID_RPC_URL.to_string())
            .from_env()
            .wallet_private_key(VALID_PRIVATE_KEY.to_string())
            .build();

        unsafe {
            std::env::remove_var("OPERATOR_RPC_URL");
        }

        // from_env should override the earlier value
        assert_eq!(config.unwrap().rpc_url.as_str(), "http://env-url:3000/");
    }
}
