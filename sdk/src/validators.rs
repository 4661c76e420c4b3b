use std::{str::FromStr, time::Duration};

use alloy::primitives::Address;
use blockchain::SigningIdentity;
use url::Url;

pub fn validate_url(url: &str) -> anyhow::Result<Url> {
    Url::parse(url).map_err(|e| anyhow::anyhow!("invalid URL: {}", e))
}

pub fn validate_address(address: &str) -> anyhow::Result<Address> {
    Address::from_str(address.trim()).map_err(|e| anyhow::anyhow!("invalid address: {}", e))
}

pub fn validate_wallet_private_key(key: &str) -> anyhow::Result<SigningIdentity> {
    SigningIdentity::from_str(key).map_err(|e| anyhow::anyhow!("invalid private key: {}", e))
}

pub fn validate_u64(value: &str, field: &str) -> anyhow::Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid {}: {}", field, e))
}

pub fn validate_u128(value: &str, field: &str) -> anyhow::Result<u128> {
    value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid {}: {}", field, e))
}

pub fn validate_secs(value: &str, field: &str) -> anyhow::Result<Duration> {
    let secs = validate_u64(value, field)?;
    if secs == 0 {
        anyhow::bail!("invalid {}: must be positive", field);
    }
    Ok(Duration::from_secs(secs))
}
