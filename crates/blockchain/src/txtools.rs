use alloy::{
    consensus::{SignableTransaction, Signed, TxEnvelope, TxLegacy},
    eips::eip2718::{Decodable2718, Encodable2718},
    primitives::{Address, B256, Bytes, Signature, TxKind, U256, keccak256},
};

use crate::error::{Result, SubmitError};

/// Fixed gas policy. No fee estimation is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPolicy {
    pub gas_limit: u64,
    /// Price per gas unit in wei.
    pub gas_price: u128,
}

pub const DEFAULT_GAS_LIMIT: u64 = 300_000;
pub const ONE_GWEI: u128 = 1_000_000_000;

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_price: ONE_GWEI,
        }
    }
}

/// A fully specified contract call that has not been signed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedCall {
    pub to: Address,
    pub input: Bytes,
    pub chain_id: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub nonce: u64,
}

impl UnsignedCall {
    pub fn new(to: Address, input: Bytes, chain_id: u64, gas: GasPolicy, nonce: u64) -> Self {
        Self {
            to,
            input,
            chain_id,
            gas_limit: gas.gas_limit,
            gas_price: gas.gas_price,
            nonce,
        }
    }

    /// EIP-155 legacy representation.
    pub fn to_legacy(&self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: U256::ZERO,
            input: self.input.clone(),
        }
    }

    /// The digest the signer commits to.
    pub fn signing_hash(&self) -> B256 {
        self.to_legacy().signature_hash()
    }

    fn from_legacy(tx: &TxLegacy) -> Result<Self> {
        let chain_id = tx
            .chain_id
            .ok_or_else(|| SubmitError::Malformed("transaction is not replay protected".into()))?;
        let to = match tx.to {
            TxKind::Call(to) => to,
            TxKind::Create => {
                return Err(SubmitError::Malformed("contract creation is not a call".into()));
            }
        };
        Ok(Self {
            to,
            input: tx.input.clone(),
            chain_id,
            gas_limit: tx.gas_limit,
            gas_price: tx.gas_price,
            nonce: tx.nonce,
        })
    }
}

/// An [`UnsignedCall`] plus its signature, in canonical wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    call: UnsignedCall,
    signature: Signature,
    raw: Bytes,
    hash: B256,
}

impl SignedTransaction {
    pub fn new(call: UnsignedCall, signature: Signature) -> Self {
        let signed: Signed<TxLegacy> = call.to_legacy().into_signed(signature);
        let raw: Bytes = TxEnvelope::from(signed).encoded_2718().into();
        let hash = keccak256(&raw);
        Self {
            call,
            signature,
            raw,
            hash,
        }
    }

    /// Parses a raw signed payload as produced by [`Self::raw`].
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let mut buf = raw;
        let envelope = TxEnvelope::decode_2718(&mut buf)
            .map_err(|e| SubmitError::Malformed(e.to_string()))?;
        let signed = envelope
            .as_legacy()
            .ok_or_else(|| SubmitError::Malformed("not a legacy transaction".into()))?;
        let call = UnsignedCall::from_legacy(signed.tx())?;
        Ok(Self::new(call, *signed.signature()))
    }

    pub fn call(&self) -> &UnsignedCall {
        &self.call
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Canonical transaction identifier: keccak256 of the raw payload.
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Address that produced the signature.
    pub fn recover_signer(&self) -> Result<Address> {
        self.signature
            .recover_address_from_prehash(&self.call.signing_hash())
            .map_err(|e| SubmitError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{CallSigner, SigningIdentity};
    use alloy::primitives::address;

    // anvil account #0
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn call(nonce: u64) -> UnsignedCall {
        UnsignedCall::new(
            address!("0x0308D149EA4cBa0Bede727e01411879a88267432"),
            Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
            420420421,
            GasPolicy::default(),
            nonce,
        )
    }

    #[test]
    fn default_gas_policy_matches_fixed_price() {
        let gas = GasPolicy::default();
        assert_eq!(gas.gas_limit, 300_000);
        assert_eq!(gas.gas_price, 1_000_000_000);
    }

    #[test]
    fn signing_is_deterministic() {
        let identity: SigningIdentity = KEY.parse().unwrap();
        let first = identity.sign_call(&call(3)).unwrap();
        let second = identity.sign_call(&call(3)).unwrap();
        assert_eq!(first.signature(), second.signature());
        assert_eq!(first.raw(), second.raw());
        assert_eq!(first.hash(), second.hash());
    }

    #[test]
    fn decode_restores_call_and_signature() {
        let identity: SigningIdentity = KEY.parse().unwrap();
        let signed = identity.sign_call(&call(7)).unwrap();

        let decoded = SignedTransaction::decode(signed.raw()).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(decoded.call().nonce, 7);
        assert_eq!(decoded.recover_signer().unwrap(), identity.address());
    }

    #[test]
    fn hash_matches_envelope_hash() {
        let identity: SigningIdentity = KEY.parse().unwrap();
        let signed = identity.sign_call(&call(0)).unwrap();

        let mut buf = signed.raw().as_ref();
        let envelope = TxEnvelope::decode_2718(&mut buf).unwrap();
        assert_eq!(*envelope.tx_hash(), signed.hash());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            SignedTransaction::decode(&[0x01, 0x02]),
            Err(SubmitError::Malformed(_))
        ));
    }
}
