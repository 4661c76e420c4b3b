use std::fmt;
use std::str::FromStr;

use alloy::{
    primitives::Address,
    signers::{SignerSync, local::PrivateKeySigner},
};
use secrecy::zeroize::Zeroizing;

use crate::{
    error::{Result, SubmitError},
    txtools::{SignedTransaction, UnsignedCall},
};

/// Anything able to turn an [`UnsignedCall`] into a [`SignedTransaction`].
pub trait CallSigner: Send + Sync {
    fn address(&self) -> Address;

    fn sign_call(&self, call: &UnsignedCall) -> Result<SignedTransaction>;
}

/// The operator's key and its derived address.
///
/// The key never leaves this type: `Debug` and `Display` only show the address.
#[derive(Clone)]
pub struct SigningIdentity {
    signer: PrivateKeySigner,
}

impl SigningIdentity {
    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

impl CallSigner for SigningIdentity {
    fn address(&self) -> Address {
        self.signer.address()
    }

    fn sign_call(&self, call: &UnsignedCall) -> Result<SignedTransaction> {
        let signature = self
            .signer
            .sign_hash_sync(&call.signing_hash())
            .map_err(|e| SubmitError::Signing(e.to_string()))?;
        Ok(SignedTransaction::new(call.clone(), signature))
    }
}

impl FromStr for SigningIdentity {
    type Err = SubmitError;

    fn from_str(s: &str) -> Result<Self> {
        let stripped = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        if stripped.is_empty() {
            return Err(SubmitError::Signing("empty private key".into()));
        }
        let bytes = Zeroizing::new(
            hex::decode(stripped).map_err(|_| SubmitError::Signing("private key is not hex".into()))?,
        );
        let signer = PrivateKeySigner::from_slice(&bytes)
            .map_err(|_| SubmitError::Signing("invalid private key".into()))?;
        Ok(Self { signer })
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address())
    }
}
