use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier},
    json_abi::{Function, JsonAbi},
    primitives::{Address, Bytes},
};

use crate::error::EncodingError;

/// A deployed contract together with its interface descriptor.
#[derive(Debug, Clone)]
pub struct ContractBinding {
    address: Address,
    abi: JsonAbi,
}

impl ContractBinding {
    pub fn new(address: Address, abi: JsonAbi) -> Self {
        Self { address, abi }
    }

    /// Builds a binding from a standard ABI JSON document.
    pub fn from_json(address: Address, json: &str) -> Result<Self, EncodingError> {
        let abi: JsonAbi = serde_json::from_str(json)
            .map_err(|e| EncodingError::InvalidDescriptor(e.to_string()))?;
        Ok(Self::new(address, abi))
    }

    /// Builds a binding from human-readable signatures such as
    /// `"function reportMissedSleep(uint256 challengeId, uint256 dayId)"`.
    pub fn from_signatures<'a>(
        address: Address,
        signatures: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, EncodingError> {
        let abi = JsonAbi::parse(signatures)
            .map_err(|e| EncodingError::InvalidDescriptor(e.to_string()))?;
        Ok(Self::new(address, abi))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Looks up `name` with the given arity. Overloads with the same arity are
    /// returned in declaration order.
    pub fn functions(&self, name: &str, arity: usize) -> Result<Vec<&Function>, EncodingError> {
        let overloads = self
            .abi
            .function(name)
            .ok_or_else(|| EncodingError::UnknownFunction(name.to_string()))?;

        let matching: Vec<&Function> = overloads
            .iter()
            .filter(|f| f.inputs.len() == arity)
            .collect();

        if matching.is_empty() {
            let mut expected: Vec<usize> = overloads.iter().map(|f| f.inputs.len()).collect();
            expected.sort_unstable();
            expected.dedup();
            return Err(EncodingError::ArityMismatch {
                function: name.to_string(),
                expected,
                actual: arity,
            });
        }
        Ok(matching)
    }

    /// Resolves the unique function named `name`, for callers that need its
    /// signature before they have arguments.
    pub fn function(&self, name: &str) -> Result<&Function, EncodingError> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| EncodingError::UnknownFunction(name.to_string()))
    }

    /// Encodes selector and arguments into call data.
    pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> Result<Bytes, EncodingError> {
        let mut last_err = None;
        for function in self.functions(name, args.len())? {
            match check_types(function, args) {
                Ok(()) => {
                    let data = function
                        .abi_encode_input(args)
                        .map_err(|e| EncodingError::Abi(e.to_string()))?;
                    return Ok(data.into());
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| EncodingError::UnknownFunction(name.to_string())))
    }

    /// Decodes call data produced by [`Self::encode_call`] back into the
    /// function name and its arguments.
    pub fn decode_call(&self, input: &[u8]) -> Result<(String, Vec<DynSolValue>), EncodingError> {
        if input.len() < 4 {
            return Err(EncodingError::Abi("call data shorter than a selector".into()));
        }
        let function = self
            .abi
            .functions()
            .find(|f| f.selector().as_slice() == &input[..4])
            .ok_or_else(|| EncodingError::UnknownFunction(alloy::hex::encode_prefixed(&input[..4])))?;

        let args = function
            .abi_decode_input(&input[4..])
            .map_err(|e| EncodingError::Abi(e.to_string()))?;
        Ok((function.name.clone(), args))
    }
}

/// Resolves the declared parameter types of `function`.
pub fn parameter_types(function: &Function) -> Result<Vec<DynSolType>, EncodingError> {
    function
        .inputs
        .iter()
        .map(|param| {
            param
                .resolve()
                .map_err(|e| EncodingError::InvalidDescriptor(e.to_string()))
        })
        .collect()
}

fn check_types(function: &Function, args: &[DynSolValue]) -> Result<(), EncodingError> {
    for (position, (ty, arg)) in parameter_types(function)?.iter().zip(args).enumerate() {
        if !ty.matches(arg) {
            return Err(EncodingError::TypeMismatch {
                function: function.name.clone(),
                position,
                expected: ty.sol_type_name().into_owned(),
            });
        }
    }
    Ok(())
}
