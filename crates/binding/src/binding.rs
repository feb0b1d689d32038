//! Contract binding and call/transaction dispatch
//!
//! A [`ContractBinding`] ties one static [`ContractDescriptor`] to a deployed
//! address and a shared chain client. The binding holds no mutable state:
//! every operation is a single outbound request delegated to the client, so
//! one binding can be used concurrently from any number of callers.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ethers::abi::{self, Detokenize, ParamType, Token};
use ethers::providers::Middleware;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{
    Address, Bytes, Eip1559TransactionRequest, TransactionReceipt, TransactionRequest, U256,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::{canonical_type, ContractDescriptor, FunctionDescriptor, Mutability};
use crate::error::{BindingError, Result};

/// Whether a binding is allowed to submit transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    /// The client can sign; state-mutating calls are permitted
    SignerBacked,
    /// Query-only; state-mutating calls fail locally
    QueryOnly,
}

/// Fee policy applied to submitted transactions.
///
/// `ClientDefault` leaves gas and fee selection entirely to the chain client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeePolicy {
    /// Let the client fill gas price and limit
    ClientDefault,
    /// Fixed legacy gas price, optional explicit gas limit
    Legacy {
        gas_price: U256,
        gas_limit: Option<U256>,
    },
    /// EIP-1559 fee caps, optional explicit gas limit
    Eip1559 {
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
        gas_limit: Option<U256>,
    },
}

/// Configuration for constructing a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Signer-backed or query-only
    pub access: AccessMode,
    /// Fee policy for submitted transactions
    pub fees: FeePolicy,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            access: AccessMode::SignerBacked,
            fees: FeePolicy::ClientDefault,
        }
    }
}

/// One contract interface bound to a deployed address and a chain client
pub struct ContractBinding<M> {
    descriptor: Arc<ContractDescriptor>,
    address: Address,
    client: Arc<M>,
    config: BindingConfig,
}

impl<M> Clone for ContractBinding<M> {
    fn clone(&self) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            address: self.address,
            client: Arc::clone(&self.client),
            config: self.config,
        }
    }
}

impl<M> fmt::Debug for ContractBinding<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractBinding")
            .field("contract", &self.descriptor.name())
            .field("address", &self.address)
            .field("config", &self.config)
            .finish()
    }
}

impl<M> ContractBinding<M> {
    /// Bind a descriptor to an address with a signer-backed client and
    /// default fee policy. No network I/O happens here.
    pub fn connect(
        descriptor: Arc<ContractDescriptor>,
        address: Address,
        client: Arc<M>,
    ) -> Self {
        Self::with_config(descriptor, address, client, BindingConfig::default())
    }

    /// Bind a descriptor to an address for queries only; any state-mutating
    /// call on the result fails with an unsupported-operation error.
    pub fn connect_read_only(
        descriptor: Arc<ContractDescriptor>,
        address: Address,
        client: Arc<M>,
    ) -> Self {
        Self::with_config(
            descriptor,
            address,
            client,
            BindingConfig {
                access: AccessMode::QueryOnly,
                fees: FeePolicy::ClientDefault,
            },
        )
    }

    /// Bind with an explicit configuration
    pub fn with_config(
        descriptor: Arc<ContractDescriptor>,
        address: Address,
        client: Arc<M>,
        config: BindingConfig,
    ) -> Self {
        Self {
            descriptor,
            address,
            client,
            config,
        }
    }

    /// The deployed contract address
    pub fn address(&self) -> Address {
        self.address
    }

    /// The contract's descriptor set
    pub fn descriptor(&self) -> &Arc<ContractDescriptor> {
        &self.descriptor
    }

    /// The shared chain client
    pub fn client(&self) -> &Arc<M> {
        &self.client
    }

    /// The binding configuration
    pub fn config(&self) -> &BindingConfig {
        &self.config
    }
}

impl<M: Middleware> ContractBinding<M> {
    /// Dispatch a read-only call and decode the result into the descriptor's
    /// declared output tokens, in declaration order.
    pub async fn call(&self, function: &str, args: Vec<Token>) -> Result<Vec<Token>> {
        let func = self.lookup(function)?;
        if func.mutability() != Mutability::ReadOnly {
            return Err(BindingError::unsupported(format!(
                "`{}` is state-mutating and must be submitted as a transaction",
                function
            )));
        }

        let data = encode_call(func, &args)?;
        debug!(
            contract = self.descriptor.name(),
            function,
            selector = %Bytes::from(func.selector().to_vec()),
            "dispatching read-only call"
        );

        let tx: TypedTransaction = TransactionRequest::new()
            .to(self.address)
            .data(data)
            .into();
        let raw = self
            .client
            .call(&tx, None)
            .await
            .map_err(|e| BindingError::remote(e.to_string()))?;

        decode_output(func, &raw)
    }

    /// Dispatch a read-only call and convert the output tokens into a native
    /// value. Single outputs detokenize directly; multiple outputs detokenize
    /// as a tuple in declaration order.
    pub async fn call_typed<T: Detokenize>(&self, function: &str, args: Vec<Token>) -> Result<T> {
        let tokens = self.call(function, args).await?;
        T::from_tokens(tokens).map_err(|e| BindingError::decoding(e.to_string()))
    }

    /// Submit a state-mutating call and await its inclusion receipt
    pub async fn send(&self, function: &str, args: Vec<Token>) -> Result<TransactionReceipt> {
        self.send_with_value(function, args, None).await
    }

    /// Submit a state-mutating call, optionally attaching a value for payable
    /// functions, and await its inclusion receipt.
    pub async fn send_with_value(
        &self,
        function: &str,
        args: Vec<Token>,
        value: Option<U256>,
    ) -> Result<TransactionReceipt> {
        let func = self.lookup(function)?;
        match func.mutability() {
            Mutability::ReadOnly => {
                return Err(BindingError::unsupported(format!(
                    "`{}` is read-only and has no transaction path",
                    function
                )));
            }
            Mutability::Mutating if value.is_some() => {
                return Err(BindingError::encoding(format!(
                    "`{}` is not payable and cannot carry a value",
                    function
                )));
            }
            _ => {}
        }
        if self.config.access == AccessMode::QueryOnly {
            return Err(BindingError::unsupported(format!(
                "state-mutating call `{}` attempted on a query-only binding",
                function
            )));
        }

        let data = encode_call(func, &args)?;
        debug!(
            contract = self.descriptor.name(),
            function,
            value = ?value,
            "submitting transaction"
        );

        let tx = self.build_transaction(data, value);
        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| BindingError::remote(e.to_string()))?;
        let receipt = pending
            .await
            .map_err(|e| BindingError::remote(e.to_string()))?
            .ok_or_else(|| BindingError::remote("transaction was dropped before inclusion"))?;

        Ok(receipt)
    }

    fn lookup(&self, function: &str) -> Result<&FunctionDescriptor> {
        self.descriptor.function(function).ok_or_else(|| {
            BindingError::encoding(format!(
                "contract `{}` has no function `{}`",
                self.descriptor.name(),
                function
            ))
        })
    }

    fn build_transaction(&self, data: Bytes, value: Option<U256>) -> TypedTransaction {
        match self.config.fees {
            FeePolicy::ClientDefault => {
                let mut tx = TransactionRequest::new().to(self.address).data(data);
                if let Some(value) = value {
                    tx = tx.value(value);
                }
                tx.into()
            }
            FeePolicy::Legacy {
                gas_price,
                gas_limit,
            } => {
                let mut tx = TransactionRequest::new()
                    .to(self.address)
                    .data(data)
                    .gas_price(gas_price);
                if let Some(gas) = gas_limit {
                    tx = tx.gas(gas);
                }
                if let Some(value) = value {
                    tx = tx.value(value);
                }
                tx.into()
            }
            FeePolicy::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
                gas_limit,
            } => {
                let mut tx = Eip1559TransactionRequest::new()
                    .to(self.address)
                    .data(data)
                    .max_fee_per_gas(max_fee_per_gas)
                    .max_priority_fee_per_gas(max_priority_fee_per_gas);
                if let Some(gas) = gas_limit {
                    tx = tx.gas(gas);
                }
                if let Some(value) = value {
                    tx = tx.value(value);
                }
                tx.into()
            }
        }
    }
}

/// Parse a contract or account address from its hex form. Invalid syntax is
/// a local encoding error and never reaches the network.
pub fn parse_address(s: &str) -> Result<Address> {
    Address::from_str(s)
        .map_err(|e| BindingError::encoding(format!("invalid address `{}`: {}", s, e)))
}

/// Encode arguments for a function per its descriptor: selector followed by
/// the ABI-encoded argument tuple. Argument count, order, and widths must
/// match the descriptor exactly.
pub(crate) fn encode_call(func: &FunctionDescriptor, args: &[Token]) -> Result<Bytes> {
    if args.len() != func.inputs().len() {
        return Err(BindingError::encoding(format!(
            "`{}` expects {} argument(s), got {}",
            func.name(),
            func.inputs().len(),
            args.len()
        )));
    }
    for (position, (token, kind)) in args.iter().zip(func.inputs()).enumerate() {
        check_token(token, kind).map_err(|reason| {
            BindingError::encoding(format!(
                "argument {} of `{}`: {}",
                position,
                func.name(),
                reason
            ))
        })?;
    }

    let mut data = func.selector().to_vec();
    data.extend(abi::encode(args));
    Ok(data.into())
}

/// Decode raw return bytes into the descriptor's declared output types
pub(crate) fn decode_output(func: &FunctionDescriptor, raw: &[u8]) -> Result<Vec<Token>> {
    abi::decode(func.outputs(), raw).map_err(|e| {
        BindingError::decoding(format!(
            "return data of `{}` does not match declared outputs: {}",
            func.name(),
            e
        ))
    })
}

/// Check one argument token against its declared type tag, including integer
/// widths and fixed-size lengths. Signed values are held in two's-complement
/// form, so a negative value fits iff its sign extension fills the unused
/// high bits.
fn check_token(token: &Token, kind: &ParamType) -> std::result::Result<(), String> {
    match (token, kind) {
        (Token::Address(_), ParamType::Address) => Ok(()),
        (Token::Bool(_), ParamType::Bool) => Ok(()),
        (Token::String(_), ParamType::String) => Ok(()),
        (Token::Bytes(_), ParamType::Bytes) => Ok(()),
        (Token::FixedBytes(bytes), ParamType::FixedBytes(size)) => {
            if bytes.len() == *size {
                Ok(())
            } else {
                Err(format!("expected bytes{}, got {} bytes", size, bytes.len()))
            }
        }
        (Token::Uint(value), ParamType::Uint(bits)) => {
            if *bits == 256 || value.bits() <= *bits {
                Ok(())
            } else {
                Err(format!("value {} does not fit in uint{}", value, bits))
            }
        }
        (Token::Int(value), ParamType::Int(bits)) => {
            if *bits == 256 {
                return Ok(());
            }
            let sign_bits = *value >> (*bits - 1);
            if sign_bits.is_zero() || sign_bits == U256::MAX >> (*bits - 1) {
                Ok(())
            } else {
                Err(format!("value does not fit in int{}", bits))
            }
        }
        (Token::Array(items), ParamType::Array(inner)) => {
            items.iter().try_for_each(|item| check_token(item, inner))
        }
        (Token::FixedArray(items), ParamType::FixedArray(inner, size)) => {
            if items.len() != *size {
                return Err(format!(
                    "expected {} array element(s), got {}",
                    size,
                    items.len()
                ));
            }
            items.iter().try_for_each(|item| check_token(item, inner))
        }
        (Token::Tuple(items), ParamType::Tuple(kinds)) => {
            if items.len() != kinds.len() {
                return Err(format!(
                    "expected {} tuple field(s), got {}",
                    kinds.len(),
                    items.len()
                ));
            }
            items
                .iter()
                .zip(kinds)
                .try_for_each(|(item, kind)| check_token(item, kind))
        }
        (other, kind) => Err(format!(
            "expected {}, got {:?}",
            canonical_type(kind),
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FunctionDescriptor;

    #[test]
    fn uint_width_is_enforced() {
        assert!(check_token(&Token::Uint(255.into()), &ParamType::Uint(8)).is_ok());
        assert!(check_token(&Token::Uint(256.into()), &ParamType::Uint(8)).is_err());
        assert!(check_token(&Token::Uint(U256::MAX), &ParamType::Uint(256)).is_ok());
    }

    #[test]
    fn int_width_covers_both_signs() {
        // 127 and -128 are the int8 bounds; 128 and -129 are out of range.
        let plus = |v: u64| Token::Int(U256::from(v));
        let minus = |v: u64| Token::Int(U256::MAX - U256::from(v - 1));
        assert!(check_token(&plus(127), &ParamType::Int(8)).is_ok());
        assert!(check_token(&plus(128), &ParamType::Int(8)).is_err());
        assert!(check_token(&minus(128), &ParamType::Int(8)).is_ok());
        assert!(check_token(&minus(129), &ParamType::Int(8)).is_err());
    }

    #[test]
    fn fixed_bytes_length_is_enforced() {
        assert!(check_token(&Token::FixedBytes(vec![0; 32]), &ParamType::FixedBytes(32)).is_ok());
        assert!(check_token(&Token::FixedBytes(vec![0; 31]), &ParamType::FixedBytes(32)).is_err());
    }

    #[test]
    fn nested_shapes_are_checked_recursively() {
        let kind = ParamType::Array(Box::new(ParamType::Uint(8)));
        let good = Token::Array(vec![Token::Uint(1.into()), Token::Uint(255.into())]);
        let bad = Token::Array(vec![Token::Uint(1.into()), Token::Uint(300.into())]);
        assert!(check_token(&good, &kind).is_ok());
        assert!(check_token(&bad, &kind).is_err());

        let tuple_kind = ParamType::Tuple(vec![ParamType::Uint(48), ParamType::Uint(208)]);
        let tuple = Token::Tuple(vec![Token::Uint(7.into()), Token::Uint(9.into())]);
        assert!(check_token(&tuple, &tuple_kind).is_ok());
        let short = Token::Tuple(vec![Token::Uint(7.into())]);
        assert!(check_token(&short, &tuple_kind).is_err());
    }

    #[test]
    fn encode_rejects_wrong_arity() {
        let transfer = FunctionDescriptor::mutating(
            "transfer",
            vec![ParamType::Address, ParamType::Uint(256)],
        );
        let err = encode_call(&transfer, &[Token::Address(Address::zero())]).unwrap_err();
        assert!(matches!(err, BindingError::Encoding(_)));
    }

    #[test]
    fn encode_prefixes_selector() {
        let balance_of = FunctionDescriptor::read_only(
            "balanceOf",
            vec![ParamType::Address],
            vec![ParamType::Uint(256)],
        );
        let data = encode_call(&balance_of, &[Token::Address(Address::zero())]).unwrap();
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(data.len(), 4 + 32);
    }

    #[test]
    fn decode_rejects_short_return_data() {
        let total_supply =
            FunctionDescriptor::read_only("totalSupply", vec![], vec![ParamType::Uint(256)]);
        let err = decode_output(&total_supply, &[0u8; 16]).unwrap_err();
        assert!(matches!(err, BindingError::Decoding(_)));
    }

    #[test]
    fn parse_address_rejects_bad_syntax() {
        assert!(parse_address("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").is_ok());
        let err = parse_address("not-an-address").unwrap_err();
        assert!(matches!(err, BindingError::Encoding(_)));
    }
}
