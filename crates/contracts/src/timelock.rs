//! Typed binding for the DAO timelock
//!
//! An OpenZeppelin-style timelock controller: operations are scheduled with a
//! minimum delay, executed once ready, and gated by proposer/executor/
//! canceller roles. `execute` and `executeBatch` are payable; the attached
//! value is forwarded to the chain client unmodified.

use std::sync::{Arc, OnceLock};

use ethers::abi::{ParamType, Token};
use ethers::providers::Middleware;
use ethers::types::{Address, Bytes, TransactionReceipt, H256, U256};

use dao_binding::{
    parse_address, BindingConfig, ContractBinding, ContractDescriptor, EventDescriptor,
    EventField, EventLogRecord, EventStream, FunctionDescriptor, Result,
};

use crate::macros::{event_api, event_record};

static DESCRIPTOR: OnceLock<Arc<ContractDescriptor>> = OnceLock::new();

/// The timelock's descriptor set, built once per process
pub fn descriptor() -> Arc<ContractDescriptor> {
    Arc::clone(DESCRIPTOR.get_or_init(|| Arc::new(build_descriptor())))
}

fn build_descriptor() -> ContractDescriptor {
    use FunctionDescriptor as F;
    use ParamType::*;

    let batch_call_inputs = || {
        vec![
            Array(Box::new(Address)),
            Array(Box::new(Uint(256))),
            Array(Box::new(Bytes)),
            FixedBytes(32),
            FixedBytes(32),
        ]
    };

    let functions = vec![
        F::read_only("CANCELLER_ROLE", vec![], vec![FixedBytes(32)]),
        F::read_only("DEFAULT_ADMIN_ROLE", vec![], vec![FixedBytes(32)]),
        F::read_only("EXECUTOR_ROLE", vec![], vec![FixedBytes(32)]),
        F::read_only("PROPOSER_ROLE", vec![], vec![FixedBytes(32)]),
        F::mutating("cancel", vec![FixedBytes(32)]),
        F::payable(
            "execute",
            vec![Address, Uint(256), Bytes, FixedBytes(32), FixedBytes(32)],
        ),
        F::payable("executeBatch", batch_call_inputs()),
        F::read_only("getMinDelay", vec![], vec![Uint(256)]),
        F::read_only("getOperationState", vec![FixedBytes(32)], vec![Uint(8)]),
        F::read_only("getRoleAdmin", vec![FixedBytes(32)], vec![FixedBytes(32)]),
        F::read_only("getTimestamp", vec![FixedBytes(32)], vec![Uint(256)]),
        F::mutating("grantRole", vec![FixedBytes(32), Address]),
        F::read_only("hasRole", vec![FixedBytes(32), Address], vec![Bool]),
        F::read_only(
            "hashOperation",
            vec![Address, Uint(256), Bytes, FixedBytes(32), FixedBytes(32)],
            vec![FixedBytes(32)],
        ),
        F::read_only("hashOperationBatch", batch_call_inputs(), vec![FixedBytes(32)]),
        F::read_only("isOperation", vec![FixedBytes(32)], vec![Bool]),
        F::read_only("isOperationDone", vec![FixedBytes(32)], vec![Bool]),
        F::read_only("isOperationPending", vec![FixedBytes(32)], vec![Bool]),
        F::read_only("isOperationReady", vec![FixedBytes(32)], vec![Bool]),
        F::mutating(
            "onERC1155BatchReceived",
            vec![
                Address,
                Address,
                Array(Box::new(Uint(256))),
                Array(Box::new(Uint(256))),
                Bytes,
            ],
        ),
        F::mutating(
            "onERC1155Received",
            vec![Address, Address, Uint(256), Uint(256), Bytes],
        ),
        F::mutating(
            "onERC721Received",
            vec![Address, Address, Uint(256), Bytes],
        ),
        F::mutating("renounceRole", vec![FixedBytes(32), Address]),
        F::mutating("revokeRole", vec![FixedBytes(32), Address]),
        F::mutating(
            "schedule",
            vec![
                Address,
                Uint(256),
                Bytes,
                FixedBytes(32),
                FixedBytes(32),
                Uint(256),
            ],
        ),
        F::mutating("scheduleBatch", {
            let mut inputs = batch_call_inputs();
            inputs.push(Uint(256));
            inputs
        }),
        F::read_only("supportsInterface", vec![FixedBytes(4)], vec![Bool]),
        F::mutating("updateDelay", vec![Uint(256)]),
    ];

    let events = vec![
        EventDescriptor::new(
            "CallExecuted",
            vec![
                EventField::indexed("id", FixedBytes(32)),
                EventField::indexed("index", Uint(256)),
                EventField::unindexed("target", Address),
                EventField::unindexed("value", Uint(256)),
                EventField::unindexed("data", Bytes),
            ],
        ),
        EventDescriptor::new(
            "CallSalt",
            vec![
                EventField::indexed("id", FixedBytes(32)),
                EventField::unindexed("salt", FixedBytes(32)),
            ],
        ),
        EventDescriptor::new(
            "CallScheduled",
            vec![
                EventField::indexed("id", FixedBytes(32)),
                EventField::indexed("index", Uint(256)),
                EventField::unindexed("target", Address),
                EventField::unindexed("value", Uint(256)),
                EventField::unindexed("data", Bytes),
                EventField::unindexed("predecessor", FixedBytes(32)),
                EventField::unindexed("delay", Uint(256)),
            ],
        ),
        EventDescriptor::new(
            "Cancelled",
            vec![EventField::indexed("id", FixedBytes(32))],
        ),
        EventDescriptor::new(
            "MinDelayChange",
            vec![
                EventField::unindexed("oldDuration", Uint(256)),
                EventField::unindexed("newDuration", Uint(256)),
            ],
        ),
        EventDescriptor::new(
            "RoleAdminChanged",
            vec![
                EventField::indexed("role", FixedBytes(32)),
                EventField::indexed("previousAdminRole", FixedBytes(32)),
                EventField::indexed("newAdminRole", FixedBytes(32)),
            ],
        ),
        EventDescriptor::new(
            "RoleGranted",
            vec![
                EventField::indexed("role", FixedBytes(32)),
                EventField::indexed("account", Address),
                EventField::indexed("sender", Address),
            ],
        ),
        EventDescriptor::new(
            "RoleRevoked",
            vec![
                EventField::indexed("role", FixedBytes(32)),
                EventField::indexed("account", Address),
                EventField::indexed("sender", Address),
            ],
        ),
    ];

    ContractDescriptor::new("Timelock", functions, events, vec![])
}

/// One call of a scheduled operation: target, attached value, and payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationCall {
    pub target: Address,
    pub value: U256,
    pub payload: Bytes,
}

impl OperationCall {
    fn split(calls: &[OperationCall]) -> (Token, Token, Token) {
        let targets = calls
            .iter()
            .map(|call| Token::Address(call.target))
            .collect();
        let values = calls.iter().map(|call| Token::Uint(call.value)).collect();
        let payloads = calls
            .iter()
            .map(|call| Token::Bytes(call.payload.to_vec()))
            .collect();
        (
            Token::Array(targets),
            Token::Array(values),
            Token::Array(payloads),
        )
    }
}

/// The timelock bound to a deployed address and a chain client
pub struct Timelock<M> {
    binding: ContractBinding<M>,
}

impl<M> Clone for Timelock<M> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
        }
    }
}

impl<M> std::fmt::Debug for Timelock<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timelock")
            .field("binding", &self.binding)
            .finish()
    }
}

impl<M> Timelock<M> {
    /// Bind to a deployed timelock with a signer-backed client
    pub fn new(address: Address, client: Arc<M>) -> Self {
        Self {
            binding: ContractBinding::connect(descriptor(), address, client),
        }
    }

    /// Bind for queries only; state-mutating calls fail locally
    pub fn read_only(address: Address, client: Arc<M>) -> Self {
        Self {
            binding: ContractBinding::connect_read_only(descriptor(), address, client),
        }
    }

    /// Bind with an explicit access mode and fee policy
    pub fn with_config(address: Address, client: Arc<M>, config: BindingConfig) -> Self {
        Self {
            binding: ContractBinding::with_config(descriptor(), address, client, config),
        }
    }

    /// Bind to an address given in hex form
    pub fn at(address: &str, client: Arc<M>, config: BindingConfig) -> Result<Self> {
        Ok(Self::with_config(parse_address(address)?, client, config))
    }

    /// The deployed contract address
    pub fn address(&self) -> Address {
        self.binding.address()
    }

    /// The underlying generic binding
    pub fn binding(&self) -> &ContractBinding<M> {
        &self.binding
    }
}

impl<M: Middleware> Timelock<M> {
    pub async fn canceller_role(&self) -> Result<H256> {
        self.binding.call_typed("CANCELLER_ROLE", vec![]).await
    }

    pub async fn default_admin_role(&self) -> Result<H256> {
        self.binding.call_typed("DEFAULT_ADMIN_ROLE", vec![]).await
    }

    pub async fn executor_role(&self) -> Result<H256> {
        self.binding.call_typed("EXECUTOR_ROLE", vec![]).await
    }

    pub async fn proposer_role(&self) -> Result<H256> {
        self.binding.call_typed("PROPOSER_ROLE", vec![]).await
    }

    pub async fn cancel(&self, id: H256) -> Result<TransactionReceipt> {
        self.binding
            .send("cancel", vec![Token::FixedBytes(id.as_bytes().to_vec())])
            .await
    }

    /// Execute a ready operation, forwarding `wei_value` with the call
    pub async fn execute(
        &self,
        call: OperationCall,
        predecessor: H256,
        salt: H256,
        wei_value: U256,
    ) -> Result<TransactionReceipt> {
        self.binding
            .send_with_value(
                "execute",
                vec![
                    Token::Address(call.target),
                    Token::Uint(call.value),
                    Token::Bytes(call.payload.to_vec()),
                    Token::FixedBytes(predecessor.as_bytes().to_vec()),
                    Token::FixedBytes(salt.as_bytes().to_vec()),
                ],
                Some(wei_value),
            )
            .await
    }

    /// Execute a ready batch operation, forwarding `wei_value` with the call
    pub async fn execute_batch(
        &self,
        calls: &[OperationCall],
        predecessor: H256,
        salt: H256,
        wei_value: U256,
    ) -> Result<TransactionReceipt> {
        let (targets, values, payloads) = OperationCall::split(calls);
        self.binding
            .send_with_value(
                "executeBatch",
                vec![
                    targets,
                    values,
                    payloads,
                    Token::FixedBytes(predecessor.as_bytes().to_vec()),
                    Token::FixedBytes(salt.as_bytes().to_vec()),
                ],
                Some(wei_value),
            )
            .await
    }

    pub async fn get_min_delay(&self) -> Result<U256> {
        self.binding.call_typed("getMinDelay", vec![]).await
    }

    /// Operation lifecycle state as the contract's numeric encoding:
    /// 0 unset, 1 waiting, 2 ready, 3 done
    pub async fn get_operation_state(&self, id: H256) -> Result<u8> {
        let state: u64 = self
            .binding
            .call_typed(
                "getOperationState",
                vec![Token::FixedBytes(id.as_bytes().to_vec())],
            )
            .await?;
        Ok(state as u8)
    }

    pub async fn get_role_admin(&self, role: H256) -> Result<H256> {
        self.binding
            .call_typed(
                "getRoleAdmin",
                vec![Token::FixedBytes(role.as_bytes().to_vec())],
            )
            .await
    }

    pub async fn get_timestamp(&self, id: H256) -> Result<U256> {
        self.binding
            .call_typed(
                "getTimestamp",
                vec![Token::FixedBytes(id.as_bytes().to_vec())],
            )
            .await
    }

    pub async fn grant_role(&self, role: H256, account: Address) -> Result<TransactionReceipt> {
        self.binding
            .send(
                "grantRole",
                vec![
                    Token::FixedBytes(role.as_bytes().to_vec()),
                    Token::Address(account),
                ],
            )
            .await
    }

    pub async fn has_role(&self, role: H256, account: Address) -> Result<bool> {
        self.binding
            .call_typed(
                "hasRole",
                vec![
                    Token::FixedBytes(role.as_bytes().to_vec()),
                    Token::Address(account),
                ],
            )
            .await
    }

    /// Compute the operation id for a single call, locally on the node
    pub async fn hash_operation(
        &self,
        call: OperationCall,
        predecessor: H256,
        salt: H256,
    ) -> Result<H256> {
        self.binding
            .call_typed(
                "hashOperation",
                vec![
                    Token::Address(call.target),
                    Token::Uint(call.value),
                    Token::Bytes(call.payload.to_vec()),
                    Token::FixedBytes(predecessor.as_bytes().to_vec()),
                    Token::FixedBytes(salt.as_bytes().to_vec()),
                ],
            )
            .await
    }

    /// Compute the operation id for a batch of calls
    pub async fn hash_operation_batch(
        &self,
        calls: &[OperationCall],
        predecessor: H256,
        salt: H256,
    ) -> Result<H256> {
        let (targets, values, payloads) = OperationCall::split(calls);
        self.binding
            .call_typed(
                "hashOperationBatch",
                vec![
                    targets,
                    values,
                    payloads,
                    Token::FixedBytes(predecessor.as_bytes().to_vec()),
                    Token::FixedBytes(salt.as_bytes().to_vec()),
                ],
            )
            .await
    }

    pub async fn is_operation(&self, id: H256) -> Result<bool> {
        self.binding
            .call_typed(
                "isOperation",
                vec![Token::FixedBytes(id.as_bytes().to_vec())],
            )
            .await
    }

    pub async fn is_operation_done(&self, id: H256) -> Result<bool> {
        self.binding
            .call_typed(
                "isOperationDone",
                vec![Token::FixedBytes(id.as_bytes().to_vec())],
            )
            .await
    }

    pub async fn is_operation_pending(&self, id: H256) -> Result<bool> {
        self.binding
            .call_typed(
                "isOperationPending",
                vec![Token::FixedBytes(id.as_bytes().to_vec())],
            )
            .await
    }

    pub async fn is_operation_ready(&self, id: H256) -> Result<bool> {
        self.binding
            .call_typed(
                "isOperationReady",
                vec![Token::FixedBytes(id.as_bytes().to_vec())],
            )
            .await
    }

    pub async fn on_erc1155_batch_received(
        &self,
        operator: Address,
        from: Address,
        ids: Vec<U256>,
        values: Vec<U256>,
        data: Bytes,
    ) -> Result<TransactionReceipt> {
        self.binding
            .send(
                "onERC1155BatchReceived",
                vec![
                    Token::Address(operator),
                    Token::Address(from),
                    Token::Array(ids.into_iter().map(Token::Uint).collect()),
                    Token::Array(values.into_iter().map(Token::Uint).collect()),
                    Token::Bytes(data.to_vec()),
                ],
            )
            .await
    }

    pub async fn on_erc1155_received(
        &self,
        operator: Address,
        from: Address,
        id: U256,
        value: U256,
        data: Bytes,
    ) -> Result<TransactionReceipt> {
        self.binding
            .send(
                "onERC1155Received",
                vec![
                    Token::Address(operator),
                    Token::Address(from),
                    Token::Uint(id),
                    Token::Uint(value),
                    Token::Bytes(data.to_vec()),
                ],
            )
            .await
    }

    pub async fn on_erc721_received(
        &self,
        operator: Address,
        from: Address,
        token_id: U256,
        data: Bytes,
    ) -> Result<TransactionReceipt> {
        self.binding
            .send(
                "onERC721Received",
                vec![
                    Token::Address(operator),
                    Token::Address(from),
                    Token::Uint(token_id),
                    Token::Bytes(data.to_vec()),
                ],
            )
            .await
    }

    pub async fn renounce_role(
        &self,
        role: H256,
        caller_confirmation: Address,
    ) -> Result<TransactionReceipt> {
        self.binding
            .send(
                "renounceRole",
                vec![
                    Token::FixedBytes(role.as_bytes().to_vec()),
                    Token::Address(caller_confirmation),
                ],
            )
            .await
    }

    pub async fn revoke_role(&self, role: H256, account: Address) -> Result<TransactionReceipt> {
        self.binding
            .send(
                "revokeRole",
                vec![
                    Token::FixedBytes(role.as_bytes().to_vec()),
                    Token::Address(account),
                ],
            )
            .await
    }

    /// Schedule a single-call operation to become ready after `delay`
    pub async fn schedule(
        &self,
        call: OperationCall,
        predecessor: H256,
        salt: H256,
        delay: U256,
    ) -> Result<TransactionReceipt> {
        self.binding
            .send(
                "schedule",
                vec![
                    Token::Address(call.target),
                    Token::Uint(call.value),
                    Token::Bytes(call.payload.to_vec()),
                    Token::FixedBytes(predecessor.as_bytes().to_vec()),
                    Token::FixedBytes(salt.as_bytes().to_vec()),
                    Token::Uint(delay),
                ],
            )
            .await
    }

    /// Schedule a batch operation to become ready after `delay`
    pub async fn schedule_batch(
        &self,
        calls: &[OperationCall],
        predecessor: H256,
        salt: H256,
        delay: U256,
    ) -> Result<TransactionReceipt> {
        let (targets, values, payloads) = OperationCall::split(calls);
        self.binding
            .send(
                "scheduleBatch",
                vec![
                    targets,
                    values,
                    payloads,
                    Token::FixedBytes(predecessor.as_bytes().to_vec()),
                    Token::FixedBytes(salt.as_bytes().to_vec()),
                    Token::Uint(delay),
                ],
            )
            .await
    }

    pub async fn supports_interface(&self, interface_id: [u8; 4]) -> Result<bool> {
        self.binding
            .call_typed(
                "supportsInterface",
                vec![Token::FixedBytes(interface_id.to_vec())],
            )
            .await
    }

    pub async fn update_delay(&self, new_delay: U256) -> Result<TransactionReceipt> {
        self.binding
            .send("updateDelay", vec![Token::Uint(new_delay)])
            .await
    }
}

event_record! {
    /// `CallExecuted(bytes32 indexed id, uint256 indexed index, address target, uint256 value, bytes data)`
    CallExecutedEvent from "CallExecuted" {
        id: H256 = "id",
        index: U256 = "index",
        target: Address = "target",
        value: U256 = "value",
        data: Bytes = "data",
    }
}

event_record! {
    /// `CallSalt(bytes32 indexed id, bytes32 salt)`
    CallSaltEvent from "CallSalt" {
        id: H256 = "id",
        salt: H256 = "salt",
    }
}

event_record! {
    /// `CallScheduled(bytes32 indexed id, uint256 indexed index, address target, uint256 value, bytes data, bytes32 predecessor, uint256 delay)`
    CallScheduledEvent from "CallScheduled" {
        id: H256 = "id",
        index: U256 = "index",
        target: Address = "target",
        value: U256 = "value",
        data: Bytes = "data",
        predecessor: H256 = "predecessor",
        delay: U256 = "delay",
    }
}

event_record! {
    /// `Cancelled(bytes32 indexed id)`
    CancelledEvent from "Cancelled" {
        id: H256 = "id",
    }
}

event_record! {
    /// `MinDelayChange(uint256 oldDuration, uint256 newDuration)`
    MinDelayChangeEvent from "MinDelayChange" {
        old_duration: U256 = "oldDuration",
        new_duration: U256 = "newDuration",
    }
}

event_record! {
    /// `RoleAdminChanged(bytes32 indexed role, bytes32 indexed previousAdminRole, bytes32 indexed newAdminRole)`
    RoleAdminChangedEvent from "RoleAdminChanged" {
        role: H256 = "role",
        previous_admin_role: H256 = "previousAdminRole",
        new_admin_role: H256 = "newAdminRole",
    }
}

event_record! {
    /// `RoleGranted(bytes32 indexed role, address indexed account, address indexed sender)`
    RoleGrantedEvent from "RoleGranted" {
        role: H256 = "role",
        account: Address = "account",
        sender: Address = "sender",
    }
}

event_record! {
    /// `RoleRevoked(bytes32 indexed role, address indexed account, address indexed sender)`
    RoleRevokedEvent from "RoleRevoked" {
        role: H256 = "role",
        account: Address = "account",
        sender: Address = "sender",
    }
}

event_api! {
    Timelock {
        "CallExecuted" => CallExecutedEvent {
            receipt: call_executed_events,
            log: call_executed_from_log,
            filter: call_executed_filter,
            stream: call_executed_stream,
            range: call_executed_stream_in_range,
        },
        "CallSalt" => CallSaltEvent {
            receipt: call_salt_events,
            log: call_salt_from_log,
            filter: call_salt_filter,
            stream: call_salt_stream,
            range: call_salt_stream_in_range,
        },
        "CallScheduled" => CallScheduledEvent {
            receipt: call_scheduled_events,
            log: call_scheduled_from_log,
            filter: call_scheduled_filter,
            stream: call_scheduled_stream,
            range: call_scheduled_stream_in_range,
        },
        "Cancelled" => CancelledEvent {
            receipt: cancelled_events,
            log: cancelled_from_log,
            filter: cancelled_filter,
            stream: cancelled_stream,
            range: cancelled_stream_in_range,
        },
        "MinDelayChange" => MinDelayChangeEvent {
            receipt: min_delay_change_events,
            log: min_delay_change_from_log,
            filter: min_delay_change_filter,
            stream: min_delay_change_stream,
            range: min_delay_change_stream_in_range,
        },
        "RoleAdminChanged" => RoleAdminChangedEvent {
            receipt: role_admin_changed_events,
            log: role_admin_changed_from_log,
            filter: role_admin_changed_filter,
            stream: role_admin_changed_stream,
            range: role_admin_changed_stream_in_range,
        },
        "RoleGranted" => RoleGrantedEvent {
            receipt: role_granted_events,
            log: role_granted_from_log,
            filter: role_granted_filter,
            stream: role_granted_stream,
            range: role_granted_stream_in_range,
        },
        "RoleRevoked" => RoleRevokedEvent {
            receipt: role_revoked_events,
            log: role_revoked_from_log,
            filter: role_revoked_filter,
            stream: role_revoked_stream,
            range: role_revoked_stream_in_range,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_binding::{BindingError, Mutability};
    use ethers::abi;
    use ethers::providers::Provider;
    use ethers::types::Log;

    #[test]
    fn descriptor_covers_the_full_interface() {
        let descriptor = descriptor();
        assert_eq!(descriptor.functions().len(), 28);
        assert_eq!(descriptor.events().len(), 8);
    }

    #[test]
    fn known_selectors_and_topics_match() {
        let descriptor = descriptor();
        let selector = |name: &str| descriptor.function(name).unwrap().selector().to_vec();
        assert_eq!(selector("grantRole"), hex::decode("2f2ff15d").unwrap());
        assert_eq!(selector("hasRole"), hex::decode("91d14854").unwrap());
        assert_eq!(selector("revokeRole"), hex::decode("d547741f").unwrap());

        let role_granted: H256 =
            "0x2f8788117e7eff1d82e926ec794901d17c78024a50270940304540a733656f0d"
                .parse()
                .unwrap();
        assert_eq!(
            descriptor.event("RoleGranted").unwrap().topic(),
            role_granted
        );
    }

    #[test]
    fn payable_functions_are_classed_as_such() {
        let descriptor = descriptor();
        let class = |name: &str| descriptor.function(name).unwrap().mutability();
        assert_eq!(class("execute"), Mutability::Payable);
        assert_eq!(class("executeBatch"), Mutability::Payable);
        assert_eq!(class("schedule"), Mutability::Mutating);
        assert_eq!(class("getMinDelay"), Mutability::ReadOnly);
    }

    #[tokio::test]
    async fn has_role_returns_the_client_value_verbatim() {
        let (provider, mock) = Provider::mocked();
        let timelock = Timelock::read_only(Address::repeat_byte(0xaa), Arc::new(provider));

        let encoded = abi::encode(&[Token::Bool(true)]);
        mock.push::<ethers::types::Bytes, _>(ethers::types::Bytes::from(encoded))
            .unwrap();

        let granted = timelock
            .has_role(H256::zero(), Address::repeat_byte(0xbb))
            .await
            .unwrap();
        assert!(granted);
    }

    #[tokio::test]
    async fn execute_on_a_read_only_binding_fails_locally() {
        let (provider, _mock) = Provider::mocked();
        let timelock = Timelock::read_only(Address::repeat_byte(0xaa), Arc::new(provider));

        let err = timelock
            .execute(
                OperationCall {
                    target: Address::repeat_byte(0xbb),
                    value: U256::zero(),
                    payload: Bytes::default(),
                },
                H256::zero(),
                H256::zero(),
                U256::one(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BindingError::UnsupportedOperation(_)));
    }

    #[tokio::test]
    async fn hash_operation_decodes_to_a_hash() {
        let (provider, mock) = Provider::mocked();
        let timelock = Timelock::read_only(Address::repeat_byte(0xaa), Arc::new(provider));

        let id = H256::repeat_byte(0x5a);
        mock.push::<ethers::types::Bytes, _>(ethers::types::Bytes::from(id.as_bytes().to_vec()))
            .unwrap();

        let computed = timelock
            .hash_operation(
                OperationCall {
                    target: Address::repeat_byte(0xbb),
                    value: U256::zero(),
                    payload: Bytes::from(vec![1, 2, 3]),
                },
                H256::zero(),
                H256::zero(),
            )
            .await
            .unwrap();
        assert_eq!(computed, id);
    }

    #[test]
    fn call_scheduled_logs_decode_into_the_typed_record() {
        let (provider, _mock) = Provider::mocked();
        let ours = Address::repeat_byte(0xaa);
        let timelock = Timelock::read_only(ours, Arc::new(provider));

        let id = H256::repeat_byte(0x01);
        let index = U256::from(2);
        let data = abi::encode(&[
            Token::Address(Address::repeat_byte(0xcc)),
            Token::Uint(U256::from(7)),
            Token::Bytes(vec![0xde, 0xad]),
            Token::FixedBytes(H256::zero().as_bytes().to_vec()),
            Token::Uint(U256::from(3600)),
        ]);
        let mut index_topic = [0u8; 32];
        index.to_big_endian(&mut index_topic);
        let log = Log {
            address: ours,
            topics: vec![
                super::descriptor().event("CallScheduled").unwrap().topic(),
                id,
                H256::from(index_topic),
            ],
            data: ethers::types::Bytes::from(data),
            ..Default::default()
        };

        let event = timelock.call_scheduled_from_log(&log).unwrap();
        assert_eq!(
            event,
            CallScheduledEvent {
                id,
                index,
                target: Address::repeat_byte(0xcc),
                value: U256::from(7),
                data: Bytes::from(vec![0xde, 0xad]),
                predecessor: H256::zero(),
                delay: U256::from(3600),
            }
        );
    }

    #[test]
    fn truncated_data_is_rejected() {
        let (provider, _mock) = Provider::mocked();
        let ours = Address::repeat_byte(0xaa);
        let timelock = Timelock::read_only(ours, Arc::new(provider));

        let log = Log {
            address: ours,
            topics: vec![
                super::descriptor().event("MinDelayChange").unwrap().topic(),
            ],
            data: ethers::types::Bytes::from(vec![0u8; 32]),
            ..Default::default()
        };
        let err = timelock.min_delay_change_from_log(&log).unwrap_err();
        assert!(matches!(err, BindingError::TruncatedLog(_)));
    }
}
