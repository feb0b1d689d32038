//! Typed binding for the DAO governance token
//!
//! An ERC20 with votes, permit, pause, and owner-gated minting. The interface
//! is declared once as a static descriptor set; every wrapper below is a thin
//! delegation into the generic dispatch and decode routines of `dao-binding`.

use std::sync::{Arc, OnceLock};

use ethers::abi::{ParamType, Token, Tokenizable};
use ethers::providers::Middleware;
use ethers::types::{Address, TransactionReceipt, H256, U256};

use dao_binding::{
    parse_address, BindingConfig, BindingError, ContractBinding, ContractDescriptor,
    EventDescriptor, EventField, EventLogRecord, EventStream, FunctionDescriptor, Result,
    StructDescriptor,
};

use crate::macros::{event_api, event_record};

static DESCRIPTOR: OnceLock<Arc<ContractDescriptor>> = OnceLock::new();

/// The governance token's descriptor set, built once per process
pub fn descriptor() -> Arc<ContractDescriptor> {
    Arc::clone(DESCRIPTOR.get_or_init(|| Arc::new(build_descriptor())))
}

fn build_descriptor() -> ContractDescriptor {
    use FunctionDescriptor as F;
    use ParamType::*;

    let functions = vec![
        F::read_only("CLOCK_MODE", vec![], vec![String]),
        F::read_only("DOMAIN_SEPARATOR", vec![], vec![FixedBytes(32)]),
        F::read_only("allowance", vec![Address, Address], vec![Uint(256)]),
        F::mutating("approve", vec![Address, Uint(256)]),
        F::read_only("balanceOf", vec![Address], vec![Uint(256)]),
        F::read_only(
            "checkpoints",
            vec![Address, Uint(32)],
            vec![Tuple(vec![Uint(48), Uint(208)])],
        ),
        F::read_only("clock", vec![], vec![Uint(48)]),
        F::read_only("decimals", vec![], vec![Uint(8)]),
        F::mutating("delegate", vec![Address]),
        F::mutating(
            "delegateBySig",
            vec![
                Address,
                Uint(256),
                Uint(256),
                Uint(8),
                FixedBytes(32),
                FixedBytes(32),
            ],
        ),
        F::read_only("delegates", vec![Address], vec![Address]),
        F::read_only(
            "eip712Domain",
            vec![],
            vec![
                FixedBytes(1),
                String,
                String,
                Uint(256),
                Address,
                FixedBytes(32),
                Array(Box::new(Uint(256))),
            ],
        ),
        F::read_only("getPastTotalSupply", vec![Uint(256)], vec![Uint(256)]),
        F::read_only("getPastVotes", vec![Address, Uint(256)], vec![Uint(256)]),
        F::read_only("getVotes", vec![Address], vec![Uint(256)]),
        F::mutating("mint", vec![Address, Uint(256)]),
        F::read_only("name", vec![], vec![String]),
        F::read_only("nonces", vec![Address], vec![Uint(256)]),
        F::read_only("numCheckpoints", vec![Address], vec![Uint(32)]),
        F::read_only("owner", vec![], vec![Address]),
        F::mutating("pause", vec![]),
        F::read_only("paused", vec![], vec![Bool]),
        F::mutating(
            "permit",
            vec![
                Address,
                Address,
                Uint(256),
                Uint(256),
                Uint(8),
                FixedBytes(32),
                FixedBytes(32),
            ],
        ),
        F::mutating("renounceOwnership", vec![]),
        F::read_only("s_maxSupply", vec![], vec![Uint(256)]),
        F::read_only("symbol", vec![], vec![String]),
        F::read_only("totalSupply", vec![], vec![Uint(256)]),
        F::mutating("transfer", vec![Address, Uint(256)]),
        F::mutating("transferFrom", vec![Address, Address, Uint(256)]),
        F::mutating("transferOwnership", vec![Address]),
        F::mutating("unpause", vec![]),
    ];

    let events = vec![
        EventDescriptor::new(
            "Approval",
            vec![
                EventField::indexed("owner", Address),
                EventField::indexed("spender", Address),
                EventField::unindexed("value", Uint(256)),
            ],
        ),
        EventDescriptor::new(
            "DelegateChanged",
            vec![
                EventField::indexed("delegator", Address),
                EventField::indexed("fromDelegate", Address),
                EventField::indexed("toDelegate", Address),
            ],
        ),
        EventDescriptor::new(
            "DelegateVotesChanged",
            vec![
                EventField::indexed("delegate", Address),
                EventField::unindexed("previousVotes", Uint(256)),
                EventField::unindexed("newVotes", Uint(256)),
            ],
        ),
        EventDescriptor::new("EIP712DomainChanged", vec![]),
        EventDescriptor::new(
            "OwnershipTransferred",
            vec![
                EventField::indexed("previousOwner", Address),
                EventField::indexed("newOwner", Address),
            ],
        ),
        EventDescriptor::new("Paused", vec![EventField::unindexed("account", Address)]),
        EventDescriptor::new(
            "Transfer",
            vec![
                EventField::indexed("from", Address),
                EventField::indexed("to", Address),
                EventField::unindexed("value", Uint(256)),
            ],
        ),
        EventDescriptor::new("Unpaused", vec![EventField::unindexed("account", Address)]),
    ];

    let structs = vec![StructDescriptor::new(
        "Checkpoint",
        vec![("_key", Uint(48)), ("_value", Uint(208))],
    )];

    ContractDescriptor::new("GovernanceToken", functions, events, structs)
}

/// One voting checkpoint: a clock key and the vote weight recorded at it.
///
/// The key is a uint48 on-chain and always fits a u64; the value is a
/// uint208 and is kept at full width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub key: u64,
    pub value: U256,
}

impl Checkpoint {
    fn from_token(token: Token) -> Result<Self> {
        let fields = match token {
            Token::Tuple(fields) if fields.len() == 2 => fields,
            other => {
                return Err(BindingError::decoding(format!(
                    "expected a checkpoint tuple, got {:?}",
                    other
                )))
            }
        };
        let mut fields = fields.into_iter();
        let key = u64::from_token(fields.next().expect("length checked"))
            .map_err(|e| BindingError::decoding(format!("checkpoint key: {}", e)))?;
        let value = U256::from_token(fields.next().expect("length checked"))
            .map_err(|e| BindingError::decoding(format!("checkpoint value: {}", e)))?;
        Ok(Self { key, value })
    }
}

/// The EIP-712 domain reported by the contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Domain {
    pub fields: [u8; 1],
    pub name: String,
    pub version: String,
    pub chain_id: U256,
    pub verifying_contract: Address,
    pub salt: H256,
    pub extensions: Vec<U256>,
}

/// The governance token bound to a deployed address and a chain client
pub struct GovernanceToken<M> {
    binding: ContractBinding<M>,
}

impl<M> Clone for GovernanceToken<M> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
        }
    }
}

impl<M> std::fmt::Debug for GovernanceToken<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernanceToken")
            .field("binding", &self.binding)
            .finish()
    }
}

impl<M> GovernanceToken<M> {
    /// Bind to a deployed token with a signer-backed client
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

impl<M: Middleware> GovernanceToken<M> {
    pub async fn clock_mode(&self) -> Result<String> {
        self.binding.call_typed("CLOCK_MODE", vec![]).await
    }

    pub async fn domain_separator(&self) -> Result<H256> {
        self.binding.call_typed("DOMAIN_SEPARATOR", vec![]).await
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        self.binding
            .call_typed(
                "allowance",
                vec![Token::Address(owner), Token::Address(spender)],
            )
            .await
    }

    pub async fn approve(&self, spender: Address, value: U256) -> Result<TransactionReceipt> {
        self.binding
            .send(
                "approve",
                vec![Token::Address(spender), Token::Uint(value)],
            )
            .await
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256> {
        self.binding
            .call_typed("balanceOf", vec![Token::Address(account)])
            .await
    }

    pub async fn checkpoints(&self, account: Address, pos: u32) -> Result<Checkpoint> {
        let mut tokens = self
            .binding
            .call(
                "checkpoints",
                vec![Token::Address(account), Token::Uint(pos.into())],
            )
            .await?;
        let token = tokens
            .pop()
            .ok_or_else(|| BindingError::decoding("checkpoints returned no value"))?;
        Checkpoint::from_token(token)
    }

    pub async fn clock(&self) -> Result<u64> {
        self.binding.call_typed("clock", vec![]).await
    }

    pub async fn decimals(&self) -> Result<u8> {
        let value: u64 = self.binding.call_typed("decimals", vec![]).await?;
        Ok(value as u8)
    }

    pub async fn delegate(&self, delegatee: Address) -> Result<TransactionReceipt> {
        self.binding
            .send("delegate", vec![Token::Address(delegatee)])
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn delegate_by_sig(
        &self,
        delegatee: Address,
        nonce: U256,
        expiry: U256,
        v: u8,
        r: H256,
        s: H256,
    ) -> Result<TransactionReceipt> {
        self.binding
            .send(
                "delegateBySig",
                vec![
                    Token::Address(delegatee),
                    Token::Uint(nonce),
                    Token::Uint(expiry),
                    Token::Uint(v.into()),
                    Token::FixedBytes(r.as_bytes().to_vec()),
                    Token::FixedBytes(s.as_bytes().to_vec()),
                ],
            )
            .await
    }

    pub async fn delegates(&self, account: Address) -> Result<Address> {
        self.binding
            .call_typed("delegates", vec![Token::Address(account)])
            .await
    }

    pub async fn eip712_domain(&self) -> Result<Eip712Domain> {
        let (fields, name, version, chain_id, verifying_contract, salt, extensions) = self
            .binding
            .call_typed("eip712Domain", vec![])
            .await?;
        Ok(Eip712Domain {
            fields,
            name,
            version,
            chain_id,
            verifying_contract,
            salt,
            extensions,
        })
    }

    pub async fn get_past_total_supply(&self, timepoint: U256) -> Result<U256> {
        self.binding
            .call_typed("getPastTotalSupply", vec![Token::Uint(timepoint)])
            .await
    }

    pub async fn get_past_votes(&self, account: Address, timepoint: U256) -> Result<U256> {
        self.binding
            .call_typed(
                "getPastVotes",
                vec![Token::Address(account), Token::Uint(timepoint)],
            )
            .await
    }

    pub async fn get_votes(&self, account: Address) -> Result<U256> {
        self.binding
            .call_typed("getVotes", vec![Token::Address(account)])
            .await
    }

    pub async fn mint(&self, to: Address, amount: U256) -> Result<TransactionReceipt> {
        self.binding
            .send("mint", vec![Token::Address(to), Token::Uint(amount)])
            .await
    }

    pub async fn name(&self) -> Result<String> {
        self.binding.call_typed("name", vec![]).await
    }

    pub async fn nonces(&self, owner: Address) -> Result<U256> {
        self.binding
            .call_typed("nonces", vec![Token::Address(owner)])
            .await
    }

    pub async fn num_checkpoints(&self, account: Address) -> Result<u32> {
        self.binding
            .call_typed("numCheckpoints", vec![Token::Address(account)])
            .await
    }

    pub async fn owner(&self) -> Result<Address> {
        self.binding.call_typed("owner", vec![]).await
    }

    pub async fn pause(&self) -> Result<TransactionReceipt> {
        self.binding.send("pause", vec![]).await
    }

    pub async fn paused(&self) -> Result<bool> {
        self.binding.call_typed("paused", vec![]).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn permit(
        &self,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: U256,
        v: u8,
        r: H256,
        s: H256,
    ) -> Result<TransactionReceipt> {
        self.binding
            .send(
                "permit",
                vec![
                    Token::Address(owner),
                    Token::Address(spender),
                    Token::Uint(value),
                    Token::Uint(deadline),
                    Token::Uint(v.into()),
                    Token::FixedBytes(r.as_bytes().to_vec()),
                    Token::FixedBytes(s.as_bytes().to_vec()),
                ],
            )
            .await
    }

    pub async fn renounce_ownership(&self) -> Result<TransactionReceipt> {
        self.binding.send("renounceOwnership", vec![]).await
    }

    /// The mint cap; `s_maxSupply` in the contract's storage naming
    pub async fn max_supply(&self) -> Result<U256> {
        self.binding.call_typed("s_maxSupply", vec![]).await
    }

    pub async fn symbol(&self) -> Result<String> {
        self.binding.call_typed("symbol", vec![]).await
    }

    pub async fn total_supply(&self) -> Result<U256> {
        self.binding.call_typed("totalSupply", vec![]).await
    }

    pub async fn transfer(&self, to: Address, value: U256) -> Result<TransactionReceipt> {
        self.binding
            .send("transfer", vec![Token::Address(to), Token::Uint(value)])
            .await
    }

    pub async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<TransactionReceipt> {
        self.binding
            .send(
                "transferFrom",
                vec![
                    Token::Address(from),
                    Token::Address(to),
                    Token::Uint(value),
                ],
            )
            .await
    }

    pub async fn transfer_ownership(&self, new_owner: Address) -> Result<TransactionReceipt> {
        self.binding
            .send("transferOwnership", vec![Token::Address(new_owner)])
            .await
    }

    pub async fn unpause(&self) -> Result<TransactionReceipt> {
        self.binding.send("unpause", vec![]).await
    }
}

event_record! {
    /// `Approval(address indexed owner, address indexed spender, uint256 value)`
    ApprovalEvent from "Approval" {
        owner: Address = "owner",
        spender: Address = "spender",
        value: U256 = "value",
    }
}

event_record! {
    /// `DelegateChanged(address indexed delegator, address indexed fromDelegate, address indexed toDelegate)`
    DelegateChangedEvent from "DelegateChanged" {
        delegator: Address = "delegator",
        from_delegate: Address = "fromDelegate",
        to_delegate: Address = "toDelegate",
    }
}

event_record! {
    /// `DelegateVotesChanged(address indexed delegate, uint256 previousVotes, uint256 newVotes)`
    DelegateVotesChangedEvent from "DelegateVotesChanged" {
        delegate: Address = "delegate",
        previous_votes: U256 = "previousVotes",
        new_votes: U256 = "newVotes",
    }
}

event_record! {
    /// `EIP712DomainChanged()` carries no fields
    Eip712DomainChangedEvent from "EIP712DomainChanged" {}
}

event_record! {
    /// `OwnershipTransferred(address indexed previousOwner, address indexed newOwner)`
    OwnershipTransferredEvent from "OwnershipTransferred" {
        previous_owner: Address = "previousOwner",
        new_owner: Address = "newOwner",
    }
}

event_record! {
    /// `Paused(address account)`
    PausedEvent from "Paused" {
        account: Address = "account",
    }
}

event_record! {
    /// `Transfer(address indexed from, address indexed to, uint256 value)`
    TransferEvent from "Transfer" {
        from: Address = "from",
        to: Address = "to",
        value: U256 = "value",
    }
}

event_record! {
    /// `Unpaused(address account)`
    UnpausedEvent from "Unpaused" {
        account: Address = "account",
    }
}

event_api! {
    GovernanceToken {
        "Approval" => ApprovalEvent {
            receipt: approval_events,
            log: approval_from_log,
            filter: approval_filter,
            stream: approval_stream,
            range: approval_stream_in_range,
        },
        "DelegateChanged" => DelegateChangedEvent {
            receipt: delegate_changed_events,
            log: delegate_changed_from_log,
            filter: delegate_changed_filter,
            stream: delegate_changed_stream,
            range: delegate_changed_stream_in_range,
        },
        "DelegateVotesChanged" => DelegateVotesChangedEvent {
            receipt: delegate_votes_changed_events,
            log: delegate_votes_changed_from_log,
            filter: delegate_votes_changed_filter,
            stream: delegate_votes_changed_stream,
            range: delegate_votes_changed_stream_in_range,
        },
        "EIP712DomainChanged" => Eip712DomainChangedEvent {
            receipt: eip712_domain_changed_events,
            log: eip712_domain_changed_from_log,
            filter: eip712_domain_changed_filter,
            stream: eip712_domain_changed_stream,
            range: eip712_domain_changed_stream_in_range,
        },
        "OwnershipTransferred" => OwnershipTransferredEvent {
            receipt: ownership_transferred_events,
            log: ownership_transferred_from_log,
            filter: ownership_transferred_filter,
            stream: ownership_transferred_stream,
            range: ownership_transferred_stream_in_range,
        },
        "Paused" => PausedEvent {
            receipt: paused_events,
            log: paused_from_log,
            filter: paused_filter,
            stream: paused_stream,
            range: paused_stream_in_range,
        },
        "Transfer" => TransferEvent {
            receipt: transfer_events,
            log: transfer_from_log,
            filter: transfer_filter,
            stream: transfer_stream,
            range: transfer_stream_in_range,
        },
        "Unpaused" => UnpausedEvent {
            receipt: unpaused_events,
            log: unpaused_from_log,
            filter: unpaused_filter,
            stream: unpaused_stream,
            range: unpaused_stream_in_range,
        },
    }
}
