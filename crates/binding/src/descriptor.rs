//! Static contract descriptors
//!
//! A descriptor describes one function, event, or struct shape of a contract
//! interface, independent of any deployed address. Descriptor sets are built
//! once, compiled into the binding, and never mutated at runtime; a malformed
//! descriptor is a build-time defect, not a runtime failure.

use ethers::abi::ParamType;
use ethers::types::H256;
use ethers::utils::keccak256;

/// Mutability class of a contract function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// View or pure function, dispatched through the read path
    ReadOnly,
    /// State-changing function, submitted as a transaction
    Mutating,
    /// State-changing function that also accepts an attached value
    Payable,
}

/// Shape of one callable contract function
#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    name: &'static str,
    inputs: Vec<ParamType>,
    outputs: Vec<ParamType>,
    mutability: Mutability,
}

impl FunctionDescriptor {
    /// Describe a view/pure function
    pub fn read_only(
        name: &'static str,
        inputs: Vec<ParamType>,
        outputs: Vec<ParamType>,
    ) -> Self {
        Self {
            name,
            inputs,
            outputs,
            mutability: Mutability::ReadOnly,
        }
    }

    /// Describe a state-mutating function. Transaction wrappers surface the
    /// receipt rather than return data, so no outputs are declared.
    pub fn mutating(name: &'static str, inputs: Vec<ParamType>) -> Self {
        Self {
            name,
            inputs,
            outputs: Vec::new(),
            mutability: Mutability::Mutating,
        }
    }

    /// Describe a payable function
    pub fn payable(name: &'static str, inputs: Vec<ParamType>) -> Self {
        Self {
            name,
            inputs,
            outputs: Vec::new(),
            mutability: Mutability::Payable,
        }
    }

    /// Function name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ordered input parameter types
    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    /// Ordered output parameter types
    pub fn outputs(&self) -> &[ParamType] {
        &self.outputs
    }

    /// Mutability class
    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    /// Canonical ABI signature, e.g. `balanceOf(address)`
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(canonical_type).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// Four-byte call selector derived from the canonical signature
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }
}

/// One declared event field
#[derive(Debug, Clone)]
pub struct EventField {
    name: &'static str,
    kind: ParamType,
    indexed: bool,
}

impl EventField {
    /// An indexed field, matched against log topics in declaration order
    pub fn indexed(name: &'static str, kind: ParamType) -> Self {
        Self {
            name,
            kind,
            indexed: true,
        }
    }

    /// A non-indexed field, decoded from the log data payload
    pub fn unindexed(name: &'static str, kind: ParamType) -> Self {
        Self {
            name,
            kind,
            indexed: false,
        }
    }

    /// Field name as declared in the contract interface
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Field type tag
    pub fn kind(&self) -> &ParamType {
        &self.kind
    }

    /// Whether the field is matched against a log topic
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }
}

/// Shape of one contract event. Anonymous events are not modeled; dispatch
/// always goes through the signature hash in the log's first topic.
#[derive(Debug, Clone)]
pub struct EventDescriptor {
    name: &'static str,
    fields: Vec<EventField>,
    topic: H256,
}

impl EventDescriptor {
    /// Build an event descriptor; the signature topic is fixed here
    pub fn new(name: &'static str, fields: Vec<EventField>) -> Self {
        let types: Vec<String> = fields.iter().map(|f| canonical_type(f.kind())).collect();
        let signature = format!("{}({})", name, types.join(","));
        let topic = H256::from(keccak256(signature.as_bytes()));
        Self {
            name,
            fields,
            topic,
        }
    }

    /// Event name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared fields, in declaration order
    pub fn fields(&self) -> &[EventField] {
        &self.fields
    }

    /// Canonical ABI signature, e.g. `Transfer(address,address,uint256)`
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.fields.iter().map(|f| canonical_type(f.kind())).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// Keccak-256 hash of the canonical signature; a log's first topic
    pub fn topic(&self) -> H256 {
        self.topic
    }

    /// Number of indexed fields
    pub fn indexed_count(&self) -> usize {
        self.fields.iter().filter(|f| f.is_indexed()).count()
    }
}

/// Fixed-layout tuple return value with named fields
#[derive(Debug, Clone)]
pub struct StructDescriptor {
    name: &'static str,
    fields: Vec<(&'static str, ParamType)>,
}

impl StructDescriptor {
    /// Build a struct descriptor from ordered (field name, type tag) pairs
    pub fn new(name: &'static str, fields: Vec<(&'static str, ParamType)>) -> Self {
        Self { name, fields }
    }

    /// Struct name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ordered field layout
    pub fn fields(&self) -> &[(&'static str, ParamType)] {
        &self.fields
    }

    /// The tuple type tag this struct occupies on the wire
    pub fn param_type(&self) -> ParamType {
        ParamType::Tuple(self.fields.iter().map(|(_, kind)| kind.clone()).collect())
    }
}

/// The full descriptor set for one contract interface, keyed by name.
///
/// Lookup sets are small and fixed, so plain ordered scans are used; the
/// declaration order is preserved for diagnostics.
#[derive(Debug, Clone)]
pub struct ContractDescriptor {
    name: &'static str,
    functions: Vec<FunctionDescriptor>,
    events: Vec<EventDescriptor>,
    structs: Vec<StructDescriptor>,
}

impl ContractDescriptor {
    /// Assemble the descriptor set for one contract
    pub fn new(
        name: &'static str,
        functions: Vec<FunctionDescriptor>,
        events: Vec<EventDescriptor>,
        structs: Vec<StructDescriptor>,
    ) -> Self {
        debug_assert!(
            functions
                .iter()
                .enumerate()
                .all(|(i, f)| functions[..i].iter().all(|g| g.name() != f.name())),
            "duplicate function descriptor"
        );
        debug_assert!(
            events
                .iter()
                .enumerate()
                .all(|(i, e)| events[..i].iter().all(|f| f.topic() != e.topic())),
            "duplicate event descriptor"
        );
        Self {
            name,
            functions,
            events,
            structs,
        }
    }

    /// Contract name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up a function descriptor by name
    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.iter().find(|f| f.name() == name)
    }

    /// Look up an event descriptor by name
    pub fn event(&self, name: &str) -> Option<&EventDescriptor> {
        self.events.iter().find(|e| e.name() == name)
    }

    /// Select the event descriptor whose signature hash matches a log topic
    pub fn event_for_topic(&self, topic: H256) -> Option<&EventDescriptor> {
        self.events.iter().find(|e| e.topic() == topic)
    }

    /// Look up a struct descriptor by name
    pub fn struct_descriptor(&self, name: &str) -> Option<&StructDescriptor> {
        self.structs.iter().find(|s| s.name() == name)
    }

    /// All declared events
    pub fn events(&self) -> &[EventDescriptor] {
        &self.events
    }

    /// All declared functions
    pub fn functions(&self) -> &[FunctionDescriptor] {
        &self.functions
    }
}

/// Convert a type tag to its canonical ABI form
pub(crate) fn canonical_type(kind: &ParamType) -> String {
    match kind {
        ParamType::Address => "address".to_string(),
        ParamType::Bytes => "bytes".to_string(),
        ParamType::Int(size) => format!("int{}", size),
        ParamType::Uint(size) => format!("uint{}", size),
        ParamType::Bool => "bool".to_string(),
        ParamType::String => "string".to_string(),
        ParamType::FixedBytes(size) => format!("bytes{}", size),
        ParamType::Array(inner) => format!("{}[]", canonical_type(inner)),
        ParamType::FixedArray(inner, size) => format!("{}[{}]", canonical_type(inner), size),
        ParamType::Tuple(inner) => {
            let types: Vec<String> = inner.iter().map(canonical_type).collect();
            format!("({})", types.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_selector_matches_known_value() {
        let balance_of = FunctionDescriptor::read_only(
            "balanceOf",
            vec![ParamType::Address],
            vec![ParamType::Uint(256)],
        );
        assert_eq!(balance_of.signature(), "balanceOf(address)");
        assert_eq!(balance_of.selector(), [0x70, 0xa0, 0x82, 0x31]);

        let transfer = FunctionDescriptor::mutating(
            "transfer",
            vec![ParamType::Address, ParamType::Uint(256)],
        );
        assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn event_topic_matches_known_value() {
        let transfer = EventDescriptor::new(
            "Transfer",
            vec![
                EventField::indexed("from", ParamType::Address),
                EventField::indexed("to", ParamType::Address),
                EventField::unindexed("value", ParamType::Uint(256)),
            ],
        );
        assert_eq!(transfer.signature(), "Transfer(address,address,uint256)");
        let expected: H256 = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
            .parse()
            .unwrap();
        assert_eq!(transfer.topic(), expected);
        assert_eq!(transfer.indexed_count(), 2);
    }

    #[test]
    fn canonical_types_cover_nested_shapes() {
        assert_eq!(
            canonical_type(&ParamType::Array(Box::new(ParamType::Uint(256)))),
            "uint256[]"
        );
        assert_eq!(
            canonical_type(&ParamType::FixedArray(Box::new(ParamType::Bytes), 4)),
            "bytes[4]"
        );
        assert_eq!(
            canonical_type(&ParamType::Tuple(vec![
                ParamType::Uint(48),
                ParamType::Uint(208)
            ])),
            "(uint48,uint208)"
        );
    }

    #[test]
    fn registry_lookup_by_name_and_topic() {
        let descriptor = ContractDescriptor::new(
            "Token",
            vec![FunctionDescriptor::read_only(
                "totalSupply",
                vec![],
                vec![ParamType::Uint(256)],
            )],
            vec![EventDescriptor::new(
                "Paused",
                vec![EventField::unindexed("account", ParamType::Address)],
            )],
            vec![StructDescriptor::new(
                "Checkpoint",
                vec![("key", ParamType::Uint(48)), ("value", ParamType::Uint(208))],
            )],
        );

        assert!(descriptor.function("totalSupply").is_some());
        assert!(descriptor.function("balanceOf").is_none());
        let paused = descriptor.event("Paused").unwrap();
        assert_eq!(
            descriptor.event_for_topic(paused.topic()).unwrap().name(),
            "Paused"
        );
        assert!(descriptor.event_for_topic(H256::zero()).is_none());
        assert_eq!(
            descriptor.struct_descriptor("Checkpoint").unwrap().param_type(),
            ParamType::Tuple(vec![ParamType::Uint(48), ParamType::Uint(208)])
        );
    }
}
