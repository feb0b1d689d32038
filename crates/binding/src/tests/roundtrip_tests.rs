use ethers::abi::{self, ParamType, Token};
use ethers::types::{Address, U256};

/// Encode one value as a call argument tuple and decode it back
fn roundtrip(kind: ParamType, token: Token) {
    let encoded = abi::encode(std::slice::from_ref(&token));
    let decoded = abi::decode(&[kind.clone()], &encoded)
        .unwrap_or_else(|e| panic!("decode failed for {:?}: {}", kind, e));
    assert_eq!(decoded, vec![token], "round-trip mismatch for {:?}", kind);
}

#[test]
fn booleans_round_trip() {
    roundtrip(ParamType::Bool, Token::Bool(true));
    roundtrip(ParamType::Bool, Token::Bool(false));
}

#[test]
fn unsigned_widths_round_trip() {
    for bits in [8usize, 32, 48, 208, 256] {
        let max = if bits == 256 {
            U256::MAX
        } else {
            (U256::one() << bits) - 1
        };
        roundtrip(ParamType::Uint(bits), Token::Uint(max));
        roundtrip(ParamType::Uint(bits), Token::Uint(U256::zero()));
    }
}

#[test]
fn signed_values_round_trip() {
    // -1 in two's complement
    roundtrip(ParamType::Int(256), Token::Int(U256::MAX));
    roundtrip(ParamType::Int(256), Token::Int(U256::from(42)));
}

#[test]
fn addresses_round_trip() {
    roundtrip(
        ParamType::Address,
        Token::Address(Address::repeat_byte(0xbb)),
    );
}

#[test]
fn byte_shapes_round_trip() {
    roundtrip(ParamType::FixedBytes(1), Token::FixedBytes(vec![0x7f]));
    roundtrip(ParamType::FixedBytes(32), Token::FixedBytes(vec![0xab; 32]));
    roundtrip(ParamType::Bytes, Token::Bytes(vec![1, 2, 3, 4, 5]));
    roundtrip(ParamType::Bytes, Token::Bytes(Vec::new()));
}

#[test]
fn strings_round_trip() {
    roundtrip(ParamType::String, Token::String("delegate".to_string()));
    roundtrip(ParamType::String, Token::String(String::new()));
}

#[test]
fn dynamic_arrays_round_trip() {
    roundtrip(
        ParamType::Array(Box::new(ParamType::Uint(256))),
        Token::Array(vec![
            Token::Uint(1.into()),
            Token::Uint(2.into()),
            Token::Uint(3.into()),
        ]),
    );
    roundtrip(
        ParamType::Array(Box::new(ParamType::Address)),
        Token::Array(Vec::new()),
    );
}

#[test]
fn tuples_round_trip() {
    // The checkpoint layout: (uint48 key, uint208 value)
    roundtrip(
        ParamType::Tuple(vec![ParamType::Uint(48), ParamType::Uint(208)]),
        Token::Tuple(vec![
            Token::Uint(1_700_000_000u64.into()),
            Token::Uint(123_456u64.into()),
        ]),
    );
}
