//! Minimal ABI encoding and decoding.
//!
//! Just enough of the contract ABI to build call data and signature
//! wrappers: static words (address, uint256, bytes32), dynamic `bytes`, and
//! tuples of those, laid out with the standard head/tail scheme.

use alloy_primitives::{Address, B256, U256};

use crate::error::EvmError;

/// Size of one ABI word.
pub const WORD: usize = 32;

/// A single ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiToken {
    /// A 20-byte address, left-padded to 32 bytes.
    Address(Address),
    /// A 256-bit unsigned integer.
    Uint(U256),
    /// A `bytes32` word.
    FixedBytes(B256),
    /// Dynamic `bytes`: length word followed by right-padded data.
    Bytes(Vec<u8>),
    /// A tuple (struct). Dynamic if any member is dynamic.
    Tuple(Vec<AbiToken>),
}

/// The shape of an ABI value, used to drive decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiKind {
    Address,
    Uint,
    FixedBytes,
    Bytes,
    Tuple(Vec<AbiKind>),
}

impl AbiToken {
    fn is_dynamic(&self) -> bool {
        match self {
            AbiToken::Bytes(_) => true,
            AbiToken::Tuple(members) => members.iter().any(AbiToken::is_dynamic),
            _ => false,
        }
    }

    /// Bytes this token occupies in the head section of its enclosing tuple.
    fn head_size(&self) -> usize {
        match self {
            AbiToken::Tuple(members) if !self.is_dynamic() => {
                members.iter().map(AbiToken::head_size).sum()
            }
            _ => WORD,
        }
    }
}

impl AbiKind {
    fn is_dynamic(&self) -> bool {
        match self {
            AbiKind::Bytes => true,
            AbiKind::Tuple(members) => members.iter().any(AbiKind::is_dynamic),
            _ => false,
        }
    }

    fn head_size(&self) -> usize {
        match self {
            AbiKind::Tuple(members) if !self.is_dynamic() => {
                members.iter().map(AbiKind::head_size).sum()
            }
            _ => WORD,
        }
    }
}

/// Encodes a sequence of tokens as `abi.encode(tokens...)`.
pub fn encode(tokens: &[AbiToken]) -> Vec<u8> {
    let head_len: usize = tokens.iter().map(AbiToken::head_size).sum();

    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            // Offsets are relative to the start of the enclosing tuple.
            head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
            encode_dynamic(token, &mut tail);
        } else {
            encode_static(token, &mut head);
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Encodes a function call: `selector || abi.encode(params...)`.
///
/// - `selector`: the 4-byte function selector (e.g. `0x1626ba7e` for
///   ERC-1271 `isValidSignature`).
/// - `params`: the call arguments.
pub fn encode_function_call(selector: [u8; 4], params: &[AbiToken]) -> Vec<u8> {
    let encoded = encode(params);
    let mut data = Vec::with_capacity(4 + encoded.len());
    data.extend_from_slice(&selector);
    data.extend_from_slice(&encoded);
    data
}

fn encode_static(token: &AbiToken, out: &mut Vec<u8>) {
    match token {
        AbiToken::Address(addr) => {
            // Left-pad: 12 zero bytes + 20 address bytes.
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(addr.as_slice());
            out.extend_from_slice(&word);
        }
        AbiToken::Uint(value) => out.extend_from_slice(&uint_word(*value)),
        AbiToken::FixedBytes(value) => out.extend_from_slice(value.as_slice()),
        AbiToken::Tuple(members) => {
            for member in members {
                encode_static(member, out);
            }
        }
        AbiToken::Bytes(_) => unreachable!("dynamic token in static position"),
    }
}

fn encode_dynamic(token: &AbiToken, out: &mut Vec<u8>) {
    match token {
        AbiToken::Bytes(data) => {
            out.extend_from_slice(&uint_word(U256::from(data.len())));
            out.extend_from_slice(data);
            // Right-pad to a word boundary.
            let padding = (WORD - data.len() % WORD) % WORD;
            out.resize(out.len() + padding, 0);
        }
        AbiToken::Tuple(members) => out.extend_from_slice(&encode(members)),
        _ => encode_static(token, out),
    }
}

fn uint_word(value: U256) -> [u8; WORD] {
    value.to_be_bytes::<WORD>()
}

/// Decodes `abi.encode(...)` output according to `kinds`.
///
/// Rejects truncated input, offsets that point outside the data, and
/// address words with non-zero padding.
pub fn decode(data: &[u8], kinds: &[AbiKind]) -> Result<Vec<AbiToken>, EvmError> {
    let mut head_offset = 0;
    let mut tokens = Vec::with_capacity(kinds.len());

    for kind in kinds {
        let token = if kind.is_dynamic() {
            let tail_offset = read_usize(data, head_offset)?;
            let region = data.get(tail_offset..).ok_or_else(|| {
                EvmError::EncodingError(format!("offset {tail_offset} out of bounds"))
            })?;
            decode_dynamic(region, kind)?
        } else {
            decode_static(data, head_offset, kind)?
        };
        head_offset += kind.head_size();
        tokens.push(token);
    }

    Ok(tokens)
}

fn decode_static(data: &[u8], offset: usize, kind: &AbiKind) -> Result<AbiToken, EvmError> {
    match kind {
        AbiKind::Address => {
            let word = read_word(data, offset)?;
            if word[..12].iter().any(|b| *b != 0) {
                return Err(EvmError::EncodingError(
                    "address word has non-zero padding".into(),
                ));
            }
            Ok(AbiToken::Address(Address::from_slice(&word[12..])))
        }
        AbiKind::Uint => Ok(AbiToken::Uint(U256::from_be_slice(read_word(data, offset)?))),
        AbiKind::FixedBytes => Ok(AbiToken::FixedBytes(B256::from_slice(read_word(
            data, offset,
        )?))),
        AbiKind::Tuple(members) => {
            let region = data.get(offset..).ok_or_else(|| {
                EvmError::EncodingError(format!("offset {offset} out of bounds"))
            })?;
            Ok(AbiToken::Tuple(decode(region, members)?))
        }
        AbiKind::Bytes => Err(EvmError::EncodingError(
            "dynamic kind in static position".into(),
        )),
    }
}

fn decode_dynamic(region: &[u8], kind: &AbiKind) -> Result<AbiToken, EvmError> {
    match kind {
        AbiKind::Bytes => {
            let len = read_usize(region, 0)?;
            let end = WORD.checked_add(len).ok_or_else(|| {
                EvmError::EncodingError(format!("bytes length {len} overflows"))
            })?;
            let bytes = region.get(WORD..end).ok_or_else(|| {
                EvmError::EncodingError(format!("bytes length {len} exceeds data"))
            })?;
            Ok(AbiToken::Bytes(bytes.to_vec()))
        }
        AbiKind::Tuple(members) => Ok(AbiToken::Tuple(decode(region, members)?)),
        _ => decode_static(region, 0, kind),
    }
}

fn read_word(data: &[u8], offset: usize) -> Result<&[u8], EvmError> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| EvmError::EncodingError(format!("word at offset {offset} is truncated")))
}

fn read_usize(data: &[u8], offset: usize) -> Result<usize, EvmError> {
    let value = U256::from_be_slice(read_word(data, offset)?);
    let limbs = value.as_limbs();
    if limbs[1..].iter().any(|limb| *limb != 0) || limbs[0] > usize::MAX as u64 {
        return Err(EvmError::EncodingError(format!(
            "value {value} does not fit in usize"
        )));
    }
    Ok(limbs[0] as usize)
}
