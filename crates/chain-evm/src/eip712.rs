//! EIP-712 typed structured data.
//!
//! [`TypedData`] is the validated form of the standard EIP-712 JSON object
//! (`domain`, `types`, `primaryType`, `message`). Every message value is
//! resolved against its declared type when the value is constructed, so a
//! `TypedData` that exists can always be hashed:
//!
//! ```text
//! signing_hash = keccak256(0x19 || 0x01 || domainSeparator || hashStruct(message))
//! ```

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::{Address, B256, I256, U256};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sha3::{Digest, Keccak256};

use crate::address::{checksum_address, parse_address};
use crate::error::EvmError;

/// Name of the implicit domain struct.
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";

fn keccak256(data: impl AsRef<[u8]>) -> B256 {
    B256::from_slice(&Keccak256::digest(data.as_ref()))
}

fn malformed(msg: impl Into<String>) -> EvmError {
    EvmError::MalformedTypedData(msg.into())
}

/// A `{name, type}` member of a struct definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl TypedDataField {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// The EIP-712 domain. Only populated fields take part in the domain type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Declared as `uint256` by EIP-712, held as `u64`. A chain ID above
    /// `u64::MAX` is rejected as malformed typed data.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_chain_id"
    )]
    pub chain_id: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_address"
    )]
    pub verifying_contract: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<B256>,
}

impl TypedDataDomain {
    /// The `EIP712Domain` fields implied by the populated domain values, in
    /// canonical order.
    pub fn fields(&self) -> Vec<TypedDataField> {
        let mut fields = Vec::with_capacity(5);
        if self.name.is_some() {
            fields.push(TypedDataField::new("name", "string"));
        }
        if self.version.is_some() {
            fields.push(TypedDataField::new("version", "string"));
        }
        if self.chain_id.is_some() {
            fields.push(TypedDataField::new("chainId", "uint256"));
        }
        if self.verifying_contract.is_some() {
            fields.push(TypedDataField::new("verifyingContract", "address"));
        }
        if self.salt.is_some() {
            fields.push(TypedDataField::new("salt", "bytes32"));
        }
        fields
    }

    /// `hashStruct(EIP712Domain, domain)`.
    pub fn separator(&self) -> B256 {
        let fields = self.fields();

        let mut buf = Vec::with_capacity((1 + fields.len()) * 32);
        let type_hash = keccak256(encode_type_string(EIP712_DOMAIN_TYPE, &fields));
        buf.extend_from_slice(type_hash.as_slice());

        if let Some(name) = &self.name {
            buf.extend_from_slice(keccak256(name.as_bytes()).as_slice());
        }
        if let Some(version) = &self.version {
            buf.extend_from_slice(keccak256(version.as_bytes()).as_slice());
        }
        if let Some(chain_id) = self.chain_id {
            buf.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
        }
        if let Some(contract) = &self.verifying_contract {
            buf.extend_from_slice(&address_word(contract));
        }
        if let Some(salt) = &self.salt {
            buf.extend_from_slice(salt.as_slice());
        }

        keccak256(&buf)
    }
}

/// A message value resolved against its declared EIP-712 type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eip712Value {
    Bool(bool),
    Uint(U256),
    Int(I256),
    Address(Address),
    /// `bytes1`..`bytes32`; length equals the declared width.
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Eip712Value>),
    /// Struct members in declaration order.
    Struct(Vec<(String, Eip712Value)>),
}

impl Eip712Value {
    /// The standard JSON representation: integers as decimal strings,
    /// checksummed addresses, and 0x-prefixed hex for byte strings.
    pub fn to_json(&self) -> Value {
        match self {
            Eip712Value::Bool(b) => Value::Bool(*b),
            Eip712Value::Uint(n) => Value::String(n.to_string()),
            Eip712Value::Int(n) => Value::String(n.to_string()),
            Eip712Value::Address(addr) => Value::String(checksum_address(addr)),
            Eip712Value::FixedBytes(bytes) | Eip712Value::Bytes(bytes) => {
                Value::String(format!("0x{}", hex::encode(bytes)))
            }
            Eip712Value::String(s) => Value::String(s.clone()),
            Eip712Value::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Eip712Value::Struct(members) => Value::Object(
                members
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

/// A validated EIP-712 typed-data message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTypedData", into = "RawTypedData")]
pub struct TypedData {
    domain: TypedDataDomain,
    types: BTreeMap<String, Vec<TypedDataField>>,
    primary_type: String,
    message: Vec<(String, Eip712Value)>,
}

impl TypedData {
    /// Validates `types` and resolves `message` (a JSON object) against
    /// `primary_type`.
    ///
    /// Fails with [`EvmError::MalformedTypedData`] when the primary type or
    /// any referenced type is undefined, a message field is missing, or a
    /// value does not encode under its declared type.
    pub fn new(
        domain: TypedDataDomain,
        types: BTreeMap<String, Vec<TypedDataField>>,
        primary_type: impl Into<String>,
        message: &Value,
    ) -> Result<Self, EvmError> {
        let primary_type = primary_type.into();

        if !types.contains_key(&primary_type) {
            return Err(malformed(format!(
                "primary type `{primary_type}` is not defined in types"
            )));
        }

        for (type_name, fields) in &types {
            for field in fields {
                if !is_known_type(&types, &field.ty) {
                    return Err(malformed(format!(
                        "field `{type_name}.{}` has undefined type `{}`",
                        field.name, field.ty
                    )));
                }
            }
        }

        let message = match resolve_value(&types, &primary_type, message, &primary_type)? {
            Eip712Value::Struct(members) => members,
            _ => {
                return Err(malformed(format!(
                    "primary type `{primary_type}` must be a struct"
                )))
            }
        };

        Ok(Self {
            domain,
            types,
            primary_type,
            message,
        })
    }

    pub fn domain(&self) -> &TypedDataDomain {
        &self.domain
    }

    pub fn types(&self) -> &BTreeMap<String, Vec<TypedDataField>> {
        &self.types
    }

    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    /// Message members in the primary type's declaration order.
    pub fn message(&self) -> &[(String, Eip712Value)] {
        &self.message
    }

    /// Looks up a top-level message member by name.
    pub fn message_field(&self, name: &str) -> Option<&Eip712Value> {
        self.message
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// `encodeType(primaryType)`: the primary struct followed by every
    /// referenced struct, sorted by name.
    pub fn encode_type(&self, type_name: &str) -> String {
        encode_type(&self.types, type_name)
    }

    /// `hashStruct(primaryType, message)`.
    pub fn struct_hash(&self) -> B256 {
        hash_struct(&self.types, &self.primary_type, &self.message)
    }

    /// The EIP-712 digest that gets signed.
    pub fn signing_hash(&self) -> B256 {
        let mut buf = Vec::with_capacity(2 + 32 + 32);
        buf.extend_from_slice(&[0x19, 0x01]);
        buf.extend_from_slice(self.domain.separator().as_slice());
        if self.primary_type != EIP712_DOMAIN_TYPE {
            buf.extend_from_slice(self.struct_hash().as_slice());
        }
        keccak256(&buf)
    }
}

/// Computes the EIP-712 signing hash of `typed_data`.
pub fn hash_typed_data(typed_data: &TypedData) -> B256 {
    typed_data.signing_hash()
}

impl TryFrom<Value> for TypedData {
    type Error = EvmError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let raw: RawTypedData =
            serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
        raw.try_into()
    }
}

impl std::str::FromStr for TypedData {
    type Err = EvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: RawTypedData = serde_json::from_str(s).map_err(|e| malformed(e.to_string()))?;
        raw.try_into()
    }
}

/// The unvalidated wire shape of typed data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypedData {
    domain: TypedDataDomain,
    types: BTreeMap<String, Vec<TypedDataField>>,
    primary_type: String,
    message: Value,
}

impl TryFrom<RawTypedData> for TypedData {
    type Error = EvmError;

    fn try_from(raw: RawTypedData) -> Result<Self, Self::Error> {
        TypedData::new(raw.domain, raw.types, raw.primary_type, &raw.message)
    }
}

impl From<TypedData> for RawTypedData {
    fn from(typed: TypedData) -> Self {
        let message = Eip712Value::Struct(typed.message).to_json();
        RawTypedData {
            domain: typed.domain,
            types: typed.types,
            primary_type: typed.primary_type,
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// Type strings
// ---------------------------------------------------------------------------

/// Strips every array suffix: `Person[2][]` -> `Person`.
fn base_type(ty: &str) -> &str {
    ty.split('[').next().unwrap_or(ty)
}

/// Splits the outermost array suffix: `uint8[3][]` -> (`uint8[3]`, None).
fn split_array(ty: &str) -> Option<(&str, Option<&str>)> {
    let inner = ty.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let len = &inner[open + 1..];
    Some((&inner[..open], if len.is_empty() { None } else { Some(len) }))
}

fn is_known_type(types: &BTreeMap<String, Vec<TypedDataField>>, ty: &str) -> bool {
    if let Some((element, len)) = split_array(ty) {
        let len_ok = len.map_or(true, |n| n.parse::<usize>().is_ok());
        return len_ok && is_known_type(types, element);
    }
    types.contains_key(ty) || atomic_kind(ty).is_some()
}

fn encode_type_string(type_name: &str, fields: &[TypedDataField]) -> String {
    let members: Vec<String> = fields
        .iter()
        .map(|field| format!("{} {}", field.ty, field.name))
        .collect();
    format!("{type_name}({})", members.join(","))
}

fn collect_dependencies(
    types: &BTreeMap<String, Vec<TypedDataField>>,
    type_name: &str,
    found: &mut BTreeSet<String>,
) {
    if !found.insert(type_name.to_string()) {
        return;
    }
    if let Some(fields) = types.get(type_name) {
        for field in fields {
            let base = base_type(&field.ty);
            if types.contains_key(base) {
                collect_dependencies(types, base, found);
            }
        }
    }
}

fn encode_type(types: &BTreeMap<String, Vec<TypedDataField>>, type_name: &str) -> String {
    let mut deps = BTreeSet::new();
    collect_dependencies(types, type_name, &mut deps);
    deps.remove(type_name);

    let mut encoded = String::new();
    for name in std::iter::once(type_name).chain(deps.iter().map(String::as_str)) {
        if let Some(fields) = types.get(name) {
            encoded.push_str(&encode_type_string(name, fields));
        }
    }
    encoded
}

fn type_hash(types: &BTreeMap<String, Vec<TypedDataField>>, type_name: &str) -> B256 {
    keccak256(encode_type(types, type_name).as_bytes())
}

// ---------------------------------------------------------------------------
// Value resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AtomicKind {
    Bool,
    Address,
    String,
    Bytes,
    FixedBytes(usize),
    Uint(usize),
    Int(usize),
}

fn atomic_kind(ty: &str) -> Option<AtomicKind> {
    match ty {
        "bool" => return Some(AtomicKind::Bool),
        "address" => return Some(AtomicKind::Address),
        "string" => return Some(AtomicKind::String),
        "bytes" => return Some(AtomicKind::Bytes),
        _ => {}
    }

    let width = |digits: &str, max: usize, step: usize| -> Option<usize> {
        digits
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= step && *n <= max && n % step == 0 && !digits.starts_with('0'))
    };

    if let Some(digits) = ty.strip_prefix("bytes") {
        return width(digits, 32, 1).map(AtomicKind::FixedBytes);
    }
    if let Some(digits) = ty.strip_prefix("uint") {
        return width(digits, 256, 8).map(AtomicKind::Uint);
    }
    if let Some(digits) = ty.strip_prefix("int") {
        return width(digits, 256, 8).map(AtomicKind::Int);
    }
    None
}

fn resolve_value(
    types: &BTreeMap<String, Vec<TypedDataField>>,
    ty: &str,
    value: &Value,
    path: &str,
) -> Result<Eip712Value, EvmError> {
    if let Some((element, len)) = split_array(ty) {
        let items = value
            .as_array()
            .ok_or_else(|| malformed(format!("`{path}` must be an array for type `{ty}`")))?;

        if let Some(expected) = len.and_then(|n| n.parse::<usize>().ok()) {
            if items.len() != expected {
                return Err(malformed(format!(
                    "`{path}` must have {expected} elements, got {}",
                    items.len()
                )));
            }
        }

        return items
            .iter()
            .enumerate()
            .map(|(i, item)| resolve_value(types, element, item, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Eip712Value::Array);
    }

    if let Some(fields) = types.get(ty) {
        let object = value
            .as_object()
            .ok_or_else(|| malformed(format!("`{path}` must be an object for type `{ty}`")))?;

        let mut members = Vec::with_capacity(fields.len());
        for field in fields {
            let member_path = format!("{path}.{}", field.name);
            let member = object
                .get(&field.name)
                .ok_or_else(|| malformed(format!("missing field `{member_path}`")))?;
            members.push((
                field.name.clone(),
                resolve_value(types, &field.ty, member, &member_path)?,
            ));
        }
        return Ok(Eip712Value::Struct(members));
    }

    let kind = atomic_kind(ty).ok_or_else(|| malformed(format!("undefined type `{ty}`")))?;
    resolve_atomic(kind, ty, value, path)
}

fn resolve_atomic(
    kind: AtomicKind,
    ty: &str,
    value: &Value,
    path: &str,
) -> Result<Eip712Value, EvmError> {
    let invalid = |reason: String| malformed(format!("`{path}` is not a valid {ty}: {reason}"));

    match kind {
        AtomicKind::Bool => value
            .as_bool()
            .map(Eip712Value::Bool)
            .ok_or_else(|| invalid("expected a boolean".into())),
        AtomicKind::String => value
            .as_str()
            .map(|s| Eip712Value::String(s.to_string()))
            .ok_or_else(|| invalid("expected a string".into())),
        AtomicKind::Address => {
            let s = value
                .as_str()
                .ok_or_else(|| invalid("expected a hex string".into()))?;
            parse_address(s)
                .map(Eip712Value::Address)
                .map_err(|e| invalid(e.to_string()))
        }
        AtomicKind::Bytes => decode_hex_value(value)
            .map(Eip712Value::Bytes)
            .map_err(invalid),
        AtomicKind::FixedBytes(width) => {
            let bytes = decode_hex_value(value).map_err(invalid)?;
            if bytes.len() != width {
                return Err(invalid(format!("expected {width} bytes, got {}", bytes.len())));
            }
            Ok(Eip712Value::FixedBytes(bytes))
        }
        AtomicKind::Uint(bits) => {
            let n = parse_uint(value).map_err(invalid)?;
            if n.bit_len() > bits {
                return Err(invalid(format!("value {n} exceeds {bits} bits")));
            }
            Ok(Eip712Value::Uint(n))
        }
        AtomicKind::Int(bits) => {
            let n = parse_int(value).map_err(invalid)?;
            // Signed range is [-2^(bits-1), 2^(bits-1) - 1].
            let magnitude = n.unsigned_abs();
            let limit = U256::from(1u8) << (bits - 1);
            let in_range = if n.is_negative() {
                magnitude <= limit
            } else {
                magnitude < limit
            };
            if !in_range {
                return Err(invalid(format!("value {n} exceeds {bits} bits")));
            }
            Ok(Eip712Value::Int(n))
        }
    }
}

fn decode_hex_value(value: &Value) -> Result<Vec<u8>, String> {
    let s = value.as_str().ok_or("expected a 0x-prefixed hex string")?;
    let hex_part = s
        .strip_prefix("0x")
        .ok_or("expected a 0x-prefixed hex string")?;
    hex::decode(hex_part).map_err(|e| e.to_string())
}

fn parse_uint(value: &Value) -> Result<U256, String> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| format!("{n} is not an unsigned integer")),
        Value::String(s) => match s.strip_prefix("0x") {
            Some(hex_part) => U256::from_str_radix(hex_part, 16).map_err(|e| e.to_string()),
            None => U256::from_str_radix(s, 10).map_err(|e| e.to_string()),
        },
        _ => Err("expected a number or numeric string".into()),
    }
}

fn parse_int(value: &Value) -> Result<I256, String> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            I256::from_dec_str(&n.to_string()).map_err(|e| e.to_string())
        }
        Value::String(s) if s.starts_with("0x") || s.starts_with("-0x") => {
            I256::from_hex_str(s).map_err(|e| e.to_string())
        }
        Value::String(s) => I256::from_dec_str(s).map_err(|e| e.to_string()),
        _ => Err("expected an integer or numeric string".into()),
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

fn address_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

fn hash_struct(
    types: &BTreeMap<String, Vec<TypedDataField>>,
    type_name: &str,
    members: &[(String, Eip712Value)],
) -> B256 {
    let fields = types.get(type_name).map(Vec::as_slice).unwrap_or_default();

    let mut buf = Vec::with_capacity((1 + members.len()) * 32);
    buf.extend_from_slice(type_hash(types, type_name).as_slice());

    for (field, (_, value)) in fields.iter().zip(members) {
        buf.extend_from_slice(&encode_value(types, &field.ty, value));
    }

    keccak256(&buf)
}

/// `encodeData` for a single member: one 32-byte word.
fn encode_value(
    types: &BTreeMap<String, Vec<TypedDataField>>,
    ty: &str,
    value: &Eip712Value,
) -> [u8; 32] {
    match value {
        Eip712Value::Bool(b) => {
            let mut word = [0u8; 32];
            word[31] = *b as u8;
            word
        }
        Eip712Value::Uint(n) => n.to_be_bytes::<32>(),
        // Two's complement, sign-extended to 256 bits.
        Eip712Value::Int(n) => n.into_raw().to_be_bytes::<32>(),
        Eip712Value::Address(addr) => address_word(addr),
        Eip712Value::FixedBytes(bytes) => {
            let mut word = [0u8; 32];
            word[..bytes.len()].copy_from_slice(bytes);
            word
        }
        Eip712Value::Bytes(bytes) => keccak256(bytes).0,
        Eip712Value::String(s) => keccak256(s.as_bytes()).0,
        Eip712Value::Array(items) => {
            let element = split_array(ty).map_or(ty, |(element, _)| element);
            let mut buf = Vec::with_capacity(items.len() * 32);
            for item in items {
                buf.extend_from_slice(&encode_value(types, element, item));
            }
            keccak256(&buf).0
        }
        Eip712Value::Struct(members) => hash_struct(types, ty, members).0,
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

fn deserialize_chain_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid chainId: {n}"))),
        Some(Value::String(s)) => {
            let parsed = match s.strip_prefix("0x") {
                Some(hex_part) => u64::from_str_radix(hex_part, 16),
                None => s.parse::<u64>(),
            };
            parsed
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid chainId `{s}`: {e}")))
        }
        Some(other) => Err(D::Error::custom(format!("invalid chainId: {other}"))),
    }
}

fn deserialize_address<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    Option::<String>::deserialize(deserializer)?
        .map(|s| parse_address(&s).map_err(D::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// The "Mail" example from the EIP-712 specification.
    fn mail_json() -> Value {
        json!({
            "types": {
                "EIP712Domain": [
                    {"name": "name", "type": "string"},
                    {"name": "version", "type": "string"},
                    {"name": "chainId", "type": "uint256"},
                    {"name": "verifyingContract", "type": "address"}
                ],
                "Person": [
                    {"name": "name", "type": "string"},
                    {"name": "wallet", "type": "address"}
                ],
                "Mail": [
                    {"name": "from", "type": "Person"},
                    {"name": "to", "type": "Person"},
                    {"name": "contents", "type": "string"}
                ]
            },
            "primaryType": "Mail",
            "domain": {
                "name": "Ether Mail",
                "version": "1",
                "chainId": 1,
                "verifyingContract": "0xcccccccccccccccccccccccccccccccccccccccc"
            },
            "message": {
                "from": {
                    "name": "Cow",
                    "wallet": "0xcd2a3d9f938e13cd947ec05abc7fe734df8dd826"
                },
                "to": {
                    "name": "Bob",
                    "wallet": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
                },
                "contents": "Hello, Bob!"
            }
        })
    }

    fn hex32(s: &str) -> B256 {
        B256::from_slice(&hex::decode(s).unwrap())
    }

    #[test]
    fn mail_encode_type() {
        let typed = TypedData::try_from(mail_json()).unwrap();
        assert_eq!(
            typed.encode_type("Mail"),
            "Mail(Person from,Person to,string contents)Person(string name,address wallet)"
        );
    }

    #[test]
    fn mail_known_answer() {
        let typed = TypedData::try_from(mail_json()).unwrap();

        assert_eq!(
            typed.domain().separator(),
            hex32("f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f")
        );
        assert_eq!(
            typed.struct_hash(),
            hex32("c52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e")
        );
        assert_eq!(
            hash_typed_data(&typed),
            hex32("be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2")
        );
    }

    #[test]
    fn hash_is_deterministic() {
        let a = TypedData::try_from(mail_json()).unwrap();
        let b = TypedData::try_from(mail_json()).unwrap();
        assert_eq!(a.signing_hash(), a.signing_hash());
        assert_eq!(a.signing_hash(), b.signing_hash());
    }

    #[test]
    fn declared_domain_type_does_not_affect_hash() {
        let mut json = mail_json();
        json["types"].as_object_mut().unwrap().remove("EIP712Domain");
        let without_decl = TypedData::try_from(json).unwrap();
        let with_decl = TypedData::try_from(mail_json()).unwrap();
        assert_eq!(without_decl.signing_hash(), with_decl.signing_hash());
    }

    #[test]
    fn domain_fields_follow_canonical_order() {
        let domain = TypedDataDomain {
            salt: Some(B256::ZERO),
            name: Some("x".into()),
            chain_id: Some(10),
            ..Default::default()
        };
        let names: Vec<_> = domain.fields().into_iter().map(|f| f.name).collect();
        assert_eq!(names, ["name", "chainId", "salt"]);
    }

    #[test]
    fn domain_chain_id_changes_separator() {
        let a = TypedDataDomain {
            chain_id: Some(1),
            ..Default::default()
        };
        let b = TypedDataDomain {
            chain_id: Some(8453),
            ..Default::default()
        };
        assert_ne!(a.separator(), b.separator());
    }

    #[test]
    fn chain_id_accepts_string_forms() {
        let mut json = mail_json();
        json["domain"]["chainId"] = json!("0x1");
        let hex_form = TypedData::try_from(json).unwrap();

        let mut json = mail_json();
        json["domain"]["chainId"] = json!("1");
        let dec_form = TypedData::try_from(json).unwrap();

        assert_eq!(hex_form.domain().chain_id, Some(1));
        assert_eq!(hex_form.signing_hash(), dec_form.signing_hash());
    }

    #[test]
    fn chain_id_above_u64_is_malformed() {
        let mut json = mail_json();
        json["domain"]["chainId"] = json!("18446744073709551616");
        let result = TypedData::try_from(json);
        assert!(matches!(result, Err(EvmError::MalformedTypedData(_))));

        let mut json = mail_json();
        json["domain"]["chainId"] = json!(u64::MAX);
        let typed = TypedData::try_from(json).unwrap();
        assert_eq!(typed.domain().chain_id, Some(u64::MAX));
    }

    #[test]
    fn undefined_primary_type_errors() {
        let mut json = mail_json();
        json["primaryType"] = json!("Letter");
        let result = TypedData::try_from(json);
        assert!(matches!(result, Err(EvmError::MalformedTypedData(_))));
    }

    #[test]
    fn undefined_field_type_errors() {
        let mut json = mail_json();
        json["types"]["Mail"][0]["type"] = json!("Sender");
        let result = TypedData::try_from(json);
        assert!(matches!(result, Err(EvmError::MalformedTypedData(_))));
    }

    #[test]
    fn missing_message_field_errors() {
        let mut json = mail_json();
        json["message"].as_object_mut().unwrap().remove("contents");
        let err = TypedData::try_from(json).unwrap_err();
        assert!(err.to_string().contains("Mail.contents"));
    }

    #[test]
    fn bad_address_value_errors() {
        let mut json = mail_json();
        json["message"]["to"]["wallet"] = json!("0x1234");
        assert!(TypedData::try_from(json).is_err());
    }

    fn single_field(ty: &str, value: Value) -> Result<TypedData, EvmError> {
        TypedData::try_from(json!({
            "types": { "Test": [{"name": "value", "type": ty}] },
            "primaryType": "Test",
            "domain": { "name": "Test" },
            "message": { "value": value }
        }))
    }

    #[test]
    fn uint_accepts_number_decimal_and_hex() {
        let a = single_field("uint256", json!(1000000)).unwrap();
        let b = single_field("uint256", json!("1000000")).unwrap();
        let c = single_field("uint256", json!("0xf4240")).unwrap();
        assert_eq!(a.signing_hash(), b.signing_hash());
        assert_eq!(b.signing_hash(), c.signing_hash());
    }

    #[test]
    fn uint_rejects_non_numeric_string() {
        let result = single_field("uint256", json!("one million"));
        assert!(matches!(result, Err(EvmError::MalformedTypedData(_))));
    }

    #[test]
    fn uint_rejects_negative() {
        assert!(single_field("uint64", json!(-1)).is_err());
    }

    #[test]
    fn uint_width_is_enforced() {
        assert!(single_field("uint8", json!(255)).is_ok());
        assert!(single_field("uint8", json!(256)).is_err());
    }

    #[test]
    fn int_range_is_enforced() {
        assert!(single_field("int8", json!(-128)).is_ok());
        assert!(single_field("int8", json!(127)).is_ok());
        assert!(single_field("int8", json!(128)).is_err());
        assert!(single_field("int8", json!(-129)).is_err());
    }

    #[test]
    fn negative_int_is_sign_extended() {
        let typed = single_field("int256", json!(-1)).unwrap();
        let word = encode_value(typed.types(), "int256", &typed.message()[0].1);
        assert_eq!(word, [0xff; 32]);
    }

    #[test]
    fn fixed_bytes_width_is_enforced() {
        assert!(single_field("bytes4", json!("0xdeadbeef")).is_ok());
        assert!(single_field("bytes4", json!("0xdead")).is_err());
        assert!(single_field("bytes32", json!("deadbeef")).is_err());
    }

    #[test]
    fn unsupported_widths_are_undefined() {
        assert!(single_field("uint7", json!(1)).is_err());
        assert!(single_field("bytes33", json!("0x00")).is_err());
        assert!(single_field("int0", json!(1)).is_err());
    }

    #[test]
    fn arrays_hash_elements() {
        let dynamic = single_field("uint256[]", json!([1, 2, 3])).unwrap();
        let fixed = single_field("uint256[3]", json!([1, 2, 3])).unwrap();
        let different = single_field("uint256[]", json!([3, 2, 1])).unwrap();

        assert_ne!(dynamic.signing_hash(), different.signing_hash());
        // Array length is part of the type string, not the encoded value.
        assert_ne!(dynamic.signing_hash(), fixed.signing_hash());
        assert!(single_field("uint256[2]", json!([1, 2, 3])).is_err());
    }

    #[test]
    fn struct_arrays_reference_dependencies() {
        let typed = TypedData::try_from(json!({
            "types": {
                "Group": [{"name": "members", "type": "Person[]"}],
                "Person": [{"name": "name", "type": "string"}]
            },
            "primaryType": "Group",
            "domain": {},
            "message": { "members": [{"name": "a"}, {"name": "b"}] }
        }))
        .unwrap();

        assert_eq!(
            typed.encode_type("Group"),
            "Group(Person[] members)Person(string name)"
        );
    }

    #[test]
    fn domain_primary_type_omits_struct_hash() {
        let typed = TypedData::try_from(json!({
            "types": {
                "EIP712Domain": [{"name": "name", "type": "string"}]
            },
            "primaryType": "EIP712Domain",
            "domain": { "name": "Only Domain" },
            "message": { "name": "Only Domain" }
        }))
        .unwrap();

        let mut buf = vec![0x19, 0x01];
        buf.extend_from_slice(typed.domain().separator().as_slice());
        assert_eq!(typed.signing_hash(), keccak256(&buf));
    }

    #[test]
    fn serialized_form_reparses_to_same_hash() {
        let typed = TypedData::try_from(mail_json()).unwrap();
        let json = serde_json::to_value(&typed).unwrap();

        assert_eq!(json["primaryType"], "Mail");
        assert_eq!(json["domain"]["chainId"], 1);
        assert_eq!(
            json["message"]["from"]["wallet"],
            "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"
        );

        let reparsed: TypedData = serde_json::from_value(json).unwrap();
        assert_eq!(reparsed.signing_hash(), typed.signing_hash());
    }

    #[test]
    fn from_str_parses_json() {
        let typed: TypedData = mail_json().to_string().parse().unwrap();
        assert_eq!(typed.primary_type(), "Mail");
        assert_eq!(
            typed.message_field("contents"),
            Some(&Eip712Value::String("Hello, Bob!".into()))
        );
    }
}
