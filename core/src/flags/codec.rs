use crate::prelude::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// A status byte carries at most this many flags.
pub const MAX_FLAGS: usize = 8;

/// Byte value with no flag triggered.
pub const CLEAR: u8 = 0x00;

const WIRE_PREFIX: &str = "\\x";

/// One named bit of a status byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmFlag {
    pub name: String,
    pub bit_position: u8,
    pub triggered: bool,
}

impl AlarmFlag {
    pub fn new(name: impl Into<String>, bit_position: u8, triggered: bool) -> Self {
        Self {
            name: name.into(),
            bit_position,
            triggered,
        }
    }
}

fn check_len(len: usize) -> CoreResult<()> {
    if len > MAX_FLAGS {
        return Err(CoreError::Range(format!(
            "{} flags supplied, a byte holds at most {}",
            len, MAX_FLAGS
        )));
    }
    Ok(())
}

/// Expands `byte` into one flag per name; bit `i` drives `names[i]`.
pub fn decode<S: AsRef<str>>(byte: u8, names: &[S]) -> CoreResult<Vec<AlarmFlag>> {
    check_len(names.len())?;
    Ok(names
        .iter()
        .enumerate()
        .map(|(bit, name)| AlarmFlag::new(name.as_ref(), bit as u8, (byte >> bit) & 1 == 1))
        .collect())
}

/// Packs flags back into a byte; list index `i` sets bit `i`.
pub fn encode(flags: &[AlarmFlag]) -> CoreResult<u8> {
    check_len(flags.len())?;
    Ok(flags
        .iter()
        .enumerate()
        .filter(|(_, flag)| flag.triggered)
        .fold(CLEAR, |byte, (bit, _)| byte | (1 << bit)))
}

pub fn count_set(byte: u8) -> u32 {
    byte.count_ones()
}

/// Parses the telemetry text form `\xHH` (exactly two hex digits).
pub fn parse_wire(text: &str) -> CoreResult<u8> {
    let digits = text
        .strip_prefix(WIRE_PREFIX)
        .ok_or_else(|| CoreError::Format(format!("expected \\xHH, got {:?}", text)))?;
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CoreError::Format(format!(
            "expected two hex digits after \\x, got {:?}",
            text
        )));
    }
    u8::from_str_radix(digits, 16).map_err(|err| CoreError::Format(err.to_string()))
}

/// Renders a byte in the telemetry text form, lowercase hex.
pub fn format_wire(byte: u8) -> String {
    format!("{}{:02x}", WIRE_PREFIX, byte)
}

pub fn decode_wire<S: AsRef<str>>(text: &str, names: &[S]) -> CoreResult<Vec<AlarmFlag>> {
    decode(parse_wire(text)?, names)
}

pub fn encode_wire(flags: &[AlarmFlag]) -> CoreResult<String> {
    encode(flags).map(format_wire)
}

pub fn count_set_wire(text: &str) -> CoreResult<u32> {
    parse_wire(text).map(count_set)
}
