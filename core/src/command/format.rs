//! Wire renderings for command fields.
//!
//! Each field kind owns exactly one rendering: two-digit enum codes,
//! three-digit zero-padded integers, and one-decimal fixed-point text. The
//! widths are part of the firmware contract.

use crate::prelude::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-digit enum code, e.g. `"08"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnumCode(u8);

impl EnumCode {
    pub fn new(code: u8) -> Self {
        Self(code)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for EnumCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl From<EnumCode> for String {
    fn from(code: EnumCode) -> String {
        code.to_string()
    }
}

impl TryFrom<String> for EnumCode {
    type Error = CoreError;

    fn try_from(text: String) -> CoreResult<Self> {
        parse_digits(&text, 2).map(|value| Self(value as u8))
    }
}

/// Three-digit zero-padded integer, e.g. `"030"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaddedInt(u16);

impl PaddedInt {
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for PaddedInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl From<PaddedInt> for String {
    fn from(value: PaddedInt) -> String {
        value.to_string()
    }
}

impl TryFrom<String> for PaddedInt {
    type Error = CoreError;

    fn try_from(text: String) -> CoreResult<Self> {
        parse_digits(&text, 3).map(Self)
    }
}

/// Value rounded to one decimal place and kept as its rendered text, e.g. `"10.5"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FixedDecimal(String);

impl FixedDecimal {
    pub fn new(value: f64) -> Self {
        Self(format!("{:.1}", value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> CoreResult<f64> {
        self.0
            .parse()
            .map_err(|_| CoreError::Format(format!("decimal field {:?}", self.0)))
    }
}

impl fmt::Display for FixedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<FixedDecimal> for String {
    fn from(value: FixedDecimal) -> String {
        value.0
    }
}

impl TryFrom<String> for FixedDecimal {
    type Error = CoreError;

    fn try_from(text: String) -> CoreResult<Self> {
        let well_formed = match text.split_once('.') {
            Some((whole, frac)) => {
                !whole.is_empty()
                    && whole.bytes().all(|b| b.is_ascii_digit())
                    && frac.len() == 1
                    && frac.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        };
        if !well_formed {
            return Err(CoreError::Format(format!(
                "expected one-decimal value, got {:?}",
                text
            )));
        }
        Ok(Self(text))
    }
}

fn parse_digits(text: &str, width: usize) -> CoreResult<u16> {
    if text.len() != width || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::Format(format!(
            "expected {} digits, got {:?}",
            width, text
        )));
    }
    text.parse()
        .map_err(|_| CoreError::Format(format!("expected {} digits, got {:?}", width, text)))
}
