//! Typed values for choice and size options.
//!
//! Each type renders exactly the text `clamscan` expects after `--name=`.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A `[yes/no]` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn as_bool(self) -> bool {
        matches!(self, YesNo::Yes)
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

impl From<YesNo> for bool {
    fn from(value: YesNo) -> Self {
        value.as_bool()
    }
}

impl FromStr for YesNo {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(YesNo::Yes),
            "no" => Ok(YesNo::No),
            _ => Err(ValidationError::InvalidChoice {
                kind: "yes/no value",
                value: s.to_string(),
                allowed: "yes, no",
            }),
        }
    }
}

impl Display for YesNo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            YesNo::Yes => write!(f, "yes"),
            YesNo::No => write!(f, "no"),
        }
    }
}

/// Execution statistics collected by `--statistics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistics {
    #[serde(rename = "none")]
    Disabled,
    Bytecode,
    Pcre,
}

impl FromStr for Statistics {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Statistics::Disabled),
            "bytecode" => Ok(Statistics::Bytecode),
            "pcre" => Ok(Statistics::Pcre),
            _ => Err(ValidationError::InvalidChoice {
                kind: "statistics mode",
                value: s.to_string(),
                allowed: "none, bytecode, pcre",
            }),
        }
    }
}

impl Display for Statistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Statistics::Disabled => write!(f, "none"),
            Statistics::Bytecode => write!(f, "bytecode"),
            Statistics::Pcre => write!(f, "pcre"),
        }
    }
}

/// Symlink policy for `--follow-dir-symlinks` and `--follow-file-symlinks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SymlinkMode {
    /// Never follow symlinks.
    Never,
    /// Only follow symlinks passed directly as arguments (clamscan's default).
    Direct,
    /// Always follow symlinks.
    Always,
}

impl TryFrom<u8> for SymlinkMode {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SymlinkMode::Never),
            1 => Ok(SymlinkMode::Direct),
            2 => Ok(SymlinkMode::Always),
            _ => Err(ValidationError::InvalidChoice {
                kind: "symlink mode",
                value: value.to_string(),
                allowed: "0, 1, 2",
            }),
        }
    }
}

impl From<SymlinkMode> for u8 {
    fn from(value: SymlinkMode) -> Self {
        match value {
            SymlinkMode::Never => 0,
            SymlinkMode::Direct => 1,
            SymlinkMode::Always => 2,
        }
    }
}

impl Display for SymlinkMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", u8::from(*self))
    }
}

/// SSN format matched by structured data detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SsnFormat {
    Normal,
    Stripped,
    Both,
}

impl TryFrom<u8> for SsnFormat {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SsnFormat::Normal),
            1 => Ok(SsnFormat::Stripped),
            2 => Ok(SsnFormat::Both),
            _ => Err(ValidationError::InvalidChoice {
                kind: "SSN format",
                value: value.to_string(),
                allowed: "0, 1, 2",
            }),
        }
    }
}

impl From<SsnFormat> for u8 {
    fn from(value: SsnFormat) -> Self {
        match value {
            SsnFormat::Normal => 0,
            SsnFormat::Stripped => 1,
            SsnFormat::Both => 2,
        }
    }
}

impl Display for SsnFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", u8::from(*self))
    }
}

/// Unit suffix accepted by clamscan's size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Kilobytes,
    Megabytes,
}

impl SizeUnit {
    fn multiplier(self) -> u64 {
        match self {
            SizeUnit::Kilobytes => 1024,
            SizeUnit::Megabytes => 1024 * 1024,
        }
    }
}

/// A size limit: either a plain byte count or an amount with a `K`/`M` suffix.
///
/// Both forms are passed to clamscan verbatim (`--max-filesize=1048576` and
/// `--max-filesize=1M` are equivalent), so encoding is just `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SizeRepr", into = "SizeRepr")]
pub enum SizeValue {
    Bytes(u64),
    Scaled { amount: u64, unit: SizeUnit },
}

impl SizeValue {
    pub fn kilobytes(amount: u64) -> Self {
        SizeValue::Scaled {
            amount,
            unit: SizeUnit::Kilobytes,
        }
    }

    pub fn megabytes(amount: u64) -> Self {
        SizeValue::Scaled {
            amount,
            unit: SizeUnit::Megabytes,
        }
    }

    /// Size in bytes, saturating on overflow.
    pub fn as_bytes(&self) -> u64 {
        match *self {
            SizeValue::Bytes(bytes) => bytes,
            SizeValue::Scaled { amount, unit } => amount.saturating_mul(unit.multiplier()),
        }
    }
}

impl From<u64> for SizeValue {
    fn from(bytes: u64) -> Self {
        SizeValue::Bytes(bytes)
    }
}

impl FromStr for SizeValue {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidSize(s.to_string());

        let trimmed = s.trim();
        let (digits, unit) = match trimmed.chars().last() {
            Some('K') | Some('k') => (&trimmed[..trimmed.len() - 1], Some(SizeUnit::Kilobytes)),
            Some('M') | Some('m') => (&trimmed[..trimmed.len() - 1], Some(SizeUnit::Megabytes)),
            _ => (trimmed, None),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let amount: u64 = digits.parse().map_err(|_| invalid())?;

        Ok(match unit {
            Some(unit) => SizeValue::Scaled { amount, unit },
            None => SizeValue::Bytes(amount),
        })
    }
}

impl Display for SizeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SizeValue::Bytes(bytes) => write!(f, "{}", bytes),
            SizeValue::Scaled {
                amount,
                unit: SizeUnit::Kilobytes,
            } => write!(f, "{}K", amount),
            SizeValue::Scaled {
                amount,
                unit: SizeUnit::Megabytes,
            } => write!(f, "{}M", amount),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SizeRepr {
    Number(u64),
    Text(String),
}

impl TryFrom<SizeRepr> for SizeValue {
    type Error = ValidationError;

    fn try_from(value: SizeRepr) -> Result<Self, Self::Error> {
        match value {
            SizeRepr::Number(bytes) => Ok(SizeValue::Bytes(bytes)),
            SizeRepr::Text(text) => text.parse(),
        }
    }
}

impl From<SizeValue> for SizeRepr {
    fn from(value: SizeValue) -> Self {
        match value {
            SizeValue::Bytes(bytes) => SizeRepr::Number(bytes),
            scaled => SizeRepr::Text(scaled.to_string()),
        }
    }
}
