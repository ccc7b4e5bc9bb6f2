//! The helper operator catalogue.
//!
//! One struct per operator, each carrying exactly the configuration its
//! factory validated at build time and implementing [`Operation`] over an
//! event document. Apply methods own their inputs before mutating the
//! event, so a failed application never leaves a half-read borrow behind;
//! partial writes from multi-step operators are not rolled back.

use std::net::IpAddr;

use chrono::Utc;
use serde_json::Value;
use sha1::{Digest, Sha1};

use rtriage_event::Document;

use crate::param::Parameter;
use crate::term::Operation;

type OpResult = std::result::Result<(), String>;

fn write_err(err: rtriage_event::DocumentError) -> String {
    err.to_string()
}

// =============================================================================
// String transforms
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Case {
    Upper,
    Lower,
}

/// `s_up` / `s_lo`: ASCII case map over a literal or referenced string.
#[derive(Debug, Clone)]
pub(crate) struct StringCase {
    pub target: String,
    pub source: Parameter,
    pub case: Case,
}

impl Operation for StringCase {
    fn apply(&self, event: &mut Document) -> OpResult {
        let input = match &self.source {
            Parameter::Reference(path) => event
                .get_string(path)
                .ok_or_else(|| format!("[{path}] not found"))?
                .to_string(),
            Parameter::Value(v) => v.clone(),
        };
        let output = match self.case {
            Case::Upper => input.to_ascii_uppercase(),
            Case::Lower => input.to_ascii_lowercase(),
        };
        event.set_string(&self.target, output).map_err(write_err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrimSide {
    Begin,
    End,
    Both,
}

/// `s_trim`: strip a single character from one or both ends of the target.
#[derive(Debug, Clone)]
pub(crate) struct Trim {
    pub target: String,
    pub side: TrimSide,
    pub ch: char,
}

impl Operation for Trim {
    fn apply(&self, event: &mut Document) -> OpResult {
        let value = event
            .get_string(&self.target)
            .ok_or_else(|| format!("[{}] not found", self.target))?;
        let trimmed = match self.side {
            TrimSide::Begin => value.trim_start_matches(self.ch),
            TrimSide::End => value.trim_end_matches(self.ch),
            TrimSide::Both => value.trim_matches(self.ch),
        }
        .to_string();
        event.set_string(&self.target, trimmed).map_err(write_err)
    }
}

/// `s_concat`: concatenate literals and stringified references.
#[derive(Debug, Clone)]
pub(crate) struct Concat {
    pub target: String,
    pub parts: Vec<Parameter>,
}

impl Operation for Concat {
    fn apply(&self, event: &mut Document) -> OpResult {
        let mut result = String::new();
        for part in &self.parts {
            match part {
                Parameter::Value(v) => result.push_str(v),
                Parameter::Reference(path) => {
                    let node = event
                        .get_json(path)
                        .ok_or_else(|| format!("parameter [${path}] not found"))?;
                    match &node {
                        Value::Number(n) => result.push_str(&n.to_string()),
                        Value::String(s) => result.push_str(s),
                        Value::Object(_) => result.push_str(&node.to_string()),
                        _ => {
                            return Err(format!(
                                "parameter [${path}] must be a string, a number or an object"
                            ));
                        }
                    }
                }
            }
        }
        event.set_string(&self.target, result).map_err(write_err)
    }
}

/// `s_from_array`: join a referenced string array with a separator.
#[derive(Debug, Clone)]
pub(crate) struct JoinArray {
    pub target: String,
    pub array: String,
    pub separator: String,
}

impl Operation for JoinArray {
    fn apply(&self, event: &mut Document) -> OpResult {
        let joined = {
            let items = event.get_array(&self.array).ok_or_else(|| {
                format!("parameter [${}] is not an array or does not exist", self.array)
            })?;
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => parts.push(s.as_str()),
                    _ => return Err("array member is not a string".to_string()),
                }
            }
            parts.join(&self.separator)
        };
        event.set_string(&self.target, joined).map_err(write_err)
    }
}

/// `s_from_hexa`: decode an even-length hex string into its byte string.
#[derive(Debug, Clone)]
pub(crate) struct FromHex {
    pub target: String,
    pub source: String,
}

impl Operation for FromHex {
    fn apply(&self, event: &mut Document) -> OpResult {
        let hex = event
            .get_string(&self.source)
            .ok_or_else(|| format!("parameter [${}] is not a string or does not exist", self.source))?
            .to_string();
        if !hex.is_ascii() {
            return Err("hex string contains a non-hex character".to_string());
        }
        if hex.len() % 2 != 0 {
            return Err("hex string has an odd number of digits".to_string());
        }
        let mut bytes = Vec::with_capacity(hex.len() / 2);
        for i in (0..hex.len()).step_by(2) {
            let pair = &hex[i..i + 2];
            let byte = u8::from_str_radix(pair, 16)
                .map_err(|_| format!("'{pair}' is not a valid hex byte"))?;
            bytes.push(byte);
        }
        let decoded = String::from_utf8(bytes)
            .map_err(|_| "decoded bytes are not a valid UTF-8 string".to_string())?;
        event.set_string(&self.target, decoded).map_err(write_err)
    }
}

/// `s_hex_to_num`: parse the whole referenced string as a hex integer.
#[derive(Debug, Clone)]
pub(crate) struct HexToNum {
    pub target: String,
    pub source: String,
}

impl Operation for HexToNum {
    fn apply(&self, event: &mut Document) -> OpResult {
        let hex = event
            .get_string(&self.source)
            .ok_or_else(|| format!("parameter [${}] is not a string or does not exist", self.source))?
            .to_string();
        let value = i64::from_str_radix(&hex, 16)
            .map_err(|_| format!("'{hex}' is not a valid hexadecimal number"))?;
        event.set_int(&self.target, value).map_err(write_err)
    }
}

/// `s_replace`: global left-to-right non-overlapping substring replacement.
///
/// After each replacement the scan resumes past the inserted text, so a
/// replacement never re-matches inside what it just produced.
#[derive(Debug, Clone)]
pub(crate) struct Replace {
    pub target: String,
    pub old: Parameter,
    pub new: Parameter,
}

impl Replace {
    fn resolve(&self, param: &Parameter, event: &Document) -> std::result::Result<String, String> {
        match param {
            Parameter::Value(v) => Ok(v.clone()),
            Parameter::Reference(path) => {
                let value = event
                    .get_string(path)
                    .ok_or_else(|| format!("[{path}] not found"))?;
                if value.is_empty() {
                    return Err(format!("[{path}] is empty"));
                }
                Ok(value.to_string())
            }
        }
    }
}

impl Operation for Replace {
    fn apply(&self, event: &mut Document) -> OpResult {
        let mut current = event
            .get_string(&self.target)
            .ok_or_else(|| format!("[{}] not found", self.target))?
            .to_string();
        if current.is_empty() {
            return Err(format!("[{}] is empty", self.target));
        }
        let old = self.resolve(&self.old, event)?;
        let new = self.resolve(&self.new, event)?;

        let mut pos = 0;
        while let Some(found) = current[pos..].find(&old) {
            let at = pos + found;
            current.replace_range(at..at + old.len(), &new);
            pos = at + new.len();
        }
        event.set_string(&self.target, current).map_err(write_err)
    }
}

/// `s_to_array`: split a referenced string and append the pieces to the
/// target array.
#[derive(Debug, Clone)]
pub(crate) struct SplitToArray {
    pub target: String,
    pub source: String,
    pub separator: char,
}

impl Operation for SplitToArray {
    fn apply(&self, event: &mut Document) -> OpResult {
        let value = event
            .get_string(&self.source)
            .ok_or_else(|| {
                format!("parameter [${}] is not a string or does not exist", self.source)
            })?
            .to_string();
        for piece in value.split(self.separator) {
            event.append_string(&self.target, piece).map_err(write_err)?;
        }
        Ok(())
    }
}

// =============================================================================
// Integer transforms
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CalcOp {
    Sum,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone)]
pub(crate) enum CalcOperand {
    Literal(i64),
    Reference(String),
}

/// `i_calc`: integer arithmetic between the target field and an operand.
#[derive(Debug, Clone)]
pub(crate) struct Calc {
    pub target: String,
    pub op: CalcOp,
    pub rhs: CalcOperand,
}

impl Operation for Calc {
    fn apply(&self, event: &mut Document) -> OpResult {
        let lhs = event
            .get_int(&self.target)
            .ok_or_else(|| format!("[{}] not found", self.target))?;
        let rhs = match &self.rhs {
            CalcOperand::Literal(v) => *v,
            CalcOperand::Reference(path) => event
                .get_int(path)
                .ok_or_else(|| format!("[{path}] not found"))?,
        };
        let result = match self.op {
            CalcOp::Sum => lhs.checked_add(rhs),
            CalcOp::Sub => lhs.checked_sub(rhs),
            CalcOp::Mul => lhs.checked_mul(rhs),
            CalcOp::Div => {
                if rhs == 0 {
                    return Err("division by zero".to_string());
                }
                lhs.checked_div(rhs)
            }
        }
        .ok_or_else(|| "integer overflow".to_string())?;
        event.set_int(&self.target, result).map_err(write_err)
    }
}

// =============================================================================
// Regex transforms
// =============================================================================

/// `r_ext`: partial-match a compiled regex against a referenced string and
/// write the first capture group.
#[derive(Debug, Clone)]
pub(crate) struct RegexExtract {
    pub target: String,
    pub source: String,
    pub regex: regex::Regex,
}

impl Operation for RegexExtract {
    fn apply(&self, event: &mut Document) -> OpResult {
        let value = event
            .get_string(&self.source)
            .ok_or_else(|| format!("[{}] not found", self.source))?
            .to_string();
        let captured = self
            .regex
            .captures(&value)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| "the regular expression did not capture".to_string())?
            .as_str()
            .to_string();
        event.set_string(&self.target, captured).map_err(write_err)
    }
}

// =============================================================================
// Array and object mutation
// =============================================================================

/// `a_append`: append resolved references (as JSON nodes) and literals (as
/// strings) to the target array.
#[derive(Debug, Clone)]
pub(crate) struct Append {
    pub target: String,
    pub items: Vec<Parameter>,
}

impl Operation for Append {
    fn apply(&self, event: &mut Document) -> OpResult {
        for item in &self.items {
            match item {
                Parameter::Reference(path) => {
                    let node = event
                        .get_json(path)
                        .ok_or_else(|| format!("parameter [${path}] not found"))?;
                    event.append_json(&self.target, node).map_err(write_err)?;
                }
                Parameter::Value(v) => {
                    event
                        .append_string(&self.target, v.clone())
                        .map_err(write_err)?;
                }
            }
        }
        Ok(())
    }
}

/// `merge`: merge the referenced subtree into the target field.
#[derive(Debug, Clone)]
pub(crate) struct MergeFields {
    pub target: String,
    pub source: String,
}

impl Operation for MergeFields {
    fn apply(&self, event: &mut Document) -> OpResult {
        if !event.exists(&self.source) {
            return Err(format!("parameter [${}] not found", self.source));
        }
        if !event.exists(&self.target) {
            return Err(format!("target field [{}] not found", self.target));
        }
        event.merge(&self.source, &self.target).map_err(write_err)
    }
}

// =============================================================================
// Field mutation
// =============================================================================

/// `ef_delete`: erase the target field.
#[derive(Debug, Clone)]
pub(crate) struct DeleteField {
    pub target: String,
}

impl Operation for DeleteField {
    fn apply(&self, event: &mut Document) -> OpResult {
        if event.erase(&self.target) {
            Ok(())
        } else {
            Err(format!("field [{}] does not exist", self.target))
        }
    }
}

/// `ef_rename`: move the referenced field to the target path.
#[derive(Debug, Clone)]
pub(crate) struct RenameField {
    pub target: String,
    pub source: String,
}

impl Operation for RenameField {
    fn apply(&self, event: &mut Document) -> OpResult {
        let node = event
            .get_json(&self.source)
            .ok_or_else(|| format!("field [{}] does not exist", self.source))?;
        event.set_json(&self.target, node).map_err(write_err)?;
        if event.erase(&self.source) {
            Ok(())
        } else {
            Err(format!("field [{}] could not be removed", self.source))
        }
    }
}

// =============================================================================
// IP transforms
// =============================================================================

/// `s_ip_version`: classify a referenced string as `IPv4` or `IPv6`.
#[derive(Debug, Clone)]
pub(crate) struct IpVersion {
    pub target: String,
    pub source: String,
}

impl Operation for IpVersion {
    fn apply(&self, event: &mut Document) -> OpResult {
        let value = event
            .get_string(&self.source)
            .ok_or_else(|| {
                format!("parameter [${}] not found or not a string", self.source)
            })?
            .to_string();
        let version = match value.parse::<IpAddr>() {
            Ok(IpAddr::V4(_)) => "IPv4",
            Ok(IpAddr::V6(_)) => "IPv6",
            Err(_) => return Err(format!("'{value}' is not a valid IP address")),
        };
        event.set_string(&self.target, version).map_err(write_err)
    }
}

// =============================================================================
// Time transforms
// =============================================================================

/// `sys_epoch`: write the current system time in seconds since the epoch.
///
/// Fails when the value no longer fits in a signed 32-bit integer, the
/// historical boundary of the epoch field downstream consumers read.
#[derive(Debug, Clone)]
pub(crate) struct SysEpoch {
    pub target: String,
}

impl Operation for SysEpoch {
    fn apply(&self, event: &mut Document) -> OpResult {
        let seconds = Utc::now().timestamp();
        if seconds > i64::from(i32::MAX) {
            return Err("epoch seconds exceed the signed 32-bit range".to_string());
        }
        event.set_int(&self.target, seconds).map_err(write_err)
    }
}

// =============================================================================
// Checksum and hash
// =============================================================================

/// `h_sha1`: lowercase hex SHA-1 digest of a literal or referenced string.
#[derive(Debug, Clone)]
pub(crate) struct Sha1Digest {
    pub target: String,
    pub input: Parameter,
}

impl Operation for Sha1Digest {
    fn apply(&self, event: &mut Document) -> OpResult {
        let input = match &self.input {
            Parameter::Reference(path) => event
                .get_string(path)
                .ok_or_else(|| format!("parameter [${path}] not found"))?
                .to_string(),
            Parameter::Value(v) => v.clone(),
        };
        let digest = Sha1::digest(input.as_bytes());
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            hex.push_str(&format!("{byte:02x}"));
        }
        event.set_string(&self.target, hex).map_err(write_err)
    }
}
