//! National identifier (Chilean RUT) with mod-11 check character.
//!
//! A RUT is rendered as `"<body>-<check>"`, e.g. `12345678-5`. The check
//! character is computed from the reversed body digits weighted by the
//! cycle 2, 3, 4, 5, 6, 7, 2, ... and is one of `0-9` or `K`.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest body produced by [`generate`].
pub const MIN_BODY: u32 = 1_000_000;
/// Largest body produced by [`generate`].
pub const MAX_BODY: u32 = 25_000_000;

/// Check character used when the computed check value is 10.
pub const K_MARKER: char = 'K';

/// RUT parsing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RutError {
    #[error("Missing '-' separator in identifier: {0}")]
    MissingSeparator(String),

    #[error("Invalid identifier body: {0}")]
    InvalidBody(String),

    #[error("Invalid check character: {0}")]
    InvalidCheck(String),

    #[error("Check character mismatch for {body}: expected {expected}, found {found}")]
    Mismatch {
        body: u32,
        expected: char,
        found: char,
    },
}

/// A parsed and checksum-verified national identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rut {
    pub body: u32,
    pub check: char,
}

impl Rut {
    /// Build a RUT from its numeric body, computing the check character.
    pub fn from_body(body: u32) -> Self {
        Self {
            body,
            check: check_digit(body),
        }
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.body, self.check)
    }
}

impl FromStr for Rut {
    type Err = RutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Weighted sum of the reversed body digits.
fn weighted_sum(body: u32) -> u32 {
    let mut remaining = body;
    let mut weight = 2;
    let mut sum = 0;
    loop {
        sum += (remaining % 10) * weight;
        remaining /= 10;
        weight = if weight == 7 { 2 } else { weight + 1 };
        if remaining == 0 {
            break;
        }
    }
    sum
}

/// Map a raw check value (1..=11) to its rendered character.
fn check_char(check: u32) -> char {
    match check {
        10 => K_MARKER,
        11 => '0',
        d => char::from_digit(d, 10).unwrap_or('0'),
    }
}

/// Compute the check character for a RUT body.
pub fn check_digit(body: u32) -> char {
    check_char(11 - weighted_sum(body) % 11)
}

/// Render a body with its check character.
pub fn format(body: u32) -> String {
    Rut::from_body(body).to_string()
}

/// Generate a random, valid RUT with a body in `[MIN_BODY, MAX_BODY]`.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> String {
    format(rng.gen_range(MIN_BODY..=MAX_BODY))
}

/// Parse and verify a RUT string.
///
/// Accepts dotted bodies (`12.345.678-5`) and a lowercase `k`.
pub fn parse(input: &str) -> Result<Rut, RutError> {
    let trimmed = input.trim();
    let (body_part, check_part) = trimmed
        .rsplit_once('-')
        .ok_or_else(|| RutError::MissingSeparator(input.to_string()))?;

    let digits: String = body_part.chars().filter(|c| *c != '.').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(RutError::InvalidBody(body_part.to_string()));
    }
    let body: u32 = digits
        .parse()
        .map_err(|_| RutError::InvalidBody(body_part.to_string()))?;

    let mut chars = check_part.chars();
    let found = match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_digit() => c,
        (Some(c), None) if c.eq_ignore_ascii_case(&K_MARKER) => K_MARKER,
        _ => return Err(RutError::InvalidCheck(check_part.to_string())),
    };

    let expected = check_digit(body);
    if expected != found {
        return Err(RutError::Mismatch {
            body,
            expected,
            found,
        });
    }

    Ok(Rut {
        body,
        check: found,
    })
}

/// Whether `input` is a well-formed RUT with a matching check character.
pub fn is_valid(input: &str) -> bool {
    parse(input).is_ok()
}
