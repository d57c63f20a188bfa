//! Ethereum denomination table and amount parsing.
//!
//! Amounts on the command line are either a bare integer (interpreted as
//! wei) or "`<integer> <unit>`" where the unit is looked up
//! case-insensitively in a [`UnitTable`]. The table is an immutable value
//! that callers inject explicitly, so tests can substitute their own.
//!
//! # Example
//!
//! ```
//! use alloy_primitives::U256;
//! use devgate_chain::units::{parse_amount, UnitTable};
//!
//! let units = UnitTable::ethereum();
//! assert_eq!(
//!     parse_amount("1 ether", &units).unwrap(),
//!     U256::from(10u64).pow(U256::from(18u64))
//! );
//! assert_eq!(parse_amount("21000", &units).unwrap(), U256::from(21000u64));
//! assert!(parse_amount("3 parsec", &units).is_err());
//! ```

use alloy_primitives::U256;
use devgate_core::error::ValidationError;

/// The Ethereum denominations, as `(name, power of ten)` pairs.
///
/// Aliases share a row per power so the table reads like the conversion
/// chart it encodes.
const ETHEREUM_UNITS: &[(&str, u32)] = &[
    ("wei", 0),
    ("kwei", 3),
    ("babbage", 3),
    ("femtoether", 3),
    ("mwei", 6),
    ("lovelace", 6),
    ("picoether", 6),
    ("gwei", 9),
    ("shannon", 9),
    ("nanoether", 9),
    ("nano", 9),
    ("szabo", 12),
    ("microether", 12),
    ("micro", 12),
    ("finney", 15),
    ("milliether", 15),
    ("milli", 15),
    ("ether", 18),
    ("kether", 21),
    ("grand", 21),
    ("einstein", 21),
    ("mether", 24),
    ("gether", 27),
    ("tether", 30),
];

/// Immutable mapping from unit name to integer multiplier.
///
/// Lookups are case-insensitive. An unknown unit is a hard reject at the
/// call site; the table itself never guesses.
#[derive(Debug, Clone)]
pub struct UnitTable {
    entries: Vec<(String, u32)>,
}

impl UnitTable {
    /// The standard Ethereum denomination table (wei through tether).
    #[must_use]
    pub fn ethereum() -> Self {
        Self::new(
            ETHEREUM_UNITS
                .iter()
                .map(|&(name, exp)| (name.to_string(), exp)),
        )
    }

    /// Build a table from `(name, power of ten)` pairs.
    ///
    /// Names are stored lowercase; lookups fold case the same way.
    #[must_use]
    pub fn new<N: Into<String>, I: IntoIterator<Item = (N, u32)>>(entries: I) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, exp)| (name.into().to_ascii_lowercase(), exp))
                .collect(),
        }
    }

    /// Look up the multiplier for a unit name, case-insensitively.
    #[must_use]
    pub fn multiplier(&self, unit: &str) -> Option<U256> {
        let wanted = unit.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|&(_, exp)| U256::from(10u64).pow(U256::from(exp)))
    }
}

/// Parse an amount string against a unit table.
///
/// Accepts "`<integer>`" (wei) or "`<integer> <unit>`". The integer part
/// is decimal and unbounded up to 256 bits.
///
/// # Errors
///
/// Returns [`ValidationError::UnrecognizedUnit`] for a unit missing from
/// the table and [`ValidationError::InvalidAmount`] for anything else
/// that fails to parse. Both reject before any network access.
pub fn parse_amount(input: &str, units: &UnitTable) -> Result<U256, ValidationError> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    match parts.as_slice() {
        [number] => parse_decimal(number, input),
        [number, unit] => {
            let multiplier = units
                .multiplier(unit)
                .ok_or_else(|| ValidationError::unrecognized_unit(*unit))?;
            parse_decimal(number, input)?
                .checked_mul(multiplier)
                .ok_or_else(|| ValidationError::invalid_amount(input))
        }
        _ => Err(ValidationError::invalid_amount(input)),
    }
}

fn parse_decimal(number: &str, input: &str) -> Result<U256, ValidationError> {
    U256::from_str_radix(number, 10).map_err(|_| ValidationError::invalid_amount(input))
}
