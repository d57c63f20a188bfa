//! Derivation path parsing.
//!
//! A derivation path selects a hierarchical key from the device's master
//! seed as a sequence of integers. The CLI accepts the conventional
//! string form `m/44'/60'/0'/0/0`, where a trailing `'` (or `h`) marks a
//! hardened component.

use devgate_core::error::ValidationError;

/// Offset marking a hardened path component.
pub const HARDENED: u32 = 0x8000_0000;

/// Parse a derivation path string into device path components.
///
/// The leading `m/` is optional; components are decimal integers below
/// 2^31, hardened with a `'`, `h`, or `H` suffix.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDerivationPath`] for an empty path
/// or any component that fails to parse.
///
/// # Example
///
/// ```
/// use devgate_device::path::{parse_path, HARDENED};
///
/// let components = parse_path("m/44'/60'/0'/0/0").unwrap();
/// assert_eq!(
///     components,
///     vec![44 | HARDENED, 60 | HARDENED, HARDENED, 0, 0]
/// );
/// ```
pub fn parse_path(input: &str) -> Result<Vec<u32>, ValidationError> {
    let trimmed = input
        .strip_prefix("m/")
        .or_else(|| input.strip_prefix("M/"))
        .unwrap_or(input);
    if trimmed.is_empty() {
        return Err(ValidationError::invalid_derivation_path(input));
    }

    trimmed
        .split('/')
        .map(|component| parse_component(component, input))
        .collect()
}

fn parse_component(component: &str, input: &str) -> Result<u32, ValidationError> {
    let (digits, hardened) = match component.strip_suffix(['\'', 'h', 'H']) {
        Some(digits) => (digits, true),
        None => (component, false),
    };
    let value: u32 = digits
        .parse()
        .map_err(|_| ValidationError::invalid_derivation_path(input))?;
    if value >= HARDENED {
        return Err(ValidationError::invalid_derivation_path(input));
    }
    Ok(if hardened { value | HARDENED } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_ethereum_path() {
        let path = parse_path("m/44'/60'/0'/0/0").unwrap();
        assert_eq!(path, vec![44 | HARDENED, 60 | HARDENED, HARDENED, 0, 0]);
    }

    #[test]
    fn test_prefix_is_optional() {
        assert_eq!(parse_path("m/0/1").unwrap(), parse_path("0/1").unwrap());
    }

    #[test]
    fn test_h_suffix_hardens() {
        assert_eq!(
            parse_path("44h/60H/0'").unwrap(),
            vec![44 | HARDENED, 60 | HARDENED, HARDENED]
        );
    }

    #[test]
    fn test_rejects_malformed() {
        for input in ["", "m/", "m//0", "m/abc", "m/-1", "m/2147483648", "m/0''"] {
            assert!(
                matches!(
                    parse_path(input),
                    Err(ValidationError::InvalidDerivationPath { .. })
                ),
                "{input:?}"
            );
        }
    }
}
