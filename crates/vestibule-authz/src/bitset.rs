//! Packed permission bitsets.
//!
//! Bit `n` lives in byte `n / 8` at position `n % 8`, least significant bit
//! first. Positions beyond the end of a bitset are unset.

use vestibule_core::Authorizer;

/// Returns true if bit `pos` is set in `bits`.
#[must_use]
pub fn has_bit(bits: &[u8], pos: u32) -> bool {
    let byte = (pos / 8) as usize;
    bits.get(byte).is_some_and(|b| b & (1 << (pos % 8)) != 0)
}

/// Packs bit positions into a bitset just long enough to hold them.
#[must_use]
pub fn pack_bits(positions: &[u32]) -> Vec<u8> {
    let len = positions.iter().max().map_or(0, |max| (max / 8) as usize + 1);
    let mut bits = vec![0u8; len];
    for &pos in positions {
        bits[(pos / 8) as usize] |= 1 << (pos % 8);
    }
    bits
}

/// Allows a request when every endpoint permission bit is set in the
/// caller's bitset.
///
/// ```
/// use vestibule_authz::{pack_bits, BitsetAuthorizer};
/// use vestibule_core::Authorizer;
///
/// let caller = pack_bits(&[0, 9]);
/// assert!(BitsetAuthorizer.is_allowed(&caller, &[9]).unwrap());
/// assert!(!BitsetAuthorizer.is_allowed(&caller, &[1]).unwrap());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BitsetAuthorizer;

impl Authorizer for BitsetAuthorizer {
    fn is_allowed(&self, request_perms: &[u8], endpoint_perms: &[u32]) -> anyhow::Result<bool> {
        Ok(endpoint_perms
            .iter()
            .all(|&pos| has_bit(request_perms, pos)))
    }
}
