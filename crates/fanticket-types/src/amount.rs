//! Amount types
//!
//! Token amounts, nonces and deadlines are unsigned 256-bit integers so that
//! supplies well beyond `u128` (e.g. 10^54 units) are representable.

use crate::{LedgerError, Result};

pub use primitive_types::U256;

/// Token amount in smallest units
pub type Amount = U256;

/// Decimals used by every token instance
pub const TOKEN_DECIMALS: u8 = 18;

/// Parse a base-10 amount string
pub fn parse_amount(value: &str) -> Result<Amount> {
    U256::from_dec_str(value.trim())
        .map_err(|e| LedgerError::invalid_input("amount", format!("{:?}", e)))
}

/// `whole * 10^TOKEN_DECIMALS`
pub fn whole_tokens(whole: u64) -> Amount {
    U256::from(whole) * U256::exp10(TOKEN_DECIMALS as usize)
}

/// Big-endian 32-byte word
pub fn to_word(value: &U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}
