//! Fixed-layout payload encoding and decoding.
//!
//! Operation payloads are opaque to the engine except for their framing: a
//! 4-byte selector followed by 32-byte parameter words. Addresses occupy
//! the low 20 bytes of their word; amounts the low 16.

use crate::{Error, Result};
use policy::{Address, Selector};

pub const SELECTOR_LEN: usize = 4;
pub const WORD_LEN: usize = 32;

/// The leading 4-byte selector of a payload.
pub fn selector_of(payload: &[u8]) -> Result<Selector> {
    let tag = payload.get(..SELECTOR_LEN).ok_or(Error::InvalidPayload)?;
    Ok(Selector([tag[0], tag[1], tag[2], tag[3]]))
}

/// The grantee of an allowance-granting payload: the address in the first
/// parameter word.
pub fn approve_spender(payload: &[u8]) -> Result<Address> {
    address_at(payload, 0)
}

/// The address parameter in word `index` (0-based, after the selector).
pub fn address_at(payload: &[u8], index: usize) -> Result<Address> {
    let word = word_at(payload, index)?;
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[WORD_LEN - 20..]);
    Ok(Address(bytes))
}

/// The amount parameter in word `index`. Values above the `u128` range are
/// not representable and fail.
pub fn amount_at(payload: &[u8], index: usize) -> Result<u128> {
    let word = word_at(payload, index)?;
    if word[..WORD_LEN - 16].iter().any(|b| *b != 0) {
        return Err(Error::InvalidPayload);
    }
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&word[WORD_LEN - 16..]);
    Ok(u128::from_be_bytes(bytes))
}

fn word_at(payload: &[u8], index: usize) -> Result<&[u8]> {
    let start = SELECTOR_LEN + index * WORD_LEN;
    payload.get(start..start + WORD_LEN).ok_or(Error::InvalidPayload)
}

/// Encode an `approve(spender, amount)` payload.
pub fn encode_approve(spender: Address, amount: u128) -> Vec<u8> {
    encode_call(Selector::APPROVE, &[address_word(spender), amount_word(amount)])
}

/// Encode a `transfer(to, amount)` payload.
pub fn encode_transfer(to: Address, amount: u128) -> Vec<u8> {
    encode_call(Selector::TRANSFER, &[address_word(to), amount_word(amount)])
}

/// Selector plus parameter words.
pub fn encode_call(selector: Selector, words: &[[u8; WORD_LEN]]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(SELECTOR_LEN + words.len() * WORD_LEN);
    payload.extend_from_slice(&selector.0);
    for word in words {
        payload.extend_from_slice(word);
    }
    payload
}

fn address_word(address: Address) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    word[WORD_LEN - 20..].copy_from_slice(&address.0);
    word
}

fn amount_word(amount: u128) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    word[WORD_LEN - 16..].copy_from_slice(&amount.to_be_bytes());
    word
}
