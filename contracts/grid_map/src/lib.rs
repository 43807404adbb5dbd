#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Env, Vec, U256};

/// Usable bits per map word. Matches the 251-bit field elements the maps
/// were first laid out for, so existing maps keep their addressing.
pub const WORD_BITS: u32 = 251;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum GridError {
    InvalidSize = 1,
    PositionOutOfRange = 2,
    WordIndexOutOfRange = 3,
    WordOverflow = 4,
    MapTooShort = 5,
}

/// Stateless bitmap helpers: maps are passed in and returned by value, the
/// caller decides where to keep them.
#[contract]
pub struct GridMapContract;

#[contractimpl]
impl GridMapContract {
    /// Number of words needed for a `size x size` map.
    pub fn calc_size(_env: Env, size: u32) -> Result<u32, GridError> {
        calc_words(size)
    }

    pub fn word_bits(_env: Env) -> u32 {
        WORD_BITS
    }

    /// Read the bit at `position` (row-major). Returns 0 or 1.
    pub fn get_bit(env: Env, size: u32, map: Vec<U256>, position: u64) -> Result<u32, GridError> {
        let (index, offset) = locate(size, map.len(), position)?;
        let word = map.get(index).ok_or(GridError::WordIndexOutOfRange)?;
        Ok(if bit_is_set(&env, &word, offset) { 1 } else { 0 })
    }

    /// Return `map` with the bit at `position` set.
    pub fn set_bit(
        env: Env,
        size: u32,
        map: Vec<U256>,
        position: u64,
    ) -> Result<Vec<U256>, GridError> {
        write_bit(&env, size, map, position, true)
    }

    /// Return `map` with the bit at `position` cleared.
    pub fn clear_bit(
        env: Env,
        size: u32,
        map: Vec<U256>,
        position: u64,
    ) -> Result<Vec<U256>, GridError> {
        write_bit(&env, size, map, position, false)
    }
}

fn calc_words(size: u32) -> Result<u32, GridError> {
    if size == 0 {
        return Err(GridError::InvalidSize);
    }
    let bits = (size as u64) * (size as u64);
    u32::try_from(bits.div_ceil(WORD_BITS as u64)).map_err(|_| GridError::InvalidSize)
}

/// Resolve `position` to `(word_index, bit_offset)` within a map of
/// `map_len` words. The map must be at least `calc_words(size)` long.
fn locate(size: u32, map_len: u32, position: u64) -> Result<(u32, u32), GridError> {
    let words = calc_words(size)?;
    let cells = (size as u64) * (size as u64);
    if position >= cells {
        return Err(GridError::PositionOutOfRange);
    }
    if map_len < words {
        return Err(GridError::MapTooShort);
    }
    let index = position / WORD_BITS as u64;
    let offset = (position % WORD_BITS as u64) as u32;
    if index >= map_len as u64 {
        return Err(GridError::WordIndexOutOfRange);
    }
    Ok((index as u32, offset))
}

fn bit_is_set(env: &Env, word: &U256, offset: u32) -> bool {
    let two = U256::from_u32(env, 2);
    word.shr(offset).rem_euclid(&two) == U256::from_u32(env, 1)
}

/// True when `word < 2^WORD_BITS`.
fn fits_word(env: &Env, word: &U256) -> bool {
    word.shr(WORD_BITS) == U256::from_u32(env, 0)
}

fn write_bit(
    env: &Env,
    size: u32,
    mut map: Vec<U256>,
    position: u64,
    value: bool,
) -> Result<Vec<U256>, GridError> {
    let (index, offset) = locate(size, map.len(), position)?;
    let word = map.get(index).ok_or(GridError::WordIndexOutOfRange)?;
    if !fits_word(env, &word) {
        return Err(GridError::WordOverflow);
    }

    let is_set = bit_is_set(env, &word, offset);
    if is_set == value {
        return Ok(map);
    }
    let mask = U256::from_u32(env, 1).shl(offset);
    let updated = if value {
        word.add(&mask)
    } else {
        word.sub(&mask)
    };
    map.set(index, updated);
    Ok(map)
}

mod test;
