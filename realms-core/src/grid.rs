//! Square boolean grids packed row-major into fixed-width words.
//!
//! A `linear_size x linear_size` grid occupies `linear_size^2` bit positions.
//! Position `p` lives in word `p / word_bits` at bit `p % word_bits`, so a
//! bit never straddles two words and bits `word_bits..256` of every word stay
//! unused.

use alloc::{vec, vec::Vec};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_WORD_BITS, MAX_WORD_BITS};
use crate::error::GridError;
use crate::word::Word;

/// Number of words needed to hold a `linear_size x linear_size` grid.
pub fn calc_size(linear_size: u32, word_bits: u32) -> Result<u32, GridError> {
    check_word_bits(word_bits)?;
    if linear_size == 0 {
        return Err(GridError::InvalidSize { linear_size });
    }
    let bits = u64::from(linear_size) * u64::from(linear_size);
    let words = bits.div_ceil(u64::from(word_bits));
    u32::try_from(words).map_err(|_| GridError::InvalidSize { linear_size })
}

fn check_word_bits(word_bits: u32) -> Result<(), GridError> {
    if word_bits == 0 || word_bits > MAX_WORD_BITS {
        return Err(GridError::InvalidWordBits { word_bits });
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitAddress {
    pub word_index: usize,
    pub bit_offset: u32,
}

/// Validated grid geometry: side length, word width and the word count the
/// planner derived from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLayout", into = "RawLayout")]
pub struct GridLayout {
    linear_size: u32,
    word_bits: u32,
    word_count: u32,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct RawLayout {
    linear_size: u32,
    word_bits: u32,
}

impl TryFrom<RawLayout> for GridLayout {
    type Error = GridError;

    fn try_from(raw: RawLayout) -> Result<Self, Self::Error> {
        Self::new(raw.linear_size, raw.word_bits)
    }
}

impl From<GridLayout> for RawLayout {
    fn from(layout: GridLayout) -> Self {
        Self {
            linear_size: layout.linear_size,
            word_bits: layout.word_bits,
        }
    }
}

impl GridLayout {
    pub fn new(linear_size: u32, word_bits: u32) -> Result<Self, GridError> {
        let word_count = calc_size(linear_size, word_bits)?;
        Ok(Self {
            linear_size,
            word_bits,
            word_count,
        })
    }

    pub fn with_default_width(linear_size: u32) -> Result<Self, GridError> {
        Self::new(linear_size, DEFAULT_WORD_BITS)
    }

    pub fn linear_size(&self) -> u32 {
        self.linear_size
    }

    pub fn word_bits(&self) -> u32 {
        self.word_bits
    }

    pub fn word_count(&self) -> u32 {
        self.word_count
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.linear_size) * u64::from(self.linear_size)
    }

    /// Row-major position of `(row, col)`.
    pub fn position_of(&self, row: u32, col: u32) -> Result<u64, GridError> {
        if row >= self.linear_size || col >= self.linear_size {
            return Err(GridError::CellOutOfRange {
                row,
                col,
                linear_size: self.linear_size,
            });
        }
        Ok(u64::from(row) * u64::from(self.linear_size) + u64::from(col))
    }

    /// Resolves `position` against a map of `word_len` words. The map must
    /// hold at least `word_count` words whichever word `position` lands in.
    pub fn locate(&self, position: u64, word_len: usize) -> Result<BitAddress, GridError> {
        let cell_count = self.cell_count();
        if position >= cell_count {
            return Err(GridError::PositionOutOfRange {
                position,
                cell_count,
            });
        }
        if word_len < self.word_count as usize {
            return Err(GridError::MapTooShort {
                expected: self.word_count,
                actual: word_len,
            });
        }

        let word_bits = u64::from(self.word_bits);
        let raw_index = position / word_bits;
        let bit_offset = (position % word_bits) as u32;
        let word_index = usize::try_from(raw_index)
            .ok()
            .filter(|index| *index < word_len)
            .ok_or(GridError::WordIndexOutOfRange {
                word_index: raw_index,
                len: word_len,
            })?;

        Ok(BitAddress {
            word_index,
            bit_offset,
        })
    }
}

pub fn get_bit(words: &[Word], layout: &GridLayout, position: u64) -> Result<bool, GridError> {
    let addr = layout.locate(position, words.len())?;
    Ok(words[addr.word_index].bit(addr.bit_offset))
}

/// Returns a copy of `words` with the bit at `position` set.
pub fn set_bit(words: &[Word], layout: &GridLayout, position: u64) -> Result<Vec<Word>, GridError> {
    let mut out = words.to_vec();
    write_bit(&mut out, layout, position, true)?;
    Ok(out)
}

/// Returns a copy of `words` with the bit at `position` cleared.
pub fn clear_bit(
    words: &[Word],
    layout: &GridLayout,
    position: u64,
) -> Result<Vec<Word>, GridError> {
    let mut out = words.to_vec();
    write_bit(&mut out, layout, position, false)?;
    Ok(out)
}

fn write_bit(
    words: &mut [Word],
    layout: &GridLayout,
    position: u64,
    value: bool,
) -> Result<(), GridError> {
    let addr = layout.locate(position, words.len())?;
    let word = words[addr.word_index];
    if !word.fits_in(layout.word_bits) {
        return Err(GridError::WordOverflow {
            word_index: addr.word_index,
            word_bits: layout.word_bits,
        });
    }
    words[addr.word_index] = if value {
        word.with_bit(addr.bit_offset)
    } else {
        word.without_bit(addr.bit_offset)
    };
    Ok(())
}

/// A grid together with the words that back it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitmapGrid {
    layout: GridLayout,
    words: Vec<Word>,
}

impl BitmapGrid {
    /// All-clear grid with exactly `layout.word_count()` words.
    pub fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            words: vec![Word::ZERO; layout.word_count as usize],
        }
    }

    /// Adopts an existing map. Rejects maps shorter than the planned word
    /// count and words wider than the layout's word width.
    pub fn from_words(layout: GridLayout, words: Vec<Word>) -> Result<Self, GridError> {
        if words.len() < layout.word_count as usize {
            return Err(GridError::MapTooShort {
                expected: layout.word_count,
                actual: words.len(),
            });
        }
        if let Some(word_index) = words.iter().position(|w| !w.fits_in(layout.word_bits)) {
            return Err(GridError::WordOverflow {
                word_index,
                word_bits: layout.word_bits,
            });
        }
        Ok(Self { layout, words })
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn into_words(self) -> Vec<Word> {
        self.words
    }

    pub fn get(&self, position: u64) -> Result<bool, GridError> {
        get_bit(&self.words, &self.layout, position)
    }

    pub fn set(&mut self, position: u64) -> Result<(), GridError> {
        write_bit(&mut self.words, &self.layout, position, true)
    }

    pub fn clear(&mut self, position: u64) -> Result<(), GridError> {
        write_bit(&mut self.words, &self.layout, position, false)
    }

    pub fn get_cell(&self, row: u32, col: u32) -> Result<bool, GridError> {
        self.get(self.layout.position_of(row, col)?)
    }

    pub fn set_cell(&mut self, row: u32, col: u32) -> Result<(), GridError> {
        let position = self.layout.position_of(row, col)?;
        self.set(position)
    }

    pub fn count_set(&self) -> u32 {
        self.words.iter().map(Word::count_ones).sum()
    }
}
