//! Flat calldata protocol.
//!
//! Every argument is a word and every sequence is prefixed by its length:
//!
//! ```text
//! whitelist_kinds   n, (id, flag)*n
//! create_entity     part1, part2, kind, n, (poi, asset_low, asset_high)*n, m, (prop, value)*m
//! add_revision      entity_id, part1, part2, n, (poi, asset_low, asset_high)*n
//! get_entity        entity_id, revision_id
//! get_bit           size, map_len, map*map_len, position
//! ```
//!
//! Results come back in the same flat shape.

use alloc::string::ToString;
use alloc::{vec, vec::Vec};

use crate::error::{CalldataError, InvokeError};
use crate::grid::{self, GridLayout};
use crate::lore::{AssetId, Content, EntityId, EntityRecord, LoreStore, Poi, Prop, RevisionId};
use crate::whitelist::{Approval, Category};
use crate::word::Word;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    CalcSize {
        size: u32,
    },
    GetBit {
        size: u32,
        map: Vec<Word>,
        position: u64,
    },
    SetBit {
        size: u32,
        map: Vec<Word>,
        position: u64,
    },
    ClearBit {
        size: u32,
        map: Vec<Word>,
        position: u64,
    },
    Whitelist {
        category: Category,
        approvals: Vec<Approval>,
    },
    IsApproved {
        category: Category,
        id: u64,
    },
    CreateEntity {
        content: Content,
        kind: u64,
        pois: Vec<Poi>,
        props: Vec<Prop>,
    },
    AddRevision {
        entity_id: EntityId,
        content: Content,
        kind: Option<u64>,
        pois: Vec<Poi>,
    },
    GetEntity {
        entity_id: EntityId,
        revision_id: RevisionId,
    },
}

pub const FUNCTIONS: [&str; 12] = [
    "calc_size",
    "get_bit",
    "set_bit",
    "clear_bit",
    "whitelist_kinds",
    "whitelist_pois",
    "whitelist_props",
    "is_approved",
    "create_entity",
    "add_revision",
    "add_revision_with_kind",
    "get_entity",
];

impl Call {
    pub fn decode(function: &str, calldata: &[Word]) -> Result<Self, CalldataError> {
        let mut reader = Reader::new(calldata);
        let call = match function {
            "calc_size" => Self::CalcSize {
                size: reader.u32("size")?,
            },
            "get_bit" => {
                let (size, map, position) = reader.grid_args()?;
                Self::GetBit {
                    size,
                    map,
                    position,
                }
            }
            "set_bit" => {
                let (size, map, position) = reader.grid_args()?;
                Self::SetBit {
                    size,
                    map,
                    position,
                }
            }
            "clear_bit" => {
                let (size, map, position) = reader.grid_args()?;
                Self::ClearBit {
                    size,
                    map,
                    position,
                }
            }
            "whitelist_kinds" => Self::Whitelist {
                category: Category::Kind,
                approvals: reader.approvals()?,
            },
            "whitelist_pois" => Self::Whitelist {
                category: Category::PointOfInterest,
                approvals: reader.approvals()?,
            },
            "whitelist_props" => Self::Whitelist {
                category: Category::Property,
                approvals: reader.approvals()?,
            },
            "is_approved" => {
                let code = reader.u64("category")?;
                let category =
                    Category::from_code(code).ok_or(CalldataError::UnknownCategory { code })?;
                Self::IsApproved {
                    category,
                    id: reader.u64("id")?,
                }
            }
            "create_entity" => Self::CreateEntity {
                content: reader.content()?,
                kind: reader.u64("kind")?,
                pois: reader.pois()?,
                props: reader.props()?,
            },
            "add_revision" => Self::AddRevision {
                entity_id: reader.u64("entity_id")?,
                content: reader.content()?,
                kind: None,
                pois: reader.pois()?,
            },
            "add_revision_with_kind" => Self::AddRevision {
                entity_id: reader.u64("entity_id")?,
                content: reader.content()?,
                kind: Some(reader.u64("kind")?),
                pois: reader.pois()?,
            },
            "get_entity" => Self::GetEntity {
                entity_id: reader.u64("entity_id")?,
                revision_id: reader.u64("revision_id")?,
            },
            other => return Err(CalldataError::UnknownFunction(other.to_string())),
        };
        reader.finish()?;
        Ok(call)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CalcSize { .. } => "calc_size",
            Self::GetBit { .. } => "get_bit",
            Self::SetBit { .. } => "set_bit",
            Self::ClearBit { .. } => "clear_bit",
            Self::Whitelist { category, .. } => match category {
                Category::Kind => "whitelist_kinds",
                Category::PointOfInterest => "whitelist_pois",
                Category::Property => "whitelist_props",
            },
            Self::IsApproved { .. } => "is_approved",
            Self::CreateEntity { .. } => "create_entity",
            Self::AddRevision { kind: None, .. } => "add_revision",
            Self::AddRevision { kind: Some(_), .. } => "add_revision_with_kind",
            Self::GetEntity { .. } => "get_entity",
        }
    }

    /// Whether executing the call changes the lore store.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Whitelist { .. } | Self::CreateEntity { .. } | Self::AddRevision { .. }
        )
    }
}

/// Runs a decoded call. Grid calls are pure and never touch `store`.
pub fn execute(
    store: &mut LoreStore,
    word_bits: u32,
    caller: &Word,
    call: Call,
) -> Result<Vec<Word>, InvokeError> {
    let out = match call {
        Call::CalcSize { size } => vec![Word::from(u64::from(grid::calc_size(size, word_bits)?))],
        Call::GetBit {
            size,
            map,
            position,
        } => {
            let layout = GridLayout::new(size, word_bits)?;
            let bit = grid::get_bit(&map, &layout, position)?;
            vec![Word::from(u64::from(bit))]
        }
        Call::SetBit {
            size,
            map,
            position,
        } => {
            let layout = GridLayout::new(size, word_bits)?;
            encode_words(&grid::set_bit(&map, &layout, position)?)
        }
        Call::ClearBit {
            size,
            map,
            position,
        } => {
            let layout = GridLayout::new(size, word_bits)?;
            encode_words(&grid::clear_bit(&map, &layout, position)?)
        }
        Call::Whitelist {
            category,
            approvals,
        } => {
            store.whitelist(caller, category, &approvals)?;
            Vec::new()
        }
        Call::IsApproved { category, id } => {
            vec![Word::from(u64::from(store.is_approved(category, id)))]
        }
        Call::CreateEntity {
            content,
            kind,
            pois,
            props,
        } => {
            let entity_id = store.create_entity(*caller, content, kind, pois, props)?;
            vec![Word::from(entity_id)]
        }
        Call::AddRevision {
            entity_id,
            content,
            kind,
            pois,
        } => {
            let revision_id = store.add_revision(entity_id, content, kind, pois)?;
            vec![Word::from(revision_id)]
        }
        Call::GetEntity {
            entity_id,
            revision_id,
        } => encode_entity_record(&store.get_entity(entity_id, revision_id)?),
    };
    Ok(out)
}

/// `owner, part1, part2, kind, n, (poi, low, high)*n, m, (prop, value)*m`
pub fn encode_entity_record(record: &EntityRecord) -> Vec<Word> {
    let mut out = Vec::with_capacity(6 + record.pois.len() * 3 + record.props.len() * 2);
    out.push(record.owner);
    out.push(record.content.part1);
    out.push(record.content.part2);
    out.push(Word::from(record.kind));
    out.push(Word::from(record.pois.len() as u64));
    for poi in &record.pois {
        out.push(Word::from(poi.id));
        out.push(Word::from(poi.asset_id.low));
        out.push(Word::from(poi.asset_id.high));
    }
    out.push(Word::from(record.props.len() as u64));
    for prop in &record.props {
        out.push(Word::from(prop.id));
        out.push(prop.value);
    }
    out
}

fn encode_words(words: &[Word]) -> Vec<Word> {
    let mut out = Vec::with_capacity(words.len() + 1);
    out.push(Word::from(words.len() as u64));
    out.extend_from_slice(words);
    out
}

struct Reader<'a> {
    data: &'a [Word],
    cursor: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [Word]) -> Self {
        Self { data, cursor: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    fn word(&mut self) -> Result<Word, CalldataError> {
        let word = *self.data.get(self.cursor).ok_or(CalldataError::Truncated {
            needed: 1,
            remaining: 0,
        })?;
        self.cursor += 1;
        Ok(word)
    }

    fn u64(&mut self, field: &'static str) -> Result<u64, CalldataError> {
        self.word()?
            .to_u64()
            .ok_or(CalldataError::ValueOutOfRange { field })
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, CalldataError> {
        u32::try_from(self.u64(field)?).map_err(|_| CalldataError::ValueOutOfRange { field })
    }

    fn u128(&mut self, field: &'static str) -> Result<u128, CalldataError> {
        self.word()?
            .to_u128()
            .ok_or(CalldataError::ValueOutOfRange { field })
    }

    /// Reads a sequence length and checks that `count * stride` words follow,
    /// before anything is allocated for them.
    fn count(&mut self, field: &'static str, stride: usize) -> Result<usize, CalldataError> {
        let count = usize::try_from(self.u64(field)?)
            .map_err(|_| CalldataError::ValueOutOfRange { field })?;
        let needed = count
            .checked_mul(stride)
            .ok_or(CalldataError::ValueOutOfRange { field })?;
        let remaining = self.remaining();
        if needed > remaining {
            return Err(CalldataError::Truncated { needed, remaining });
        }
        Ok(count)
    }

    fn content(&mut self) -> Result<Content, CalldataError> {
        Ok(Content::new(self.word()?, self.word()?))
    }

    fn approvals(&mut self) -> Result<Vec<Approval>, CalldataError> {
        let count = self.count("approval_count", 2)?;
        let mut approvals = Vec::with_capacity(count);
        for _ in 0..count {
            approvals.push(Approval {
                id: self.u64("whitelist_id")?,
                approved: !self.word()?.is_zero(),
            });
        }
        Ok(approvals)
    }

    fn pois(&mut self) -> Result<Vec<Poi>, CalldataError> {
        let count = self.count("poi_count", 3)?;
        let mut pois = Vec::with_capacity(count);
        for _ in 0..count {
            let id = self.u64("poi_id")?;
            let low = self.u128("asset_id_low")?;
            let high = self.u128("asset_id_high")?;
            pois.push(Poi::new(id, AssetId::new(low, high)));
        }
        Ok(pois)
    }

    fn props(&mut self) -> Result<Vec<Prop>, CalldataError> {
        let count = self.count("prop_count", 2)?;
        let mut props = Vec::with_capacity(count);
        for _ in 0..count {
            props.push(Prop::new(self.u64("prop_id")?, self.word()?));
        }
        Ok(props)
    }

    fn grid_args(&mut self) -> Result<(u32, Vec<Word>, u64), CalldataError> {
        let size = self.u32("size")?;
        let map_len = self.count("map_len", 1)?;
        let map = self.data[self.cursor..self.cursor + map_len].to_vec();
        self.cursor += map_len;
        // Positions past u64 are past every grid; saturate so the grid layer
        // reports them as out of range.
        let position = self.word()?.to_u64().unwrap_or(u64::MAX);
        Ok((size, map, position))
    }

    fn finish(self) -> Result<(), CalldataError> {
        match self.remaining() {
            0 => Ok(()),
            extra => Err(CalldataError::TrailingData { extra }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(values: &[u64]) -> Vec<Word> {
        values.iter().copied().map(Word::from).collect()
    }

    #[test]
    fn decodes_create_entity_vector() {
        let calldata = words(&[101, 102, 0, 2, 1, 1, 0, 2, 1, 0, 2, 1, 1, 2, 1]);
        let call = Call::decode("create_entity", &calldata).unwrap();
        assert_eq!(
            call,
            Call::CreateEntity {
                content: Content::new(Word::from(101u64), Word::from(102u64)),
                kind: 0,
                pois: vec![
                    Poi::new(1, AssetId::new(1, 0)),
                    Poi::new(2, AssetId::new(1, 0)),
                ],
                props: vec![
                    Prop::new(1, Word::from(1u64)),
                    Prop::new(2, Word::from(1u64)),
                ],
            }
        );
        assert!(call.is_mutating());
    }

    #[test]
    fn counts_are_checked_before_reading() {
        let calldata = words(&[1_000_000, 1, 1]);
        assert_eq!(
            Call::decode("whitelist_kinds", &calldata),
            Err(CalldataError::Truncated {
                needed: 2_000_000,
                remaining: 2
            })
        );
    }

    #[test]
    fn trailing_words_are_rejected() {
        assert_eq!(
            Call::decode("get_entity", &words(&[1, 1, 9])),
            Err(CalldataError::TrailingData { extra: 1 })
        );
    }

    #[test]
    fn oversized_ids_are_out_of_range() {
        let mut calldata = words(&[1]);
        calldata.push(Word::from_halves(0, 1));
        calldata.push(Word::ONE);
        assert_eq!(
            Call::decode("whitelist_pois", &calldata),
            Err(CalldataError::ValueOutOfRange {
                field: "whitelist_id"
            })
        );
    }

    #[test]
    fn unknown_function_is_reported() {
        assert_eq!(
            Call::decode("burn_entity", &[]),
            Err(CalldataError::UnknownFunction("burn_entity".to_string()))
        );
    }

    #[test]
    fn every_listed_function_decodes_to_its_own_name() {
        let samples: [(&str, &[u64]); 12] = [
            ("calc_size", &[5]),
            ("get_bit", &[5, 1, 0, 3]),
            ("set_bit", &[5, 1, 0, 3]),
            ("clear_bit", &[5, 1, 0, 3]),
            ("whitelist_kinds", &[0]),
            ("whitelist_pois", &[0]),
            ("whitelist_props", &[0]),
            ("is_approved", &[1, 4]),
            ("create_entity", &[1, 2, 0, 0, 0]),
            ("add_revision", &[1, 1, 2, 0]),
            ("add_revision_with_kind", &[1, 1, 2, 3, 0]),
            ("get_entity", &[1, 1]),
        ];
        for ((function, args), listed) in samples.iter().zip(FUNCTIONS) {
            assert_eq!(*function, listed);
            let call = Call::decode(function, &words(args)).unwrap();
            assert_eq!(call.name(), listed);
        }
    }
}
