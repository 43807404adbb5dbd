use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Kind,
    PointOfInterest,
    Property,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Kind, Self::PointOfInterest, Self::Property];

    /// Wire code used by the calldata ABI.
    pub fn code(self) -> u64 {
        match self {
            Self::Kind => 0,
            Self::PointOfInterest => 1,
            Self::Property => 2,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Kind),
            1 => Some(Self::PointOfInterest),
            2 => Some(Self::Property),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kind => "kind",
            Self::PointOfInterest => "poi",
            Self::Property => "prop",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub id: u64,
    pub approved: bool,
}

impl Approval {
    pub fn approve(id: u64) -> Self {
        Self { id, approved: true }
    }

    pub fn revoke(id: u64) -> Self {
        Self {
            id,
            approved: false,
        }
    }
}

/// Allow-lists for the three categorical references an entity can make.
///
/// Entries are only ever overwritten; a revoked id stays in the map with
/// `false`. Unknown ids read as not approved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitelist {
    kinds: BTreeMap<u64, bool>,
    pois: BTreeMap<u64, bool>,
    props: BTreeMap<u64, bool>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `approvals` in order, so a repeated id keeps its last flag.
    pub fn whitelist(&mut self, category: Category, approvals: &[Approval]) {
        let set = self.set_mut(category);
        for approval in approvals {
            set.insert(approval.id, approval.approved);
        }
    }

    pub fn is_approved(&self, category: Category, id: u64) -> bool {
        lookup(self.set(category), id)
    }

    pub fn is_kind_approved(&self, kind: u64) -> bool {
        lookup(&self.kinds, kind)
    }

    pub fn is_poi_approved(&self, poi: u64) -> bool {
        lookup(&self.pois, poi)
    }

    pub fn is_prop_approved(&self, prop: u64) -> bool {
        lookup(&self.props, prop)
    }

    /// Currently approved ids, ascending.
    pub fn approved_ids(&self, category: Category) -> Vec<u64> {
        self.set(category)
            .iter()
            .filter(|(_, approved)| **approved)
            .map(|(id, _)| *id)
            .collect()
    }

    fn set(&self, category: Category) -> &BTreeMap<u64, bool> {
        match category {
            Category::Kind => &self.kinds,
            Category::PointOfInterest => &self.pois,
            Category::Property => &self.props,
        }
    }

    fn set_mut(&mut self, category: Category) -> &mut BTreeMap<u64, bool> {
        match category {
            Category::Kind => &mut self.kinds,
            Category::PointOfInterest => &mut self.pois,
            Category::Property => &mut self.props,
        }
    }
}

fn lookup(set: &BTreeMap<u64, bool>, id: u64) -> bool {
    set.get(&id).copied().unwrap_or(false)
}
