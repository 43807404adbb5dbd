//! Append-only store of lore entities.
//!
//! Each entity owns an ordered list of full-state revisions. Revision `n`
//! lives at index `n - 1` and is never touched after it is pushed; `props`
//! are fixed when the entity is created and shared by every revision.
//! Whitelists are consulted at write time only, so revoking an id later
//! never hides history that was valid when it was written.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::constants::{FIRST_ENTITY_ID, FIRST_REVISION_ID, UNCLASSIFIED_KIND};
use crate::error::LoreError;
use crate::whitelist::{Approval, Category, Whitelist};
use crate::word::Word;

pub type EntityId = u64;
pub type RevisionId = u64;

/// Two-word content link (e.g. a split content hash).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub part1: Word,
    pub part2: Word,
}

impl Content {
    pub const fn new(part1: Word, part2: Word) -> Self {
        Self { part1, part2 }
    }
}

/// 256-bit asset identifier split into 128-bit halves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetId {
    pub low: u128,
    pub high: u128,
}

impl AssetId {
    pub const fn new(low: u128, high: u128) -> Self {
        Self { low, high }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poi {
    pub id: u64,
    pub asset_id: AssetId,
}

impl Poi {
    pub const fn new(id: u64, asset_id: AssetId) -> Self {
        Self { id, asset_id }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prop {
    pub id: u64,
    pub value: Word,
}

impl Prop {
    pub const fn new(id: u64, value: Word) -> Self {
        Self { id, value }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub revision_id: RevisionId,
    pub content: Content,
    pub kind: u64,
    pub pois: Vec<Poi>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    entity_id: EntityId,
    owner: Word,
    props: Vec<Prop>,
    revisions: Vec<Revision>,
}

impl Entity {
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn owner(&self) -> &Word {
        &self.owner
    }

    pub fn props(&self) -> &[Prop] {
        &self.props
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    pub fn revision(&self, revision_id: RevisionId) -> Option<&Revision> {
        let index = revision_id.checked_sub(FIRST_REVISION_ID)?;
        self.revisions.get(usize::try_from(index).ok()?)
    }

    /// `None` only for an entity that was never given revision 1.
    pub fn latest(&self) -> Option<&Revision> {
        self.revisions.last()
    }

    fn latest_or_missing(&self) -> Result<&Revision, LoreError> {
        self.latest().ok_or(LoreError::RevisionNotFound {
            entity_id: self.entity_id,
            revision_id: FIRST_REVISION_ID,
        })
    }

    fn next_revision_id(&self) -> RevisionId {
        FIRST_REVISION_ID + self.revisions.len() as u64
    }
}

/// Flattened point-in-time view returned by [`LoreStore::get_entity`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub owner: Word,
    pub content: Content,
    pub kind: u64,
    pub pois: Vec<Poi>,
    pub props: Vec<Prop>,
}

/// Deserializing re-checks what the write path guarantees: entity ids run
/// from 1 in order, every entity has revision 1, revision ids run in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLoreStore")]
pub struct LoreStore {
    admin: Word,
    whitelist: Whitelist,
    entities: Vec<Entity>,
}

#[derive(Deserialize)]
struct RawLoreStore {
    admin: Word,
    whitelist: Whitelist,
    entities: Vec<Entity>,
}

impl TryFrom<RawLoreStore> for LoreStore {
    type Error = LoreError;

    fn try_from(raw: RawLoreStore) -> Result<Self, Self::Error> {
        for (index, entity) in raw.entities.iter().enumerate() {
            let entity_id = entity.entity_id;
            let malformed =
                |reason: &'static str| LoreError::MalformedEntity { entity_id, reason };
            if entity_id != FIRST_ENTITY_ID + index as u64 {
                return Err(malformed("entity ids are not sequential"));
            }
            if entity.revisions.is_empty() {
                return Err(malformed("no revisions"));
            }
            let ordered = entity
                .revisions
                .iter()
                .enumerate()
                .all(|(i, revision)| revision.revision_id == FIRST_REVISION_ID + i as u64);
            if !ordered {
                return Err(malformed("revision ids are not sequential"));
            }
        }
        Ok(Self {
            admin: raw.admin,
            whitelist: raw.whitelist,
            entities: raw.entities,
        })
    }
}

impl LoreStore {
    pub fn new(admin: Word) -> Self {
        Self {
            admin,
            whitelist: Whitelist::new(),
            entities: Vec::new(),
        }
    }

    pub fn admin(&self) -> &Word {
        &self.admin
    }

    pub fn registry(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Admin only.
    pub fn transfer_admin(&mut self, caller: &Word, new_admin: Word) -> Result<(), LoreError> {
        self.require_admin(caller)?;
        self.admin = new_admin;
        Ok(())
    }

    /// Admin only. Applies `approvals` to one category.
    pub fn whitelist(
        &mut self,
        caller: &Word,
        category: Category,
        approvals: &[Approval],
    ) -> Result<(), LoreError> {
        self.require_admin(caller)?;
        self.whitelist.whitelist(category, approvals);
        Ok(())
    }

    pub fn is_approved(&self, category: Category, id: u64) -> bool {
        self.whitelist.is_approved(category, id)
    }

    pub fn create_entity(
        &mut self,
        owner: Word,
        content: Content,
        kind: u64,
        pois: Vec<Poi>,
        props: Vec<Prop>,
    ) -> Result<EntityId, LoreError> {
        self.check_kind(kind)?;
        self.check_pois(&pois)?;
        self.check_props(&props)?;

        let entity_id = FIRST_ENTITY_ID + self.entities.len() as u64;
        self.entities.push(Entity {
            entity_id,
            owner,
            props,
            revisions: alloc::vec![Revision {
                revision_id: FIRST_REVISION_ID,
                content,
                kind,
                pois,
            }],
        });
        Ok(entity_id)
    }

    /// Appends a full replacement revision.
    ///
    /// `kind: None` carries the previous revision's kind over unchanged (it
    /// was validated when first written); `Some(kind)` is validated like a
    /// new entity's kind.
    pub fn add_revision(
        &mut self,
        entity_id: EntityId,
        content: Content,
        kind: Option<u64>,
        pois: Vec<Poi>,
    ) -> Result<RevisionId, LoreError> {
        let index = self.entity_index(entity_id)?;
        let kind = match kind {
            Some(kind) => {
                self.check_kind(kind)?;
                kind
            }
            None => self.entities[index].latest_or_missing()?.kind,
        };
        self.check_pois(&pois)?;

        let entity = &mut self.entities[index];
        let revision_id = entity.next_revision_id();
        entity.revisions.push(Revision {
            revision_id,
            content,
            kind,
            pois,
        });
        Ok(revision_id)
    }

    pub fn get_entity(
        &self,
        entity_id: EntityId,
        revision_id: RevisionId,
    ) -> Result<EntityRecord, LoreError> {
        let entity = self.entity(entity_id)?;
        let revision = entity
            .revision(revision_id)
            .ok_or(LoreError::RevisionNotFound {
                entity_id,
                revision_id,
            })?;
        Ok(EntityRecord {
            owner: entity.owner,
            content: revision.content,
            kind: revision.kind,
            pois: revision.pois.clone(),
            props: entity.props.clone(),
        })
    }

    pub fn entity(&self, entity_id: EntityId) -> Result<&Entity, LoreError> {
        let index = self.entity_index(entity_id)?;
        Ok(&self.entities[index])
    }

    pub fn latest_revision_id(&self, entity_id: EntityId) -> Result<RevisionId, LoreError> {
        Ok(self.entity(entity_id)?.latest_or_missing()?.revision_id)
    }

    pub fn revisions(&self, entity_id: EntityId) -> Result<&[Revision], LoreError> {
        Ok(self.entity(entity_id)?.revisions())
    }

    pub fn entity_count(&self) -> u64 {
        self.entities.len() as u64
    }

    pub fn entities_owned_by<'a>(&'a self, owner: &'a Word) -> impl Iterator<Item = &'a Entity> {
        self.entities.iter().filter(move |e| e.owner == *owner)
    }

    fn entity_index(&self, entity_id: EntityId) -> Result<usize, LoreError> {
        entity_id
            .checked_sub(FIRST_ENTITY_ID)
            .and_then(|index| usize::try_from(index).ok())
            .filter(|index| *index < self.entities.len())
            .ok_or(LoreError::EntityNotFound { entity_id })
    }

    fn require_admin(&self, caller: &Word) -> Result<(), LoreError> {
        if *caller != self.admin {
            return Err(LoreError::NotAdmin);
        }
        Ok(())
    }

    fn check_kind(&self, kind: u64) -> Result<(), LoreError> {
        if kind != UNCLASSIFIED_KIND && !self.whitelist.is_kind_approved(kind) {
            return Err(LoreError::KindNotWhitelisted { kind });
        }
        Ok(())
    }

    fn check_pois(&self, pois: &[Poi]) -> Result<(), LoreError> {
        match pois.iter().find(|p| !self.whitelist.is_poi_approved(p.id)) {
            Some(poi) => Err(LoreError::PoiNotWhitelisted { poi: poi.id }),
            None => Ok(()),
        }
    }

    fn check_props(&self, props: &[Prop]) -> Result<(), LoreError> {
        match props.iter().find(|p| !self.whitelist.is_prop_approved(p.id)) {
            Some(prop) => Err(LoreError::PropNotWhitelisted { prop: prop.id }),
            None => Ok(()),
        }
    }
}
