#![no_std]

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Env, Vec, U256,
};

/// Kind id accepted without whitelisting.
pub const UNCLASSIFIED_KIND: u32 = 0;

#[contracttype]
enum DataKey {
    Admin,
    EntityCount,
    Kind(u32),
    Poi(u32),
    Prop(u32),
    Entity(u64),
    Revision(u64, u32),
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum LoreError {
    KindNotWhitelisted = 1,
    PoiNotWhitelisted = 2,
    PropNotWhitelisted = 3,
    EntityNotFound = 4,
    RevisionNotFound = 5,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Category {
    Kind = 0,
    PointOfInterest = 1,
    Property = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Approval {
    pub id: u32,
    pub approved: bool,
}

/// Two-part content link.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Content {
    pub part1: U256,
    pub part2: U256,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetId {
    pub low: u128,
    pub high: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Poi {
    pub id: u32,
    pub asset_id: AssetId,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Prop {
    pub id: u32,
    pub value: U256,
}

// Entity header and revisions are stored under separate keys so an append
// writes one new revision entry plus a small header update.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
struct EntityHeader {
    owner: Address,
    props: Vec<Prop>,
    revision_count: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Revision {
    pub content: Content,
    pub kind: u32,
    pub pois: Vec<Poi>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityRecord {
    pub owner: Address,
    pub content: Content,
    pub kind: u32,
    pub pois: Vec<Poi>,
    pub props: Vec<Prop>,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityCreated {
    pub entity_id: u64,
    pub owner: Address,
    pub kind: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RevisionAdded {
    pub entity_id: u64,
    pub revision_id: u32,
    pub kind: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WhitelistUpdated {
    pub category: Category,
    pub count: u32,
}

#[contract]
pub struct LoreContract;

#[contractimpl]
impl LoreContract {
    pub fn __constructor(env: Env, admin: Address) {
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::EntityCount, &0u64);
    }

    /// Admin: approve or revoke kinds.
    pub fn whitelist_kinds(env: Env, approvals: Vec<Approval>) {
        whitelist(&env, Category::Kind, approvals);
    }

    /// Admin: approve or revoke points of interest.
    pub fn whitelist_pois(env: Env, approvals: Vec<Approval>) {
        whitelist(&env, Category::PointOfInterest, approvals);
    }

    /// Admin: approve or revoke properties.
    pub fn whitelist_props(env: Env, approvals: Vec<Approval>) {
        whitelist(&env, Category::Property, approvals);
    }

    /// Unknown ids are simply not approved.
    pub fn is_approved(env: Env, category: Category, id: u32) -> bool {
        is_approved(&env, category, id)
    }

    /// Create an entity owned by `owner` with revision 1.
    ///
    /// Every kind, poi and prop id must be whitelisted (kind 0 always is).
    /// `props` are fixed for the life of the entity.
    pub fn create_entity(
        env: Env,
        owner: Address,
        content: Content,
        kind: u32,
        pois: Vec<Poi>,
        props: Vec<Prop>,
    ) -> Result<u64, LoreError> {
        owner.require_auth();

        check_kind(&env, kind)?;
        check_pois(&env, &pois)?;
        for prop in props.iter() {
            if !is_approved(&env, Category::Property, prop.id) {
                return Err(LoreError::PropNotWhitelisted);
            }
        }

        let entity_id = env
            .storage()
            .instance()
            .get::<_, u64>(&DataKey::EntityCount)
            .unwrap_or(0)
            + 1;
        env.storage()
            .instance()
            .set(&DataKey::EntityCount, &entity_id);

        env.storage().persistent().set(
            &DataKey::Entity(entity_id),
            &EntityHeader {
                owner: owner.clone(),
                props,
                revision_count: 1,
            },
        );
        env.storage().persistent().set(
            &DataKey::Revision(entity_id, 1),
            &Revision {
                content,
                kind,
                pois,
            },
        );

        EntityCreated {
            entity_id,
            owner,
            kind,
        }
        .publish(&env);

        Ok(entity_id)
    }

    /// Append a full replacement revision.
    ///
    /// `kind: None` keeps the latest revision's kind as is; `Some(kind)` must
    /// be whitelisted. `pois` replace the previous list entirely.
    pub fn add_revision(
        env: Env,
        entity_id: u64,
        content: Content,
        kind: Option<u32>,
        pois: Vec<Poi>,
    ) -> Result<u32, LoreError> {
        let mut header = load_header(&env, entity_id)?;

        let kind = match kind {
            Some(kind) => {
                check_kind(&env, kind)?;
                kind
            }
            None => load_revision(&env, entity_id, header.revision_count)?.kind,
        };
        check_pois(&env, &pois)?;

        let revision_id = header.revision_count + 1;
        header.revision_count = revision_id;
        env.storage()
            .persistent()
            .set(&DataKey::Entity(entity_id), &header);
        env.storage().persistent().set(
            &DataKey::Revision(entity_id, revision_id),
            &Revision {
                content,
                kind,
                pois,
            },
        );

        RevisionAdded {
            entity_id,
            revision_id,
            kind,
        }
        .publish(&env);

        Ok(revision_id)
    }

    /// Read one revision of an entity, with the entity's owner and props.
    pub fn get_entity(env: Env, entity_id: u64, revision_id: u32) -> Result<EntityRecord, LoreError> {
        let header = load_header(&env, entity_id)?;
        let revision = load_revision(&env, entity_id, revision_id)?;
        Ok(EntityRecord {
            owner: header.owner,
            content: revision.content,
            kind: revision.kind,
            pois: revision.pois,
            props: header.props,
        })
    }

    pub fn entity_count(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::EntityCount)
            .unwrap_or(0)
    }

    pub fn revision_count(env: Env, entity_id: u64) -> Result<u32, LoreError> {
        Ok(load_header(&env, entity_id)?.revision_count)
    }

    pub fn admin(env: Env) -> Address {
        env.storage().instance().get(&DataKey::Admin).unwrap()
    }

    /// Admin: transfer admin role.
    pub fn set_admin(env: Env, new_admin: Address) {
        let admin: Address = env.storage().instance().get(&DataKey::Admin).unwrap();
        admin.require_auth();
        env.storage().instance().set(&DataKey::Admin, &new_admin);
    }
}

fn whitelist_key(category: Category, id: u32) -> DataKey {
    match category {
        Category::Kind => DataKey::Kind(id),
        Category::PointOfInterest => DataKey::Poi(id),
        Category::Property => DataKey::Prop(id),
    }
}

fn whitelist(env: &Env, category: Category, approvals: Vec<Approval>) {
    let admin: Address = env.storage().instance().get(&DataKey::Admin).unwrap();
    admin.require_auth();

    // Applied in order: a repeated id keeps its last flag.
    for approval in approvals.iter() {
        env.storage()
            .persistent()
            .set(&whitelist_key(category, approval.id), &approval.approved);
    }

    WhitelistUpdated {
        category,
        count: approvals.len(),
    }
    .publish(env);
}

fn is_approved(env: &Env, category: Category, id: u32) -> bool {
    env.storage()
        .persistent()
        .get(&whitelist_key(category, id))
        .unwrap_or(false)
}

fn check_kind(env: &Env, kind: u32) -> Result<(), LoreError> {
    if kind != UNCLASSIFIED_KIND && !is_approved(env, Category::Kind, kind) {
        return Err(LoreError::KindNotWhitelisted);
    }
    Ok(())
}

fn check_pois(env: &Env, pois: &Vec<Poi>) -> Result<(), LoreError> {
    for poi in pois.iter() {
        if !is_approved(env, Category::PointOfInterest, poi.id) {
            return Err(LoreError::PoiNotWhitelisted);
        }
    }
    Ok(())
}

fn load_header(env: &Env, entity_id: u64) -> Result<EntityHeader, LoreError> {
    env.storage()
        .persistent()
        .get(&DataKey::Entity(entity_id))
        .ok_or(LoreError::EntityNotFound)
}

fn load_revision(env: &Env, entity_id: u64, revision_id: u32) -> Result<Revision, LoreError> {
    env.storage()
        .persistent()
        .get(&DataKey::Revision(entity_id, revision_id))
        .ok_or(LoreError::RevisionNotFound)
}
