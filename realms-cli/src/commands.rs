use std::path::Path;

use anyhow::{bail, Context, Result};
use realms_core::abi::{self, Call};
use realms_core::{
    Approval, BitmapGrid, Category, Content, EntityId, EntityRecord, GridLayout, Poi, Prop,
    Revision, RevisionId, Word,
};
use tracing::info;

use crate::config::CliConfig;
use crate::state::{self, WorldState};

pub fn init(path: &Path, admin: Word, force: bool) -> Result<WorldState> {
    if path.exists() && !force {
        bail!(
            "state file {} already exists (pass --force to overwrite)",
            path.display()
        );
    }
    let state = WorldState::new(admin);
    state.save(path)?;
    info!(path = %path.display(), admin = %admin, "initialised lore state");
    Ok(state)
}

pub fn whitelist(
    config: &CliConfig,
    category: Category,
    ids: &[u64],
    revoke: bool,
) -> Result<()> {
    let approvals: Vec<Approval> = ids
        .iter()
        .map(|&id| Approval { id, approved: !revoke })
        .collect();
    state::update(&config.state_path, |state| {
        state
            .lore
            .whitelist(&config.caller, category, &approvals)
            .context("whitelist update rejected")?;
        info!(%category, count = approvals.len(), revoke, "whitelist updated");
        Ok(())
    })
}

pub fn approved(config: &CliConfig, category: Category) -> Result<Vec<u64>> {
    let state = WorldState::load(&config.state_path)?;
    Ok(state.lore.registry().approved_ids(category))
}

pub fn create(
    config: &CliConfig,
    content: Content,
    kind: u64,
    pois: Vec<Poi>,
    props: Vec<Prop>,
) -> Result<EntityId> {
    state::update(&config.state_path, |state| {
        let entity_id = state
            .lore
            .create_entity(config.caller, content, kind, pois, props)
            .context("entity rejected")?;
        info!(entity_id, kind, owner = %config.caller, "entity created");
        Ok(entity_id)
    })
}

pub fn revise(
    config: &CliConfig,
    entity_id: EntityId,
    content: Content,
    kind: Option<u64>,
    pois: Vec<Poi>,
) -> Result<RevisionId> {
    state::update(&config.state_path, |state| {
        let revision_id = state
            .lore
            .add_revision(entity_id, content, kind, pois)
            .context("revision rejected")?;
        info!(entity_id, revision_id, "revision added");
        Ok(revision_id)
    })
}

/// Reads `revision_id`, or the latest revision when `None`.
pub fn show(
    config: &CliConfig,
    entity_id: EntityId,
    revision_id: Option<RevisionId>,
) -> Result<(RevisionId, EntityRecord)> {
    let state = WorldState::load(&config.state_path)?;
    let revision_id = match revision_id {
        Some(id) => id,
        None => state.lore.latest_revision_id(entity_id)?,
    };
    let record = state.lore.get_entity(entity_id, revision_id)?;
    Ok((revision_id, record))
}

pub fn history(config: &CliConfig, entity_id: EntityId) -> Result<Vec<Revision>> {
    let state = WorldState::load(&config.state_path)?;
    Ok(state.lore.revisions(entity_id)?.to_vec())
}

/// Loads `words` into a grid, checking the map against the layout.
pub fn grid(config: &CliConfig, size: u32, words: Vec<Word>) -> Result<BitmapGrid> {
    let layout = GridLayout::new(size, config.word_bits)?;
    Ok(BitmapGrid::from_words(layout, words)?)
}

/// Raw calldata invocation. Grid and read calls never need a state file;
/// mutating calls persist only when they succeed.
pub fn call(config: &CliConfig, function: &str, calldata: &[Word]) -> Result<Vec<Word>> {
    let call = Call::decode(function, calldata)?;
    let name = call.name();

    let out = if call.is_mutating() {
        state::update(&config.state_path, |state| {
            Ok(abi::execute(
                &mut state.lore,
                config.word_bits,
                &config.caller,
                call,
            )?)
        })?
    } else if needs_state(&call) {
        let mut state = WorldState::load(&config.state_path)?;
        abi::execute(&mut state.lore, config.word_bits, &config.caller, call)?
    } else {
        let mut scratch = WorldState::new(config.caller);
        abi::execute(&mut scratch.lore, config.word_bits, &config.caller, call)?
    };

    info!(function = name, outputs = out.len(), "call applied");
    Ok(out)
}

fn needs_state(call: &Call) -> bool {
    matches!(call, Call::IsApproved { .. } | Call::GetEntity { .. })
}
