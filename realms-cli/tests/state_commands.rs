use std::fs;
use std::path::PathBuf;

use realms_cli::{commands, CliConfig, WorldState};
use realms_core::{AssetId, Category, Content, Poi, Prop, Word};

const ADMIN: u64 = 0xad;
const CREATOR: u64 = 0xc0;

fn config_for(path: PathBuf, caller: u64) -> CliConfig {
    CliConfig {
        state_path: path,
        word_bits: 251,
        caller: Word::from(caller),
    }
}

fn content(a: u64, b: u64) -> Content {
    Content::new(Word::from(a), Word::from(b))
}

fn seeded(dir: &tempfile::TempDir) -> (CliConfig, CliConfig) {
    let path = dir.path().join("state.json");
    commands::init(&path, Word::from(ADMIN), false).unwrap();
    let admin = config_for(path.clone(), ADMIN);
    commands::whitelist(&admin, Category::Kind, &[1, 2], false).unwrap();
    commands::whitelist(&admin, Category::PointOfInterest, &[1, 2], false).unwrap();
    commands::whitelist(&admin, Category::Property, &[1], false).unwrap();
    (admin, config_for(path, CREATOR))
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    commands::init(&path, Word::from(ADMIN), false).unwrap();
    assert!(commands::init(&path, Word::from(ADMIN), false).is_err());
    commands::init(&path, Word::from(7u64), true).unwrap();

    let state = WorldState::load(&path).unwrap();
    assert_eq!(state.lore.admin(), &Word::from(7u64));
    assert!(!dir.path().join("state.json.tmp").exists());
}

#[test]
fn state_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let (_, creator) = seeded(&dir);

    let entity_id = commands::create(
        &creator,
        content(1, 2),
        1,
        vec![Poi::new(1, AssetId::new(10, 0))],
        vec![Prop::new(1, Word::from(99u64))],
    )
    .unwrap();
    assert_eq!(entity_id, 1);

    let revision_id = commands::revise(&creator, entity_id, content(3, 4), None, vec![]).unwrap();
    assert_eq!(revision_id, 2);

    let (latest, record) = commands::show(&creator, entity_id, None).unwrap();
    assert_eq!(latest, 2);
    assert_eq!(record.owner, Word::from(CREATOR));
    assert_eq!(record.content, content(3, 4));
    assert_eq!(record.kind, 1);
    assert!(record.pois.is_empty());
    assert_eq!(record.props, vec![Prop::new(1, Word::from(99u64))]);

    let history = commands::history(&creator, entity_id).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].pois.len(), 1);
}

#[test]
fn rejected_calls_leave_the_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let (_, creator) = seeded(&dir);
    let before = fs::read(&creator.state_path).unwrap();

    assert!(commands::create(&creator, content(1, 1), 3, vec![], vec![]).is_err());
    assert!(commands::revise(&creator, 1, content(1, 1), None, vec![]).is_err());
    assert!(commands::whitelist(&creator, Category::Kind, &[3], false).is_err());

    assert_eq!(fs::read(&creator.state_path).unwrap(), before);
}

#[test]
fn revoke_updates_approved_listing() {
    let dir = tempfile::tempdir().unwrap();
    let (admin, _) = seeded(&dir);

    commands::whitelist(&admin, Category::Kind, &[1], true).unwrap();
    assert_eq!(commands::approved(&admin, Category::Kind).unwrap(), vec![2]);
}

#[test]
fn calldata_mutations_persist() {
    let dir = tempfile::tempdir().unwrap();
    let (admin, creator) = seeded(&dir);

    // create_entity: part1, part2, kind, n_pois, n_props
    let words: Vec<Word> = [5u64, 6, 2, 0, 0].into_iter().map(Word::from).collect();
    let out = commands::call(&creator, "create_entity", &words).unwrap();
    assert_eq!(out, vec![Word::from(1u64)]);

    let out = commands::call(&admin, "is_approved", &[Word::from(0u64), Word::from(2u64)]).unwrap();
    assert_eq!(out, vec![Word::ONE]);

    let (_, record) = commands::show(&admin, 1, Some(1)).unwrap();
    assert_eq!(record.kind, 2);
    assert_eq!(record.content, content(5, 6));
}

#[test]
fn grid_calls_need_no_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path().join("missing.json"), CREATOR);

    let out = commands::call(&config, "calc_size", &[Word::from(25u64)]).unwrap();
    assert_eq!(out, vec![Word::from(3u64)]);

    let grid = commands::grid(&config, 25, vec![Word::ZERO; 3]).unwrap();
    assert_eq!(grid.count_set(), 0);
    assert!(commands::grid(&config, 25, vec![Word::ZERO; 2]).is_err());

    assert!(!config.state_path.exists());
}

#[test]
fn reads_against_missing_state_fail() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path().join("missing.json"), CREATOR);
    assert!(commands::show(&config, 1, None).is_err());
}

#[test]
fn corrupted_state_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let (_, creator) = seeded(&dir);
    commands::create(&creator, content(1, 2), 1, vec![], vec![]).unwrap();

    let mut json: serde_json::Value =
        serde_json::from_slice(&fs::read(&creator.state_path).unwrap()).unwrap();
    json["lore"]["entities"][0]["revisions"] = serde_json::json!([]);
    fs::write(&creator.state_path, serde_json::to_vec(&json).unwrap()).unwrap();

    let err = commands::show(&creator, 1, None).unwrap_err();
    assert!(format!("{err:#}").contains("no revisions"), "{err:#}");
    assert!(commands::revise(&creator, 1, content(3, 4), None, vec![]).is_err());
}
