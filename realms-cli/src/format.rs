//! Argument parsers and human-readable output.

use std::fmt::Write as _;

use realms_core::{
    AssetId, BitmapGrid, Content, EntityId, EntityRecord, Poi, Prop, Revision, RevisionId, Word,
};

fn parse_word_list(value: &str) -> Result<Vec<Word>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value.split(',').map(parse_word).collect()
}

/// `A,B`
pub fn parse_content(value: &str) -> Result<Content, String> {
    match parse_word_list(value)?.as_slice() {
        [part1, part2] => Ok(Content::new(*part1, *part2)),
        other => Err(format!(
            "content takes exactly two words (A,B), got {}",
            other.len()
        )),
    }
}

/// `ID:LOW[:HIGH]`, the high half defaulting to zero.
pub fn parse_poi(value: &str) -> Result<Poi, String> {
    let parts: Vec<&str> = value.split(':').collect();
    let (id, low, high) = match parts.as_slice() {
        [id, low] => (*id, *low, "0"),
        [id, low, high] => (*id, *low, *high),
        _ => return Err(format!("expected ID:LOW[:HIGH], got `{value}`")),
    };
    Ok(Poi::new(
        parse_u64(id)?,
        AssetId::new(parse_u128(low)?, parse_u128(high)?),
    ))
}

/// `ID:VALUE`
pub fn parse_prop(value: &str) -> Result<Prop, String> {
    let (id, word) = value
        .split_once(':')
        .ok_or_else(|| format!("expected ID:VALUE, got `{value}`"))?;
    Ok(Prop::new(parse_u64(id)?, parse_word(word)?))
}

fn parse_word(value: &str) -> Result<Word, String> {
    value
        .trim()
        .parse::<Word>()
        .map_err(|err| format!("`{}`: {err}", value.trim()))
}

fn parse_u64(value: &str) -> Result<u64, String> {
    parse_word(value)?
        .to_u64()
        .ok_or_else(|| format!("`{}` does not fit in 64 bits", value.trim()))
}

fn parse_u128(value: &str) -> Result<u128, String> {
    parse_word(value)?
        .to_u128()
        .ok_or_else(|| format!("`{}` does not fit in 128 bits", value.trim()))
}

pub fn format_words(words: &[Word]) -> String {
    words
        .iter()
        .map(|word| word.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One row per grid row, `#` for a set cell and `.` for a clear one.
pub fn render_grid(grid: &BitmapGrid) -> String {
    let size = grid.layout().linear_size();
    let mut out = String::with_capacity((size as usize + 1) * size as usize);
    for row in 0..size {
        for col in 0..size {
            let set = grid.get_cell(row, col).unwrap_or(false);
            out.push(if set { '#' } else { '.' });
        }
        out.push('\n');
    }
    out
}

pub fn render_record(entity_id: EntityId, revision_id: RevisionId, record: &EntityRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "entity {entity_id} revision {revision_id}");
    let _ = writeln!(out, "owner   {:#x}", record.owner);
    let _ = writeln!(
        out,
        "content {} {}",
        record.content.part1, record.content.part2
    );
    let _ = writeln!(out, "kind    {}", record.kind);
    for poi in &record.pois {
        let _ = writeln!(
            out,
            "poi     {} asset {}:{}",
            poi.id, poi.asset_id.low, poi.asset_id.high
        );
    }
    for prop in &record.props {
        let _ = writeln!(out, "prop    {} = {}", prop.id, prop.value);
    }
    out
}

pub fn render_history(revisions: &[Revision]) -> String {
    let mut out = String::new();
    for revision in revisions {
        let pois = revision
            .pois
            .iter()
            .map(|poi| poi.id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(
            out,
            "{:>4}  kind {:<6} content {} {}  pois [{}]",
            revision.revision_id,
            revision.kind,
            revision.content.part1,
            revision.content.part2,
            pois
        );
    }
    out
}
