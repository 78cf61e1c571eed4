//! Slide picture discovery.
//!
//! Each slide part (`ppt/slides/slide{N}.xml`) embeds its images through
//! `<a:blip r:embed="rIdX"/>` references, which its relationships sidecar
//! maps to parts under `ppt/media/`. This module walks every slide and
//! resolves those references in document order.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use cprs_opc::{rels_part_for, resolve_target, Package, RelationshipSet};

use crate::PptxError;

const SLIDE_PREFIX: &str = "ppt/slides/slide";
const MEDIA_PREFIX: &str = "ppt/media/";

/// Resolved picture targets for every slide, keyed by slide number.
///
/// A slide without image references maps to an empty list, so callers can
/// tell "slide exists, no pictures" apart from "no such slide". Resolution
/// failures are hard errors: a slide that references images must have a
/// relationships part, every referenced ID must resolve to an internal
/// target, and every target must land under `ppt/media/`.
pub fn slide_picture_targets(package: &Package) -> Result<BTreeMap<u32, Vec<String>>, PptxError> {
    let slide_parts: Vec<(u32, &str)> = package
        .part_names()
        .filter_map(|name| slide_number(name).map(|number| (number, name)))
        .collect();

    let mut targets = BTreeMap::new();
    for (slide, part) in slide_parts {
        let embeds = blip_embed_ids(package.read_part(part)?)?;
        let mut resolved = Vec::with_capacity(embeds.len());
        if !embeds.is_empty() {
            let rels_part = rels_part_for(part);
            let xml = package
                .part(&rels_part)
                .ok_or(PptxError::MissingRels(rels_part))?;
            let rels = RelationshipSet::parse(xml)?;
            for rel_id in embeds {
                let target = rels
                    .internal_target(&rel_id)
                    .ok_or_else(|| PptxError::UnresolvedEmbed {
                        slide,
                        rel_id: rel_id.clone(),
                    })?;
                let media = resolve_target(part, target);
                if !media.starts_with(MEDIA_PREFIX) {
                    return Err(PptxError::NonMediaTarget {
                        slide,
                        rel_id,
                        target: media,
                    });
                }
                resolved.push(media);
            }
        }
        log::debug!("slide {slide}: {} picture target(s)", resolved.len());
        targets.insert(slide, resolved);
    }
    Ok(targets)
}

/// Slide number of a `ppt/slides/slide{N}.xml` part name.
///
/// Only a purely numeric suffix counts, so layouts, masters, and the
/// slides' own `.rels` sidecars never match.
pub fn slide_number(part: &str) -> Option<u32> {
    let stem = part.strip_prefix(SLIDE_PREFIX)?.strip_suffix(".xml")?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// `r:embed` IDs of every `<a:blip>` in a slide, in document order. Blips
/// without an embed ID are linked rather than embedded pictures and are
/// skipped.
fn blip_embed_ids(xml: &[u8]) -> Result<Vec<String>, PptxError> {
    let text = std::str::from_utf8(xml)?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut ids = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Empty(e) | Event::Start(e) => {
                if e.local_name().as_ref() == b"blip" {
                    if let Some(id) = embed_attr(&e)? {
                        ids.push(id);
                    }
                }
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(ids)
}

fn embed_attr(e: &BytesStart<'_>) -> Result<Option<String>, PptxError> {
    for attr in e.attributes() {
        let attr = attr?;
        // Accept both the namespaced `r:embed` and a bare `embed`.
        if attr_local_name(attr.key.as_ref()) == b"embed" {
            let value = attr.unescape_value()?;
            if value.is_empty() {
                return Ok(None);
            }
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn attr_local_name(key: &[u8]) -> &[u8] {
    match key.iter().rposition(|&b| b == b':') {
        Some(pos) => &key[pos + 1..],
        None => key,
    }
}
