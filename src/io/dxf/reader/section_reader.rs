//! Structure loader: splits the tag stream into sections and entities

use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::STRUCTURE_MARKER;
use crate::io::dxf::tags::{DxfValue, Tag, Tags};
use indexmap::IndexMap;

/// Section names with a fixed meaning; everything else is stored opaque.
pub const KNOWN_SECTIONS: [&str; 8] = [
    "HEADER",
    "CLASSES",
    "TABLES",
    "BLOCKS",
    "ENTITIES",
    "OBJECTS",
    "THUMBNAILIMAGE",
    "ACDSDATA",
];

/// Sections whose content is loaded into the entity database
pub const ENTITY_SECTIONS: [&str; 4] = ["TABLES", "BLOCKS", "ENTITIES", "OBJECTS"];

/// Sections in file order, each a list of tag groups split at structure tags.
///
/// The `(0, SECTION) (2, NAME)` and `(0, ENDSEC)` tags are not part of the
/// groups. Tags between the section name and the first structure tag (the
/// whole HEADER section) form a leading group without structure tag.
pub type DxfStructure = IndexMap<String, Vec<Tags>>;

/// Split a compiled tag stream into sections.
///
/// Loading stops at `(0, EOF)` or at the end of the stream.
pub fn load_dxf_structure<I>(tags: I) -> Result<DxfStructure>
where
    I: IntoIterator<Item = Result<Tag>>,
{
    let mut sections = DxfStructure::new();
    let mut tags = tags.into_iter();

    while let Some(tag) = tags.next() {
        let tag = tag?;
        if tag.is(STRUCTURE_MARKER, "EOF") {
            return Ok(sections);
        }
        if !tag.is(STRUCTURE_MARKER, "SECTION") {
            return Err(DxfError::StructureError(format!(
                "Unexpected tag {} outside of sections",
                tag
            )));
        }

        let name = match tags.next().transpose()? {
            Some(Tag {
                code: 2,
                value: DxfValue::Text(name),
            }) => name,
            _ => {
                return Err(DxfError::StructureError(
                    "Missing section name tag at section start".to_string(),
                ))
            }
        };
        if sections.contains_key(&name) {
            return Err(DxfError::StructureError(format!(
                "Duplicate section {}",
                name
            )));
        }

        let groups = load_section(&name, &mut tags)?;
        sections.insert(name, groups);
    }
    Ok(sections)
}

fn load_section<I>(name: &str, tags: &mut I) -> Result<Vec<Tags>>
where
    I: Iterator<Item = Result<Tag>>,
{
    let mut groups: Vec<Tags> = Vec::new();
    for tag in tags {
        let tag = tag?;
        if tag.code == STRUCTURE_MARKER {
            if tag.is(STRUCTURE_MARKER, "ENDSEC") {
                return Ok(groups);
            }
            if tag.is(STRUCTURE_MARKER, "EOF") {
                break;
            }
            groups.push(Tags::from(vec![tag]));
        } else {
            match groups.last_mut() {
                Some(group) => group.push(tag),
                None => groups.push(Tags::from(vec![tag])),
            }
        }
    }
    Err(DxfError::StructureError(format!(
        "Missing ENDSEC tag in section {}",
        name
    )))
}
