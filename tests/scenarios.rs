//! Reference scenarios for loading, handle allocation, deletion, version
//! gating and doublet resolution

mod common;

use common::*;
use dxf_records::entities::{EntityKind, ExtendedTags};
use dxf_records::{DxfEntity, DxfValue, DxfVersion, DxfWriterConfiguration, EntityDb, Handle, Vector3};

#[test]
fn test_minimal_line_uses_schema_defaults() {
    init_logging();
    let text = dxf_text(&[
        (0, "LINE"),
        (5, "1A"),
        (330, "0"),
        (100, "AcDbEntity"),
        (100, "AcDbLine"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (11, "1.0"),
        (21, "0.0"),
        (31, "0.0"),
    ]);
    let doc = load(&document_text(DxfVersion::R2000, "1B", &text, ""));
    let line = doc.entitydb.get(Handle::new(0x1A)).unwrap();

    assert_eq!(line.dxftype(), "LINE");
    assert_eq!(line.owner(), Handle::NULL);
    assert_eq!(line.get("layer").unwrap(), Some(DxfValue::from("0")));
    assert!(!line.has("layer").unwrap());
    assert_eq!(line.get("start").unwrap(), Some(DxfValue::Point3(Vector3::new(0.0, 0.0, 0.0))));
    assert_eq!(line.get("end").unwrap(), Some(DxfValue::Point3(Vector3::new(1.0, 0.0, 0.0))));
}

#[test]
fn test_add_allocates_increasing_handles() {
    let mut db = EntityDb::new();
    let line = || DxfEntity::new_line(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    let first = db.add(line()).unwrap();
    let second = db.add(line()).unwrap();
    assert!(second.value() > first.value());
}

#[test]
fn test_deleted_explicit_handle_is_never_allocated_again() {
    let mut db = EntityDb::new();
    let mut line = DxfEntity::new_line(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    line.dxf.set_handle(Handle::new(2));
    db.add(line).unwrap();
    db.delete(Handle::new(2)).unwrap();

    let allocated = db.allocate_handle().unwrap();
    assert!(allocated.value() > 2);
    assert!(db.allocate_handle().unwrap() > allocated);
}

#[test]
fn test_delete_cascades_to_extension_dict_but_not_to_reactor_targets() {
    let entities = [line_text("1A", "0"), line_text("1B", "0")].concat();
    let mut doc = load(&document_text(DxfVersion::R2000, "20", &entities, ""));
    let host = Handle::new(0x1A);
    let watched = Handle::new(0x1B);

    let xdict = doc.new_extension_dict(host).unwrap();
    doc.entitydb.get_mut(host).unwrap().append_reactor_handle(watched);
    doc.entitydb.get_mut(watched).unwrap().append_reactor_handle(host);
    assert!(doc.entitydb.contains(xdict));

    let deleted = doc.delete_entity(host).unwrap();
    assert!(deleted.is_deleted());
    assert!(!doc.entitydb.contains(host));
    assert!(!doc.entitydb.contains(xdict));
    assert!(doc.entities("OBJECTS").next().is_none());

    let survivor = doc.entitydb.get(watched).unwrap();
    assert!(survivor.is_bound());
    assert!(!survivor.get_reactors().contains(&host));
}

#[test]
fn test_attributes_newer_than_target_are_omitted() {
    let mut line = DxfEntity::new_line(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    line.set("true_color", 0xFF0000).unwrap();
    assert!(line.has("true_color").unwrap());

    let r2000 = line.to_tags(&DxfWriterConfiguration::for_version(DxfVersion::R2000)).unwrap();
    assert!(!r2000.has_tag(420));
    let r2004 = line.to_tags(&DxfWriterConfiguration::for_version(DxfVersion::R2004)).unwrap();
    assert_eq!(r2004.get_first_value(420), Some(&DxfValue::Int(0xFF0000)));
}

/// Known format quirk: ATTRIB uses group code 280 twice in `AcDbAttribute`.
/// The occurrences are told apart only by their order, the first one is
/// always the class version and the second one the lock position flag.
#[test]
fn test_known_quirk_doublet_resolved_by_declaration_order() {
    let text = dxf_text(&[
        (0, "ATTRIB"),
        (5, "2B"),
        (100, "AcDbEntity"),
        (8, "0"),
        (100, "AcDbText"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (40, "2.5"),
        (1, "VALUE"),
        (100, "AcDbAttribute"),
        (280, "3"),
        (2, "TAG"),
        (70, "0"),
        (280, "1"),
    ]);
    let xtags = ExtendedTags::from_text(&text, false).unwrap();
    let attrib = DxfEntity::load(&xtags, EntityKind::Attrib, DxfVersion::R2010, false).unwrap();
    assert_eq!(attrib.get("version").unwrap(), Some(DxfValue::Int(3)));
    assert_eq!(attrib.get("lock_position").unwrap(), Some(DxfValue::Int(1)));

    // swapped values follow the position, not the value
    let swapped = text.replacen("280\n3\n", "280\n9\n", 1).replacen("280\n1\n", "280\n3\n", 1);
    let xtags = ExtendedTags::from_text(&swapped, false).unwrap();
    let attrib = DxfEntity::load(&xtags, EntityKind::Attrib, DxfVersion::R2010, false).unwrap();
    assert_eq!(attrib.get("version").unwrap(), Some(DxfValue::Int(9)));
    assert_eq!(attrib.get("lock_position").unwrap(), Some(DxfValue::Int(3)));
}
