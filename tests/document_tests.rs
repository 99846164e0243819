//! Integration tests for document load, export and editing

mod common;

use common::*;
use dxf_records::io::dxf::DxfReader;
use dxf_records::{
    DxfDocument, DxfEntity, DxfError, DxfValue, DxfVersion, DxfWriterConfiguration, Handle,
    NotificationType, Vector2, Vector3,
};

fn objects_text() -> String {
    dxf_text(&[
        (0, "DICTIONARY"),
        (5, "C"),
        (330, "0"),
        (100, "AcDbDictionary"),
        (281, "1"),
        (3, "ACME_DATA"),
        (350, "D"),
        (0, "XRECORD"),
        (5, "D"),
        (330, "C"),
        (100, "AcDbXrecord"),
        (280, "1"),
        (1, "payload"),
        (70, "5"),
    ])
}

fn mline_text() -> String {
    dxf_text(&[
        (0, "MLINE"),
        (5, "2F"),
        (330, "0"),
        (100, "AcDbEntity"),
        (8, "0"),
        (100, "AcDbMline"),
        (2, "STANDARD"),
        (340, "18"),
        (40, "1.0"),
        (1001, "ACME"),
        (1000, "kept"),
    ])
}

fn sample_document() -> String {
    let entities = [
        line_text("1A", "0"),
        dxf_text(&[
            (0, "CIRCLE"),
            (5, "1B"),
            (330, "0"),
            (100, "AcDbEntity"),
            (8, "CIRCLES"),
            (100, "AcDbCircle"),
            (10, "5.0"),
            (20, "5.0"),
            (30, "0.0"),
            (40, "2.0"),
        ]),
        mline_text(),
    ]
    .concat();
    document_text(DxfVersion::R2000, "30", &entities, &objects_text())
}

#[test]
fn test_export_reproduces_input_text() {
    init_logging();
    let text = sample_document();
    let doc = load(&text);
    assert_eq!(doc.version, DxfVersion::R2000);
    assert_eq!(doc.entitydb.len(), 5);
    assert_eq!(
        doc.section_names().collect::<Vec<_>>(),
        vec!["HEADER", "ENTITIES", "OBJECTS"]
    );
    assert_eq!(export_text(&doc, DxfWriterConfiguration::default()), text);
}

#[test]
fn test_reload_keeps_values() {
    let doc = load(&sample_document());
    let exported = doc.to_tags(&DxfWriterConfiguration::default()).unwrap();
    let reloaded = DxfDocument::load(exported.into_iter().map(Ok), &strict()).unwrap();
    for (handle, entity) in doc.entitydb.iter() {
        assert_eq!(reloaded.entitydb.get(handle).unwrap(), entity);
    }
}

#[test]
fn test_kinds_and_notifications() {
    let doc = load(&sample_document());
    let kinds: Vec<_> = doc.entities("ENTITIES").map(DxfEntity::dxftype).collect();
    assert_eq!(kinds, vec!["LINE", "CIRCLE", "MLINE"]);

    let dictionary = doc.entitydb.get(Handle::new(0xC)).unwrap();
    assert_eq!(dictionary.dictionary().unwrap().get("ACME_DATA"), Some(Handle::new(0xD)));
    let xrecord = doc.entitydb.get(Handle::new(0xD)).unwrap();
    assert_eq!(xrecord.xrecord().unwrap().tags().len(), 2);

    let mline = doc.entitydb.get(Handle::new(0x2F)).unwrap();
    assert_eq!(mline.get_xdata("ACME").map(|tags| tags.len()), Some(2));
    let unsupported = doc.notifications.of_type(NotificationType::StoredAsTags);
    assert_eq!(unsupported.len(), 1);
    assert!(unsupported[0].message.contains("MLINE"));
}

#[test]
fn test_unprocessed_tags_are_kept_in_their_subclass() {
    let line = dxf_text(&[
        (0, "LINE"),
        (5, "1A"),
        (330, "0"),
        (100, "AcDbEntity"),
        (8, "0"),
        (100, "AcDbLine"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (11, "1.0"),
        (21, "0.0"),
        (31, "0.0"),
        (90, "7"),
        (100, "AcDbAcmeExtension"),
        (1, "extra"),
    ]);
    let text = document_text(DxfVersion::R2000, "20", &line, "");
    let doc = load(&text);
    let entity = doc.entitydb.get(Handle::new(0x1A)).unwrap();
    assert!(entity.has_unprocessed_tags());
    assert_eq!(export_text(&doc, DxfWriterConfiguration::default()), text);
}

#[test]
fn test_r12_export() {
    let doc = load(&sample_document());
    let text = export_text(&doc, DxfWriterConfiguration::for_version(DxfVersion::R12));
    assert!(!text.contains("AcDbLine"));
    assert!(!text.contains("OBJECTS"));
    assert!(text.contains("AC1009"));

    let reloaded = load(&text);
    assert_eq!(reloaded.version, DxfVersion::R12);
    let circle = reloaded.entitydb.get(Handle::new(0x1B)).unwrap();
    assert_eq!(circle.get("layer").unwrap(), Some(DxfValue::from("CIRCLES")));
    assert_eq!(circle.get("radius").unwrap(), Some(DxfValue::Float(2.0)));
}

#[test]
fn test_r12_document_without_handles() {
    let line = dxf_text(&[
        (0, "LINE"),
        (8, "0"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (11, "3.0"),
        (21, "4.0"),
        (31, "0.0"),
    ]);
    let doc = load(&document_text(DxfVersion::R12, "1", &line, ""));
    let line = doc.entities("ENTITIES").next().unwrap();
    assert!(line.handle().is_some());
    assert_eq!(line.get("end").unwrap(), Some(DxfValue::Point3(Vector3::new(3.0, 4.0, 0.0))));
}

#[test]
fn test_version_unsupported_entity() {
    let mut doc = DxfDocument::new(DxfVersion::R2000);
    let points = [Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0)];
    doc.add_entity("ENTITIES", DxfEntity::new_lwpolyline(&points, false)).unwrap();
    let err = doc
        .to_tags(&DxfWriterConfiguration::for_version(DxfVersion::R12))
        .unwrap_err();
    assert!(matches!(err, DxfError::VersionUnsupported { .. }));
    assert!(err.to_string().contains("LWPOLYLINE"));
}

#[test]
fn test_missing_subclass_markers() {
    let line = dxf_text(&[
        (0, "LINE"),
        (5, "1A"),
        (8, "0"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (11, "1.0"),
        (21, "0.0"),
        (31, "0.0"),
    ]);
    let text = document_text(DxfVersion::R2000, "20", &line, "");

    let err = DxfDocument::read(text.as_bytes(), &strict()).unwrap_err();
    assert!(err
        .to_string()
        .contains("Missing subclass markers in LINE #1A for AC1015"));

    let doc = DxfDocument::read(text.as_bytes(), &failsafe()).unwrap();
    assert!(doc.notifications.has_type(NotificationType::MissingSubclassMarkers));
    let line = doc.entitydb.get(Handle::new(0x1A)).unwrap();
    assert_eq!(line.get("end").unwrap(), Some(DxfValue::Point3(Vector3::new(1.0, 0.0, 0.0))));
}

#[test]
fn test_dangling_owner_is_reported() {
    let doc = load(&document_text(DxfVersion::R2000, "20", &line_text("1A", "FF"), ""));
    let warnings = doc.notifications.of_type(NotificationType::DanglingReference);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("#FF"));
}

#[test]
fn test_duplicate_handle_aborts_load() {
    let entities = [line_text("1A", "0"), line_text("1A", "0")].concat();
    let text = document_text(DxfVersion::R2000, "20", &entities, "");
    let err = DxfDocument::read(text.as_bytes(), &strict()).unwrap_err();
    assert!(matches!(err, DxfError::DuplicateHandle(_)));
}

#[test]
fn test_new_document_handseed() {
    let mut doc = DxfDocument::new(DxfVersion::R2000);
    let line = DxfEntity::new_line(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 0.0));
    let handle = doc.add_entity("ENTITIES", line).unwrap();
    doc.new_extension_dict(handle).unwrap();

    let tags = doc.to_tags(&DxfWriterConfiguration::default()).unwrap();
    let reloaded = DxfDocument::load(tags.into_iter().map(Ok), &strict()).unwrap();
    let seed = reloaded.header_var("$HANDSEED").and_then(|tags| tags.get_first_value(5)).cloned();
    assert_eq!(seed, Some(DxfValue::Handle(Handle::new(3))));
    assert_eq!(reloaded.entitydb.len(), 2);
    assert!(reloaded.notifications.is_empty());
}

#[test]
fn test_duplicate_entity_with_extension_dict() {
    let mut doc = load(&sample_document());
    let source = Handle::new(0x1A);
    let xdict = doc.new_extension_dict(source).unwrap();
    let copy = doc.duplicate_entity(source).unwrap();

    assert_eq!(doc.entities("ENTITIES").filter(|e| e.dxftype() == "LINE").count(), 2);
    let xdict_copy = doc.entitydb.get(copy).unwrap().get_extension_dict().unwrap();
    assert_ne!(xdict_copy, xdict);
    let objects: Vec<_> = doc.entities("OBJECTS").filter_map(DxfEntity::handle).collect();
    assert!(objects.contains(&xdict));
    assert!(objects.contains(&xdict_copy));
}

#[test]
fn test_optional_defaults_are_forced_only_on_request() {
    let mut doc = DxfDocument::new(DxfVersion::R2000);
    let mut line = DxfEntity::new_line(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    line.set("color", 256).unwrap();
    assert!(!line.has("color").unwrap());
    line.set_forced("color", 256).unwrap();
    let handle = doc.add_entity("ENTITIES", line).unwrap();

    let entity = doc.entitydb.get(handle).unwrap();
    let plain = entity.to_tags(&DxfWriterConfiguration::default()).unwrap();
    assert!(!plain.has_tag(62));
    let forced = DxfWriterConfiguration {
        force_optional: true,
        ..Default::default()
    };
    assert_eq!(entity.to_tags(&forced).unwrap().get_first_value(62), Some(&DxfValue::Int(256)));
}

#[test]
fn test_reader_api() {
    let text = sample_document();
    let doc = DxfReader::from_text(&text).with_configuration(strict()).read().unwrap();
    assert_eq!(doc.entitydb.len(), 5);
}

fn tables_document(handseed: &str) -> String {
    let tables = dxf_text(&[
        (0, "SECTION"),
        (2, "TABLES"),
        (0, "TABLE"),
        (2, "LAYER"),
        (5, "20"),
        (330, "0"),
        (100, "AcDbSymbolTable"),
        (70, "1"),
        (0, "LAYER"),
        (5, "10"),
        (330, "20"),
        (100, "AcDbSymbolTableRecord"),
        (100, "AcDbLayerTableRecord"),
        (2, "0"),
        (70, "0"),
        (62, "7"),
        (6, "Continuous"),
        (370, "-3"),
        (0, "ENDTAB"),
        (0, "ENDSEC"),
    ]);
    let text = document_text(DxfVersion::R2000, handseed, "", "");
    // TABLES follows HEADER
    let (header, rest) = text.split_at(text.find("  0\nSECTION\n  2\nENTITIES").unwrap());
    format!("{header}{tables}{rest}")
}

#[test]
fn test_table_entries_are_owned_by_table_heads() {
    let doc = load(&tables_document("21"));
    assert!(doc.notifications.is_empty(), "{:?}", doc.notifications);
    let layer = doc.entities("TABLES").next().unwrap();
    assert_eq!(layer.owner(), Handle::new(0x20));
    assert_eq!(export_text(&doc, DxfWriterConfiguration::default()), tables_document("21"));
}

#[test]
fn test_table_head_handles_are_not_reallocated() {
    let mut doc = load(&tables_document("1"));
    assert_eq!(doc.entitydb.generator().peek(), Handle::new(0x21));
    let line = DxfEntity::new_line(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(doc.add_entity("ENTITIES", line).unwrap(), Handle::new(0x21));
}

#[test]
fn test_xrecord_user_data_keeps_order() {
    let objects = dxf_text(&[
        (0, "XRECORD"),
        (5, "D"),
        (330, "0"),
        (100, "AcDbXrecord"),
        (280, "1"),
        (1, "payload"),
        (280, "5"),
        (70, "2"),
    ]);
    let text = document_text(DxfVersion::R2000, "20", "", &objects);
    let doc = load(&text);
    let xrecord = doc.entitydb.get(Handle::new(0xD)).unwrap();
    assert_eq!(xrecord.xrecord().unwrap().tags().len(), 3);
    assert_eq!(xrecord.get("cloning").unwrap(), Some(DxfValue::Int(1)));
    assert_eq!(export_text(&doc, DxfWriterConfiguration::default()), text);
}

#[test]
fn test_new_entity_writes_null_owner() {
    let mut doc = DxfDocument::new(DxfVersion::R2000);
    let line = DxfEntity::new_line(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    let handle = doc.add_entity("ENTITIES", line).unwrap();
    let tags = doc.entitydb.get(handle).unwrap().to_tags(&DxfWriterConfiguration::default()).unwrap();
    assert_eq!(tags.get_first_value(330), Some(&DxfValue::Handle(Handle::NULL)));
    let r12 = doc
        .entitydb
        .get(handle)
        .unwrap()
        .to_tags(&DxfWriterConfiguration::for_version(DxfVersion::R12))
        .unwrap();
    assert!(!r12.has_tag(330));
}
