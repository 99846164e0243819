//! Type registry: DXF type name to entity kind

use ahash::AHashMap;
use once_cell::sync::Lazy;

use super::extended_tags::ExtendedTags;
use super::{DxfEntity, EntityKind, LwPolylineData, TagStorage};
use crate::error::{DxfError, Result};
use crate::io::dxf::reader::DxfReaderConfiguration;
use crate::io::dxf::Tags;
use crate::notification::{NotificationCollection, NotificationType};
use crate::objects::{DictionaryData, XRecordData};
use crate::types::DxfVersion;

type Constructor = fn() -> EntityKind;

static REGISTRY: Lazy<AHashMap<&'static str, Constructor>> = Lazy::new(|| {
    let mut registry: AHashMap<&'static str, Constructor> = AHashMap::new();
    registry.insert("LINE", || EntityKind::Line);
    registry.insert("POINT", || EntityKind::Point);
    registry.insert("CIRCLE", || EntityKind::Circle);
    registry.insert("ARC", || EntityKind::Arc);
    registry.insert("TEXT", || EntityKind::Text);
    registry.insert("ATTRIB", || EntityKind::Attrib);
    registry.insert("LWPOLYLINE", || EntityKind::LwPolyline(LwPolylineData::default()));
    registry.insert("LAYER", || EntityKind::Layer);
    registry.insert("DICTIONARY", || EntityKind::Dictionary(DictionaryData::default()));
    registry.insert("XRECORD", || EntityKind::XRecord(XRecordData::default()));
    registry
});

pub fn is_supported(dxftype: &str) -> bool {
    REGISTRY.contains_key(dxftype)
}

/// Kind for `dxftype`, unsupported types become [`TagStorage`].
pub fn kind_for(dxftype: &str) -> EntityKind {
    match REGISTRY.get(dxftype) {
        Some(constructor) => constructor(),
        None => EntityKind::TagStorage(TagStorage::new(dxftype)),
    }
}

/// New virtual entity of type `dxftype`
pub fn new_entity(dxftype: &str) -> DxfEntity {
    DxfEntity::new(kind_for(dxftype))
}

/// Load one entity from its tags as found in a DXF section.
///
/// Outside of R12 an entity without subclass markers is a structure error
/// if its type declares subclasses; in failsafe mode it is loaded from the
/// flat layout and a warning is recorded.
pub fn load_entity(
    tags: Tags,
    version: DxfVersion,
    config: &DxfReaderConfiguration,
    notifications: &mut NotificationCollection,
) -> Result<DxfEntity> {
    let legacy = version == DxfVersion::R12;
    let xtags = ExtendedTags::from_tags(tags, legacy)?;
    let dxftype = xtags.dxftype().unwrap_or_default().to_string();
    let kind = kind_for(&dxftype);
    if let EntityKind::TagStorage(_) = kind {
        notifications.notify(
            NotificationType::StoredAsTags,
            xtags.get_handle(),
            format!("{} stored as tags", xtags.entity_name()),
        );
    }

    if !legacy && xtags.subclasses.len() == 1 && kind.schema().subclasses().len() > 1 {
        let handle = xtags
            .get_handle()
            .map(|handle| handle.to_string())
            .unwrap_or_default();
        let message = format!(
            "Missing subclass markers in {} #{} for {}",
            dxftype,
            handle,
            version.as_str()
        );
        if !config.failsafe {
            return Err(DxfError::StructureError(message));
        }
        notifications.notify(
            NotificationType::MissingSubclassMarkers,
            xtags.get_handle(),
            format!("{}, loaded as R12 entity", message),
        );
    }

    DxfEntity::load(&xtags, kind, version, config.log_unprocessed_tags)
        .map_err(|err| err.with_context(xtags.entity_name()))
}
