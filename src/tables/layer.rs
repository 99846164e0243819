//! LAYER table entry

use bitflags::bitflags;
use once_cell::sync::Lazy;

use super::acdb_symbol_table_record;
use crate::entities::attributes::{DefSubclass, DxfAttr, DxfAttributes};
use crate::entities::common::base_class;
use crate::entities::{DxfEntity, EntityKind};
use crate::error::Result;
use crate::io::dxf::DxfValue;
use crate::types::DxfVersion;

pub static LAYER_SCHEMA: Lazy<DxfAttributes> = Lazy::new(|| {
    DxfAttributes::new(vec![
        base_class(),
        acdb_symbol_table_record(),
        DefSubclass::new(
            Some("AcDbLayerTableRecord"),
            vec![
                DxfAttr::text("name", 2),
                DxfAttr::int("flags", 70).default(0),
                // negative if the layer is off
                DxfAttr::int("color", 62).default(7),
                DxfAttr::int("true_color", 420).optional().since(DxfVersion::R2004),
                DxfAttr::text("linetype", 6).default("Continuous"),
                DxfAttr::int("plot", 290)
                    .default(1)
                    .optional()
                    .since(DxfVersion::R2000),
                DxfAttr::int("lineweight", 370).default(-3).since(DxfVersion::R2000),
                DxfAttr::handle("plotstyle_handle", 390).since(DxfVersion::R2000),
                DxfAttr::handle("material_handle", 347).since(DxfVersion::R2007),
                DxfAttr::handle("unknown1", 348).optional().since(DxfVersion::R2007),
            ],
        ),
    ])
});

bitflags! {
    /// Layer state flags, group code 70
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LayerFlags: i64 {
        const FROZEN = 0x1;
        /// Frozen in new viewports
        const FROZEN_IN_NEW_VIEWPORTS = 0x2;
        const LOCKED = 0x4;
        /// Depends on an external reference
        const XREF_DEPENDENT = 0x10;
        const XREF_RESOLVED = 0x20;
        /// Referenced by at least one entity
        const REFERENCED = 0x40;
    }
}

impl DxfEntity {
    /// New virtual LAYER entry
    pub fn new_layer(name: &str) -> Self {
        let mut layer = DxfEntity::new(EntityKind::Layer);
        layer.dxf.unprotected_set("name", DxfValue::from(name));
        layer
    }

    /// Flags of a LAYER entry, unknown bits are kept
    pub fn layer_flags(&self) -> Result<LayerFlags> {
        let bits = self.get_or("flags", 0)?.as_int().unwrap_or(0);
        Ok(LayerFlags::from_bits_retain(bits))
    }

    pub fn set_layer_flags(&mut self, flags: LayerFlags) -> Result<()> {
        self.set("flags", flags.bits())
    }

    /// A layer is off if its color is negative
    pub fn is_layer_off(&self) -> Result<bool> {
        Ok(self.get_or("color", 7)?.as_int().map_or(false, |color| color < 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ExtendedTags;
    use crate::io::dxf::writer::DxfWriterConfiguration;
    use crate::io::dxf::Tags;

    #[test]
    fn test_defaults() {
        let layer = DxfEntity::new_layer("WALLS");
        assert_eq!(layer.get("color").unwrap(), Some(DxfValue::Int(7)));
        assert_eq!(layer.get_text("linetype").unwrap().as_deref(), Some("Continuous"));
        assert_eq!(layer.get("plotstyle_handle").unwrap(), None);
        assert!(!layer.is_layer_off().unwrap());
    }

    #[test]
    fn test_flags() {
        let mut layer = DxfEntity::new_layer("WALLS");
        layer.set_layer_flags(LayerFlags::FROZEN | LayerFlags::LOCKED).unwrap();
        assert_eq!(layer.get("flags").unwrap(), Some(DxfValue::Int(5)));
        assert!(layer.layer_flags().unwrap().contains(LayerFlags::LOCKED));
    }

    #[test]
    fn test_r12_layer() {
        let text = "0\nLAYER\n2\n0\n70\n0\n62\n-7\n6\nCONTINUOUS\n";
        let xtags = ExtendedTags::from_text(text, true).unwrap();
        let layer = DxfEntity::load(&xtags, EntityKind::Layer, DxfVersion::R12, false).unwrap();
        assert!(layer.is_layer_off().unwrap());
        let tags = layer.to_tags(&DxfWriterConfiguration::for_version(DxfVersion::R12)).unwrap();
        assert_eq!(tags, Tags::from_text(text).unwrap());
    }

    #[test]
    fn test_plot_flag_is_optional() {
        let layer = DxfEntity::new_layer("DEFPOINTS");
        let tags = layer.to_tags(&DxfWriterConfiguration::for_version(DxfVersion::R2000)).unwrap();
        assert!(!tags.has_tag(290));
        assert!(tags.has_tag(370));
        assert_eq!(tags.iter().filter(|tag| tag.code == 100).count(), 2);
    }
}
