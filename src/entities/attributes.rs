//! Attribute schema
//!
//! Every entity type declares its attributes as an ordered list of
//! [`DefSubclass`] fragments, one per inheritance level. The fragments are
//! combined once into a [`DxfAttributes`] table held in a static.

use std::fmt;

use ahash::AHashMap;
use indexmap::IndexMap;

use super::DxfEntity;
use crate::error::{DxfError, Result};
use crate::io::dxf::DxfValue;
use crate::types::{DxfVersion, Handle, Vector2, Vector3};

/// Declared value kind of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    Int,
    Float,
    Text,
    /// Exported as x, y even if a z value is stored
    Point2,
    Point3,
    /// 2D or 3D, exported as stored
    AnyPoint,
    Handle,
    Binary,
}

impl AttrKind {
    pub fn name(&self) -> &'static str {
        match self {
            AttrKind::Int => "int",
            AttrKind::Float => "float",
            AttrKind::Text => "text",
            AttrKind::Point2 => "point2d",
            AttrKind::Point3 => "point3d",
            AttrKind::AnyPoint => "point",
            AttrKind::Handle => "handle",
            AttrKind::Binary => "binary",
        }
    }

    /// Convert `value` to this kind, `None` if there is no lossless conversion.
    pub fn coerce(&self, value: DxfValue) -> Option<DxfValue> {
        match (self, value) {
            (AttrKind::Int, DxfValue::Int(v)) => Some(DxfValue::Int(v)),
            (AttrKind::Int, DxfValue::Float(v)) if v.fract() == 0.0 && v.is_finite() => {
                Some(DxfValue::Int(v as i64))
            }
            (AttrKind::Float, DxfValue::Float(v)) => Some(DxfValue::Float(v)),
            (AttrKind::Float, DxfValue::Int(v)) => Some(DxfValue::Float(v as f64)),
            (AttrKind::Text, DxfValue::Text(s)) => Some(DxfValue::Text(s)),
            (AttrKind::Point2, DxfValue::Point2(p)) => Some(DxfValue::Point2(p)),
            (AttrKind::Point2, DxfValue::Point3(p)) => Some(DxfValue::Point2(p.xy())),
            (AttrKind::Point3, DxfValue::Point3(p)) => Some(DxfValue::Point3(p)),
            (AttrKind::Point3, DxfValue::Point2(p)) => Some(DxfValue::Point3(p.into())),
            (AttrKind::AnyPoint, v @ (DxfValue::Point2(_) | DxfValue::Point3(_))) => Some(v),
            (AttrKind::Handle, DxfValue::Handle(h)) => Some(DxfValue::Handle(h)),
            (AttrKind::Handle, DxfValue::Text(s)) => Handle::parse_hex(&s).map(DxfValue::Handle),
            (AttrKind::Binary, DxfValue::Binary(b)) => Some(DxfValue::Binary(b)),
            _ => None,
        }
    }

    /// True if `value` is stored as-is for this kind
    pub fn accepts(&self, value: &DxfValue) -> bool {
        matches!(
            (self, value),
            (AttrKind::Int, DxfValue::Int(_))
                | (AttrKind::Float, DxfValue::Float(_))
                | (AttrKind::Text, DxfValue::Text(_))
                | (AttrKind::Point2, DxfValue::Point2(_))
                | (AttrKind::Point3, DxfValue::Point3(_))
                | (AttrKind::AnyPoint, DxfValue::Point2(_) | DxfValue::Point3(_))
                | (AttrKind::Handle, DxfValue::Handle(_))
                | (AttrKind::Binary, DxfValue::Binary(_))
        )
    }
}

/// Getter/setter pair of an attribute computed from entity data instead of
/// namespace storage.
pub trait ComputedAttribute: Send + Sync {
    /// Current value
    fn get(&self, entity: &DxfEntity) -> Result<Option<DxfValue>>;

    /// Apply `value`, read-only attributes keep this default.
    fn set(&self, entity: &mut DxfEntity, value: DxfValue) -> Result<()> {
        let _ = (entity, value);
        Err(DxfError::InvalidState("read-only computed attribute".to_string()))
    }
}

/// Specification of one DXF attribute
#[derive(Clone)]
pub struct DxfAttr {
    pub name: &'static str,
    pub code: i32,
    pub kind: AttrKind,
    pub default: Option<DxfValue>,
    /// Not exported when equal to `default`
    pub optional: bool,
    /// Not exported for older versions
    pub min_version: DxfVersion,
    pub computed: Option<&'static dyn ComputedAttribute>,
}

impl DxfAttr {
    pub fn new(name: &'static str, code: i32, kind: AttrKind) -> Self {
        Self {
            name,
            code,
            kind,
            default: None,
            optional: false,
            min_version: DxfVersion::R12,
            computed: None,
        }
    }

    pub fn int(name: &'static str, code: i32) -> Self {
        Self::new(name, code, AttrKind::Int)
    }

    pub fn float(name: &'static str, code: i32) -> Self {
        Self::new(name, code, AttrKind::Float)
    }

    pub fn text(name: &'static str, code: i32) -> Self {
        Self::new(name, code, AttrKind::Text)
    }

    pub fn point3d(name: &'static str, code: i32) -> Self {
        Self::new(name, code, AttrKind::Point3)
    }

    pub fn handle(name: &'static str, code: i32) -> Self {
        Self::new(name, code, AttrKind::Handle)
    }

    pub fn default(mut self, value: impl Into<DxfValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn since(mut self, version: DxfVersion) -> Self {
        self.min_version = version;
        self
    }

    pub fn computed(mut self, computed: &'static dyn ComputedAttribute) -> Self {
        self.computed = Some(computed);
        self
    }

    pub fn is_computed(&self) -> bool {
        self.computed.is_some()
    }

    /// Coerce `value` to the declared kind
    pub fn cast(&self, value: DxfValue) -> Result<DxfValue> {
        let found = value.kind_name();
        self.kind.coerce(value).ok_or_else(|| DxfError::TypeMismatch {
            name: self.name.to_string(),
            expected: self.kind.name().to_string(),
            found: found.to_string(),
        })
    }

    /// True if `value` equals the default of an optional attribute
    pub fn is_optional_default(&self, value: &DxfValue) -> bool {
        self.optional && self.default.as_ref() == Some(value)
    }
}

impl fmt::Debug for DxfAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DxfAttr")
            .field("name", &self.name)
            .field("code", &self.code)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("optional", &self.optional)
            .field("min_version", &self.min_version)
            .field("computed", &self.computed.is_some())
            .finish()
    }
}

/// Group code to attribute names in declaration order.
///
/// A code listed with several names is a doublet: occurrences are assigned
/// to the names one after the other.
pub type GroupCodeMapping = AHashMap<i32, Vec<&'static str>>;

/// Attributes of one inheritance level
#[derive(Debug, Clone)]
pub struct DefSubclass {
    /// Subclass marker name, `None` for the base class
    pub name: Option<&'static str>,
    pub attribs: Vec<DxfAttr>,
}

impl DefSubclass {
    pub fn new(name: Option<&'static str>, attribs: Vec<DxfAttr>) -> Self {
        Self { name, attribs }
    }

    /// Mapping used by the subclass processor
    pub fn group_code_mapping(&self) -> GroupCodeMapping {
        merge_group_code_mappings(std::iter::once(self))
    }

    pub fn attrib_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attribs.iter().map(|attr| attr.name)
    }
}

/// Combined mapping of several fragments, in fragment order
pub fn merge_group_code_mappings<'a, I>(fragments: I) -> GroupCodeMapping
where
    I: IntoIterator<Item = &'a DefSubclass>,
{
    let mut mapping = GroupCodeMapping::new();
    for fragment in fragments {
        for attr in &fragment.attribs {
            mapping.entry(attr.code).or_default().push(attr.name);
        }
    }
    mapping
}

/// Schema of one entity type: the ordered union of its fragments
#[derive(Debug)]
pub struct DxfAttributes {
    subclasses: Vec<DefSubclass>,
    /// name -> (subclass index, attribute index)
    index: IndexMap<&'static str, (usize, usize)>,
    mappings: Vec<GroupCodeMapping>,
    /// All fragments except the base class, for flat R12 groups
    legacy_mapping: GroupCodeMapping,
}

impl DxfAttributes {
    /// Build and validate a schema.
    ///
    /// # Panics
    ///
    /// On an invalid declaration: duplicate names, a default that does not
    /// match its kind, or a computed attribute with a default. Schemas are
    /// static data, so this fails on first use of the entity type.
    pub fn new(subclasses: Vec<DefSubclass>) -> Self {
        match Self::try_new(subclasses) {
            Ok(schema) => schema,
            Err(err) => panic!("invalid attribute schema: {}", err),
        }
    }

    pub fn try_new(subclasses: Vec<DefSubclass>) -> Result<Self> {
        let mut index = IndexMap::new();
        for (subclass_index, subclass) in subclasses.iter().enumerate() {
            for (attr_index, attr) in subclass.attribs.iter().enumerate() {
                if index.insert(attr.name, (subclass_index, attr_index)).is_some() {
                    return Err(DxfError::Custom(format!("duplicate attribute {}", attr.name)));
                }
                if let Some(default) = &attr.default {
                    if attr.is_computed() {
                        return Err(DxfError::Custom(format!(
                            "computed attribute {} declares a default",
                            attr.name
                        )));
                    }
                    if !attr.kind.accepts(default) {
                        return Err(DxfError::Custom(format!(
                            "default of {} is not a {} value",
                            attr.name,
                            attr.kind.name()
                        )));
                    }
                }
            }
        }
        let mappings = subclasses.iter().map(DefSubclass::group_code_mapping).collect();
        let legacy_mapping = merge_group_code_mappings(subclasses.iter().skip(1));
        Ok(Self {
            subclasses,
            index,
            mappings,
            legacy_mapping,
        })
    }

    /// Attribute specification by name
    pub fn get(&self, name: &str) -> Option<&DxfAttr> {
        self.index
            .get(name)
            .map(|&(subclass, attr)| &self.subclasses[subclass].attribs[attr])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// First declared attribute with group code `code`
    pub fn get_by_code(&self, code: i32) -> Option<&DxfAttr> {
        self.attribs().find(|attr| attr.code == code)
    }

    /// All attributes in declaration order
    pub fn attribs(&self) -> impl Iterator<Item = &DxfAttr> + '_ {
        self.subclasses.iter().flat_map(|subclass| subclass.attribs.iter())
    }

    pub fn subclasses(&self) -> &[DefSubclass] {
        &self.subclasses
    }

    pub fn subclass(&self, index: usize) -> Option<&DefSubclass> {
        self.subclasses.get(index)
    }

    /// Group code mapping of the fragment at `index`
    pub fn group_code_mapping(&self, index: usize) -> Option<&GroupCodeMapping> {
        self.mappings.get(index)
    }

    /// Merged mapping of all fragments below the base class
    pub fn legacy_mapping(&self) -> &GroupCodeMapping {
        &self.legacy_mapping
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Default for 3D point attributes
pub const NULLVEC: Vector3 = Vector3::ZERO;
/// Default extrusion direction
pub const Z_AXIS: Vector3 = Vector3::UNIT_Z;

/// Default for 2D point attributes
pub const NULLVEC2: Vector2 = Vector2::ZERO;
