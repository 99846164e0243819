//! Table entries (TABLES section)
//!
//! Table heads `(0, TABLE)` and `(0, ENDTAB)` stay raw section items, only
//! the entries are entities.

use crate::entities::attributes::DefSubclass;

pub mod layer;

pub use layer::{LayerFlags, LAYER_SCHEMA};

pub const ACDB_SYMBOL_TABLE_RECORD: &str = "AcDbSymbolTableRecord";

/// Common subclass of all table entries, it declares no attributes
pub fn acdb_symbol_table_record() -> DefSubclass {
    DefSubclass::new(Some(ACDB_SYMBOL_TABLE_RECORD), Vec::new())
}
