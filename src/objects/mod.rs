//! Objects of the OBJECTS section with data beyond their attributes

pub mod dictionary;
pub mod xrecord;

pub use dictionary::{DictionaryData, DictionaryEntry, DICTIONARY_SCHEMA};
pub use xrecord::{DictionaryCloningFlags, XRecordData, XRECORD_SCHEMA};
