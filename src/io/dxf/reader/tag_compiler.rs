//! Compiles raw code/value pairs into typed tags
//!
//! Point coordinates spread over several pairs and chunked binary data are
//! merged into single tags here.

use super::stream_reader::{DxfCodePair, DxfStreamReader, PairVecReader};
use super::text_reader::DxfTextReader;
use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::{is_chunked_binary_code, ValueKind, STRUCTURE_MARKER};
use crate::io::dxf::tags::{DxfValue, Tag, Tags};
use crate::types::{Handle, Vector2, Vector3};
use std::io::Cursor;

/// Lazy tag source over a [`DxfStreamReader`]
///
/// Yields `Result<Tag>`; after the first error the iterator is exhausted.
pub struct TagCompiler<S: DxfStreamReader> {
    reader: S,
    failed: bool,
}

impl<S: DxfStreamReader> TagCompiler<S> {
    pub fn new(reader: S) -> Self {
        Self {
            reader,
            failed: false,
        }
    }

    fn compile_next(&mut self) -> Result<Option<Tag>> {
        let pair = match self.reader.read_pair()? {
            Some(pair) => pair,
            None => return Ok(None),
        };
        let code = pair.code;
        let value = match ValueKind::from_code(code) {
            ValueKind::Point => self.compile_point(&pair)?,
            ValueKind::Binary if is_chunked_binary_code(code) => {
                let mut data = parse_binary(&pair)?;
                while self.reader.peek_code()? == Some(code) {
                    if let Some(next) = self.reader.read_pair()? {
                        data.extend(parse_binary(&next)?);
                    }
                }
                DxfValue::Binary(data)
            }
            ValueKind::Binary => DxfValue::Binary(parse_binary(&pair)?),
            ValueKind::Handle => match Handle::parse_hex(&pair.value) {
                Some(handle) => DxfValue::Handle(handle),
                None => DxfValue::Text(pair.value),
            },
            ValueKind::Int => DxfValue::Int(parse_int(&pair)?),
            ValueKind::Float => DxfValue::Float(parse_float(&pair)?),
            ValueKind::Text if code == STRUCTURE_MARKER => {
                DxfValue::Text(pair.value.trim().to_string())
            }
            ValueKind::Text => DxfValue::Text(pair.value),
        };
        Ok(Some(Tag { code, value }))
    }

    fn compile_point(&mut self, x_pair: &DxfCodePair) -> Result<DxfValue> {
        let x = parse_float(x_pair)?;
        let y_pair = match self.reader.read_pair()? {
            Some(pair) if pair.code == x_pair.code + 10 => pair,
            _ => {
                return Err(DxfError::StructureError(format!(
                    "Missing required y coordinate near line {}",
                    x_pair.line
                )))
            }
        };
        let y = parse_float(&y_pair)?;

        match self.reader.read_pair()? {
            Some(z_pair) if z_pair.code == x_pair.code + 20 => {
                let z = parse_float(&z_pair)?;
                Ok(DxfValue::Point3(Vector3::new(x, y, z)))
            }
            Some(other) => {
                self.reader.push_back(other);
                Ok(DxfValue::Point2(Vector2::new(x, y)))
            }
            None => Ok(DxfValue::Point2(Vector2::new(x, y))),
        }
    }

    /// Collect all remaining tags
    pub fn collect_tags(self) -> Result<Tags> {
        self.collect()
    }
}

impl<S: DxfStreamReader> Iterator for TagCompiler<S> {
    type Item = Result<Tag>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.compile_next() {
            Ok(tag) => tag.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

fn value_error(pair: &DxfCodePair, kind: &str) -> DxfError {
    DxfError::StructureError(format!(
        "Invalid {} value \"{}\" for group code {} at line {}",
        kind,
        pair.value.trim(),
        pair.code,
        pair.line + 1
    ))
}

fn parse_float(pair: &DxfCodePair) -> Result<f64> {
    pair.value
        .trim()
        .parse::<f64>()
        .map_err(|_| value_error(pair, "floating point"))
}

/// Integers written as floats (`"1.0"`) are accepted.
fn parse_int(pair: &DxfCodePair) -> Result<i64> {
    let value = pair.value.trim();
    if let Ok(v) = value.parse::<i64>() {
        return Ok(v);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v as i64)
        .ok_or_else(|| value_error(pair, "integer"))
}

fn parse_binary(pair: &DxfCodePair) -> Result<Vec<u8>> {
    decode_hex(pair.value.trim()).ok_or_else(|| value_error(pair, "binary"))
}

/// Decode a hex string like `"0AFF"`
pub fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| s.get(i..i + 2).and_then(|byte| u8::from_str_radix(byte, 16).ok()))
        .collect()
}

impl Tags {
    /// Compile tags from DXF text, e.g. a single entity copied out of a file.
    pub fn from_text(text: &str) -> Result<Tags> {
        TagCompiler::new(DxfTextReader::new(Cursor::new(text.as_bytes()))).collect_tags()
    }

    /// Compile tags from raw (code, value string) pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Tags>
    where
        I: IntoIterator<Item = (i32, S)>,
        S: Into<String>,
    {
        let reader = PairVecReader::new(pairs.into_iter().map(|(code, value)| (code, value.into())));
        TagCompiler::new(reader).collect_tags()
    }
}
