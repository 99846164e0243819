//! DXF ASCII text tokenizer

use super::stream_reader::{DxfCodePair, DxfStreamReader};
use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::{COMMENT_MARKER, STRUCTURE_MARKER};
use encoding_rs::Encoding;
use std::io::BufRead;

/// Highest group code defined by the DXF reference
const MAX_GROUP_CODE: i32 = 1071;

/// DXF ASCII text reader
///
/// Consumes the input two lines at a time. Comments are skipped and reading
/// stops after the `(0, EOF)` pair.
pub struct DxfTextReader<R: BufRead> {
    reader: R,
    line_number: usize,
    peeked_pair: Option<DxfCodePair>,
    eof_seen: bool,
    /// Non-UTF8 fallback encoding.  `None` means use Latin-1 (byte-to-char).
    encoding: Option<&'static Encoding>,
}

impl<R: BufRead> DxfTextReader<R> {
    /// Create a new DXF text reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            peeked_pair: None,
            eof_seen: false,
            encoding: None,
        }
    }

    /// Set the fallback encoding for lines that are not valid UTF-8
    pub fn with_encoding(mut self, encoding: Option<&'static Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read a single line without its line terminator.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut bytes = Vec::new();
        if self.reader.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }

        let line = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(err) => {
                let bytes = err.into_bytes();
                if let Some(enc) = self.encoding {
                    let (decoded, _, _) = enc.decode(&bytes);
                    decoded.into_owned()
                } else {
                    // Latin-1 is a 1:1 mapping of bytes 0-255 to Unicode code points
                    bytes.iter().map(|&b| b as char).collect()
                }
            }
        };
        Ok(Some(line))
    }

    fn read_pair_internal(&mut self) -> Result<Option<DxfCodePair>> {
        loop {
            if self.eof_seen {
                return Ok(None);
            }
            let code_line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };
            let line = self.line_number;
            let code = code_line
                .trim()
                .parse::<i32>()
                .ok()
                .filter(|code| (0..=MAX_GROUP_CODE).contains(code))
                .ok_or_else(|| {
                    DxfError::StructureError(format!(
                        "Invalid group code \"{}\" at line {}",
                        code_line.trim(),
                        line
                    ))
                })?;

            let value = match self.read_line()? {
                Some(value) => value,
                None => {
                    return Err(DxfError::StructureError(format!(
                        "Premature end of file after group code {} at line {}",
                        code, line
                    )))
                }
            };

            if code == COMMENT_MARKER {
                continue;
            }
            if code == STRUCTURE_MARKER && value.trim() == "EOF" {
                self.eof_seen = true;
            }
            return Ok(Some(DxfCodePair::new(code, value, line)));
        }
    }
}

impl<R: BufRead> DxfStreamReader for DxfTextReader<R> {
    fn read_pair(&mut self) -> Result<Option<DxfCodePair>> {
        if let Some(pair) = self.peeked_pair.take() {
            return Ok(Some(pair));
        }
        self.read_pair_internal()
    }

    fn peek_code(&mut self) -> Result<Option<i32>> {
        if let Some(ref pair) = self.peeked_pair {
            return Ok(Some(pair.code));
        }
        match self.read_pair_internal()? {
            Some(pair) => {
                let code = pair.code;
                self.peeked_pair = Some(pair);
                Ok(Some(code))
            }
            None => Ok(None),
        }
    }

    fn push_back(&mut self, pair: DxfCodePair) {
        self.peeked_pair = Some(pair);
    }
}
