//! Raw code/value pair source

use crate::error::Result;

/// A raw code/value pair as read from the stream, before type coercion
#[derive(Debug, Clone, PartialEq)]
pub struct DxfCodePair {
    /// Group code
    pub code: i32,
    /// Value line, line terminators removed
    pub value: String,
    /// Line number of the code line, 1-based
    pub line: usize,
}

impl DxfCodePair {
    pub fn new(code: i32, value: impl Into<String>, line: usize) -> Self {
        Self {
            code,
            value: value.into(),
            line,
        }
    }
}

/// Trait for pulling code/value pairs one at a time
pub trait DxfStreamReader {
    /// Read the next code/value pair, `None` at the end of the stream
    fn read_pair(&mut self) -> Result<Option<DxfCodePair>>;

    /// Peek at the next code without consuming it
    fn peek_code(&mut self) -> Result<Option<i32>>;

    /// Push a pair back to be read again on the next `read_pair` call
    fn push_back(&mut self, pair: DxfCodePair);
}

/// In-memory pair source, used to compile tags that did not come from text
#[derive(Debug, Default)]
pub struct PairVecReader {
    pairs: std::collections::VecDeque<DxfCodePair>,
}

impl PairVecReader {
    pub fn new<I: IntoIterator<Item = (i32, String)>>(pairs: I) -> Self {
        Self {
            pairs: pairs
                .into_iter()
                .enumerate()
                .map(|(index, (code, value))| DxfCodePair::new(code, value, index * 2 + 1))
                .collect(),
        }
    }
}

impl DxfStreamReader for PairVecReader {
    fn read_pair(&mut self) -> Result<Option<DxfCodePair>> {
        Ok(self.pairs.pop_front())
    }

    fn peek_code(&mut self) -> Result<Option<i32>> {
        Ok(self.pairs.front().map(|pair| pair.code))
    }

    fn push_back(&mut self, pair: DxfCodePair) {
        self.pairs.push_front(pair);
    }
}
