use serde::Serialize;

/// A named line range of the source with its own set of variants.
///
/// `line_end` is `None` while the closing marker has not been seen. After a
/// scan every group is closed; unterminated groups run to the last line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub name: String,
    pub line_start: usize,
    pub line_end: Option<usize>,
}

impl Group {
    pub fn open(name: impl Into<String>, line_start: usize) -> Self {
        Self {
            name: name.into(),
            line_start,
            line_end: None,
        }
    }

    pub fn closed(name: impl Into<String>, line_start: usize, line_end: usize) -> Self {
        Self {
            name: name.into(),
            line_start,
            line_end: Some(line_end),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.line_end.is_some()
    }
}
