//! Line/column positions for byte offsets.

/// A 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Maps byte offsets to lines.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting offset of each line (line_starts[0] is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        let bytes = source.as_bytes();

        for (i, &byte) in bytes.iter().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            } else if byte == b'\r' && bytes.get(i + 1) != Some(&b'\n') {
                // \r not followed by \n - treat as line ending
                line_starts.push((i + 1) as u32);
            }
        }

        LineMap { line_starts }
    }

    /// 0-based index of the line containing `offset`.
    fn line_index(&self, offset: u32) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        }
    }

    /// 1-based line number of `offset`.
    pub fn line_of(&self, offset: u32) -> u32 {
        self.line_index(offset) as u32 + 1
    }

    /// 1-based line and column (in bytes) of `offset`.
    pub fn position_of(&self, offset: u32) -> Position {
        let index = self.line_index(offset);
        let line_start = self.line_starts.get(index).copied().unwrap_or(0);
        Position {
            line: index as u32 + 1,
            column: offset.saturating_sub(line_start) + 1,
        }
    }

    /// Byte offset at which the line containing `offset` starts.
    pub fn line_start_of(&self, offset: u32) -> u32 {
        self.line_starts
            .get(self.line_index(offset))
            .copied()
            .unwrap_or(0)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
