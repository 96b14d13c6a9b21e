//! Range-based text alteration buffer.
//!
//! Edits are recorded against byte offsets of the original source and only
//! materialized by `get` (for a sub-range) or `apply` (for the whole text).
//! A replacement that covers earlier edits subsumes them: callers build the
//! covering text with `get`, which already includes those edits.

use crate::error::LoweringError;

#[derive(Clone, Debug)]
struct Edit {
    start: u32,
    end: u32,
    text: String,
    /// Recording order; breaks ties between inserts at the same offset.
    order: u64,
}

impl Edit {
    fn is_insert(&self) -> bool {
        self.start == self.end
    }

    fn sort_key(&self) -> (u32, bool, u64) {
        (self.start, !self.is_insert(), self.order)
    }
}

#[derive(Clone, Debug)]
pub struct AlterationBuffer {
    source: String,
    edits: Vec<Edit>,
    next_order: u64,
}

impl AlterationBuffer {
    pub fn new(source: impl Into<String>) -> Self {
        AlterationBuffer {
            source: source.into(),
            edits: Vec::new(),
            next_order: 0,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of pending edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of pending edits that replace source text.
    pub fn replacement_count(&self) -> usize {
        self.edits.iter().filter(|edit| !edit.is_insert()).count()
    }

    fn check_range(&self, start: u32, end: u32) -> Result<(), LoweringError> {
        let valid = start <= end
            && (end as usize) <= self.source.len()
            && self.source.is_char_boundary(start as usize)
            && self.source.is_char_boundary(end as usize);
        if valid {
            Ok(())
        } else {
            Err(LoweringError::InvalidRange { start, end })
        }
    }

    fn push(&mut self, start: u32, end: u32, text: String) {
        self.edits.push(Edit {
            start,
            end,
            text,
            order: self.next_order,
        });
        self.next_order += 1;
    }

    /// Replace `start..end` with `text`.
    ///
    /// Edits strictly inside the range (and replacements of the same range)
    /// are dropped. Inserts on either boundary are kept. Partial overlap with
    /// an existing replacement is an error.
    pub fn replace(&mut self, start: u32, end: u32, text: &str) -> Result<(), LoweringError> {
        self.check_range(start, end)?;
        if start == end {
            return self.insert(start, text);
        }
        for edit in &self.edits {
            let disjoint = edit.end <= start || edit.start >= end;
            let inside = edit.start >= start && edit.end <= end;
            if edit.is_insert() || disjoint || inside {
                continue;
            }
            return Err(LoweringError::OverlappingEdit { start, end });
        }
        self.edits.retain(|edit| {
            let subsumed = if edit.is_insert() {
                edit.start > start && edit.start < end
            } else {
                edit.start >= start && edit.end <= end
            };
            !subsumed
        });
        self.push(start, end, text.to_string());
        Ok(())
    }

    /// Insert `text` at `offset`. Inserts at the same offset keep their
    /// recording order and come before a replacement starting there.
    pub fn insert(&mut self, offset: u32, text: &str) -> Result<(), LoweringError> {
        self.check_range(offset, offset)?;
        let inside_replacement = self
            .edits
            .iter()
            .any(|edit| !edit.is_insert() && edit.start < offset && offset < edit.end);
        if inside_replacement {
            return Err(LoweringError::OverlappingEdit {
                start: offset,
                end: offset,
            });
        }
        self.push(offset, offset, text.to_string());
        Ok(())
    }

    /// Text of `start..end` with every edit inside the range applied.
    ///
    /// Out-of-range requests are clamped to the source.
    pub fn get(&self, start: u32, end: u32) -> String {
        let len = self.source.len() as u32;
        let end = end.min(len);
        let start = start.min(end);
        let mut edits: Vec<&Edit> = self
            .edits
            .iter()
            .filter(|edit| {
                if edit.is_insert() {
                    edit.start > start && edit.start < end
                } else {
                    edit.start >= start && edit.end <= end
                }
            })
            .collect();
        edits.sort_by_key(|edit| edit.sort_key());
        self.render(start, end, &edits)
    }

    /// The whole source with every edit applied.
    pub fn apply(&self) -> String {
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        edits.sort_by_key(|edit| edit.sort_key());
        self.render(0, self.source.len() as u32, &edits)
    }

    fn render(&self, start: u32, end: u32, edits: &[&Edit]) -> String {
        let mut out = String::with_capacity((end - start) as usize);
        let mut cursor = start as usize;
        for edit in edits {
            let edit_start = edit.start as usize;
            if edit_start > cursor {
                out.push_str(self.source.get(cursor..edit_start).unwrap_or_default());
            }
            out.push_str(&edit.text);
            cursor = cursor.max(edit.end as usize);
        }
        if (end as usize) > cursor {
            out.push_str(self.source.get(cursor..end as usize).unwrap_or_default());
        }
        out
    }
}

#[cfg(test)]
#[path = "tests/alter_tests.rs"]
mod alter_tests;
