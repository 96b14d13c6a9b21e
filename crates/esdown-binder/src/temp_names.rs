//! Synthesized temporary names.

use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// Name for the `index`-th temporary of a scope: `_a`..`_z`, then `_0`, `_1`, ...
pub fn temp_name(index: u32) -> String {
    if index < 26 {
        format!("_{}", char::from(b'a' + index as u8))
    } else {
        format!("_{}", index - 26)
    }
}

/// Temporaries of one hoist scope.
///
/// Names are minted in sequence, skipping any name in the caller's reserved
/// set. Released names go to a free list and are handed out again,
/// lowest-minted first, so sibling sites share the same few names.
#[derive(Clone, Debug, Default)]
pub struct TempRegistry {
    next_index: u32,
    declared: Vec<String>,
    /// Slots of `declared` currently available.
    free: BTreeSet<usize>,
}

impl TempRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self, reserved: &FxHashSet<String>) -> String {
        loop {
            let name = temp_name(self.next_index);
            self.next_index += 1;
            if !reserved.contains(&name) {
                return name;
            }
        }
    }

    pub fn acquire(&mut self, reserved: &FxHashSet<String>) -> String {
        if let Some(slot) = self.free.pop_first() {
            return self.declared[slot].clone();
        }
        let name = self.mint(reserved);
        self.declared.push(name.clone());
        name
    }

    /// Put `name` back on the free list. Returns false for names this
    /// registry never handed out, or that are already free.
    pub fn release(&mut self, name: &str) -> bool {
        match self.declared.iter().position(|declared| declared == name) {
            Some(slot) => self.free.insert(slot),
            None => false,
        }
    }

    /// Mint a name that is neither declared here nor ever reused.
    pub fn claim(&mut self, reserved: &FxHashSet<String>) -> String {
        self.mint(reserved)
    }

    /// Every temporary handed out so far, in minting order.
    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    #[cfg(test)]
    pub(crate) fn in_use(&self) -> usize {
        self.declared.len() - self.free.len()
    }
}

#[cfg(test)]
#[path = "tests/temp_names_tests.rs"]
mod temp_names_tests;
