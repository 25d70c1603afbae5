//! Virtual register table
//!
//! Maps a method's variable names to local slots:
//! - slot 0 is the receiver in instance methods
//! - parameters follow in declaration order
//! - locals and temporaries get the next free slot on first use

use crate::consts::THIS;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterTable {
    /// Next available register slot
    nextreg: u16,
    slots: HashMap<String, u16>,
}

impl RegisterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding `this` (instance methods only) and the parameters
    pub fn for_method<'a>(is_static: bool, params: impl IntoIterator<Item = &'a str>) -> Self {
        let mut table = Self::new();
        if !is_static {
            table.new_local_named(THIS);
        }
        for param in params {
            table.new_local_named(param);
        }
        table
    }

    /// Slot for `name`, allocating the next one if the name is new
    pub fn new_local_named(&mut self, name: &str) -> u16 {
        if let Some(&existing) = self.slots.get(name) {
            return existing;
        }
        let reg = self.nextreg;
        self.nextreg += 1;
        self.slots.insert(name.to_string(), reg);
        log::trace!("register {} -> {}", name, reg);
        reg
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.slots.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names ordered by slot
    pub fn entries(&self) -> Vec<(&str, u16)> {
        let mut entries: Vec<(&str, u16)> =
            self.slots.iter().map(|(n, &r)| (n.as_str(), r)).collect();
        entries.sort_by_key(|&(_, r)| r);
        entries
    }
}
