//! Store of the active definition for each local message number.

use super::definition::LocalDefinition;

/// Number of local message numbers addressable by a record header.
pub const LOCAL_MESSAGES: usize = 16;

/// Most recent definition for each local message number.
///
/// A definition replaces any earlier one for the same number; no history is
/// kept.
#[derive(Debug, Default)]
pub struct Registry {
    definitions: [Option<LocalDefinition>; LOCAL_MESSAGES],
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a definition under its local message number, returning the one
    /// it replaces.
    pub fn define(&mut self, definition: LocalDefinition) -> Option<LocalDefinition> {
        let slot = &mut self.definitions[definition.local as usize % LOCAL_MESSAGES];
        slot.replace(definition)
    }

    /// Retrieve the active definition for a local message number, if one
    /// exists.
    pub fn get(&self, local: u8) -> Option<&LocalDefinition> {
        self.definitions.get(local as usize)?.as_ref()
    }

    /// Number of local message numbers with an active definition.
    pub fn len(&self) -> usize {
        self.definitions.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::sans::definition::Architecture;

    fn definition(local: u8, global_message: u16) -> LocalDefinition {
        LocalDefinition {
            local,
            architecture: Architecture::LittleEndian,
            global_message,
            fields: Vec::new(),
            developer_fields: Vec::new(),
        }
    }

    #[test]
    fn replaces_definitions() {
        let mut registry = Registry::new();
        assert!(registry.get(3).is_none());

        assert!(registry.define(definition(3, 20)).is_none());
        let replaced = registry.define(definition(3, 21));

        assert_eq!(replaced.map(|d| d.global_message), Some(20));
        assert_eq!(registry.get(3).map(|d| d.global_message), Some(21));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn out_of_range_lookup() {
        let registry = Registry::new();
        assert!(registry.get(16).is_none());
        assert!(registry.is_empty());
    }
}
