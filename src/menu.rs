//! The fixed application catalog shown in the menu.
//!
//! Built once at startup and handed to the input router, renderer and
//! main loop by reference.

/// Number of selectable menu entries.
pub const MENU_ENTRY_COUNT: usize = 2;

/// What a menu entry does when selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryKind {
    /// Live RSSI + NFC summary screen.
    SubScan,
    /// Named entry with no data or behaviour.
    Placeholder,
}

/// One selectable item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub name: &'static str,
    pub kind: EntryKind,
}

/// Ordered, immutable list of menu entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuCatalog {
    entries: [MenuEntry; MENU_ENTRY_COUNT],
}

impl MenuCatalog {
    pub const fn new() -> Self {
        Self {
            entries: [
                MenuEntry {
                    name: "SubScanApp",
                    kind: EntryKind::SubScan,
                },
                MenuEntry {
                    name: "TestApp",
                    kind: EntryKind::Placeholder,
                },
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&MenuEntry> {
        self.entries.get(index)
    }

    /// Kind of the entry at `index`; out-of-range indices behave as placeholders.
    pub fn kind(&self, index: usize) -> EntryKind {
        self.entry(index)
            .map(|e| e.kind)
            .unwrap_or(EntryKind::Placeholder)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MenuEntry> {
        self.entries.iter()
    }
}

impl Default for MenuCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_two_named_entries_in_order() {
        let catalog = MenuCatalog::new();
        let names: Vec<&str> = catalog.iter().map(|e| e.name).collect();
        assert_eq!(names, ["SubScanApp", "TestApp"]);
        assert_eq!(catalog.len(), MENU_ENTRY_COUNT);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn only_first_entry_is_live() {
        let catalog = MenuCatalog::new();
        assert_eq!(catalog.kind(0), EntryKind::SubScan);
        assert_eq!(catalog.kind(1), EntryKind::Placeholder);
        assert_eq!(catalog.kind(7), EntryKind::Placeholder);
        assert!(catalog.entry(2).is_none());
    }
}
