//! Item code to display name and category resolution.
//!
//! Lookups go through an exact table first, then through suffix rules: a code
//! such as `RifleCrate` whose base `Rifle` is known resolves to the base item
//! with the rule's label appended. Unknown codes resolve to themselves under
//! the [`UNKNOWN_CATEGORY`] category, so resolution never fails.

use std::collections::HashMap;

/// Category reported for codes missing from the catalog.
pub const UNKNOWN_CATEGORY: &str = "Other";

/// Display information of an item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemInfo {
    pub name: String,
    pub category: String,
}

impl ItemInfo {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

/// Maps canonical item codes to display information.
pub trait ItemResolver {
    fn resolve(&self, item_code: &str) -> ItemInfo;
}

/// Code suffix denoting a packaged form of a base item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuffixRule {
    pub suffix: String,
    /// Appended to the base item's display name.
    pub label: String,
}

impl SuffixRule {
    pub fn new(suffix: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            label: label.into(),
        }
    }

    /// Rules for crated items: `Crate` and its short form `C`.
    pub fn crate_rules() -> Vec<SuffixRule> {
        vec![
            SuffixRule::new("Crate", " (crate)"),
            SuffixRule::new("C", " (crate)"),
        ]
    }
}

/// One catalog row, as stored in catalog files.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogEntry {
    pub code: String,
    pub name: String,
    pub category: String,
}

/// In-memory item catalog with suffix fallback.
#[derive(Clone, Debug)]
pub struct ItemCatalog {
    entries: HashMap<String, ItemInfo>,
    rules: Vec<SuffixRule>,
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            rules: SuffixRule::crate_rules(),
        }
    }
}

impl ItemCatalog {
    /// Empty catalog with the crate suffix rules.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.insert(entry.code, ItemInfo::new(entry.name, entry.category));
        }
        catalog
    }

    /// Replaces the suffix rules; they are tried in order.
    pub fn with_rules(mut self, rules: Vec<SuffixRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn insert(&mut self, code: impl Into<String>, info: ItemInfo) {
        self.entries.insert(code.into(), info);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a code without the unknown-code fallback.
    pub fn lookup(&self, item_code: &str) -> Option<ItemInfo> {
        if let Some(info) = self.entries.get(item_code) {
            return Some(info.clone());
        }
        self.rules.iter().find_map(|rule| {
            let base = item_code.strip_suffix(rule.suffix.as_str())?;
            if base.is_empty() {
                return None;
            }
            let info = self.entries.get(base)?;
            Some(ItemInfo::new(
                format!("{}{}", info.name, rule.label),
                info.category.clone(),
            ))
        })
    }
}

impl ItemResolver for ItemCatalog {
    fn resolve(&self, item_code: &str) -> ItemInfo {
        self.lookup(item_code)
            .unwrap_or_else(|| ItemInfo::new(item_code, UNKNOWN_CATEGORY))
    }
}

impl<R: ItemResolver + ?Sized> ItemResolver for &R {
    fn resolve(&self, item_code: &str) -> ItemInfo {
        (**self).resolve(item_code)
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemCatalog, ItemInfo, ItemResolver, SuffixRule, UNKNOWN_CATEGORY};

    fn catalog() -> ItemCatalog {
        let mut catalog = ItemCatalog::new();
        catalog.insert("Rifle", ItemInfo::new("Rifle", "Weapons"));
        catalog.insert("Ammo23", ItemInfo::new("Ammo 23mm", "Ammunition"));
        catalog
    }

    #[test]
    fn exact_entry_wins_over_suffix() {
        let mut catalog = catalog();
        catalog.insert("Ammo23C", ItemInfo::new("Ammo 23mm box", "Ammunition"));
        assert_eq!(catalog.resolve("Ammo23C").name, "Ammo 23mm box");
    }

    #[test]
    fn suffix_rules_apply_in_order() {
        let catalog = catalog();
        assert_eq!(
            catalog.resolve("RifleCrate"),
            ItemInfo::new("Rifle (crate)", "Weapons")
        );
        assert_eq!(
            catalog.resolve("Ammo23C"),
            ItemInfo::new("Ammo 23mm (crate)", "Ammunition")
        );
    }

    #[test]
    fn unknown_code_falls_back_to_itself() {
        let catalog = catalog().with_rules(Vec::new());
        assert_eq!(
            catalog.resolve("RifleC"),
            ItemInfo::new("RifleC", UNKNOWN_CATEGORY)
        );
        assert_eq!(catalog.resolve("C").category, UNKNOWN_CATEGORY);
    }

    #[test]
    fn bare_suffix_is_not_a_base() {
        let mut catalog = ItemCatalog::new().with_rules(vec![SuffixRule::new("C", "!")]);
        catalog.insert("", ItemInfo::new("empty", "x"));
        assert_eq!(catalog.lookup("C"), None);
    }
}
