use stockmatch::{CatalogEntry, ItemCatalog, ItemInfo, ItemResolver, SuffixRule};

fn entry(code: &str, name: &str, category: &str) -> CatalogEntry {
    CatalogEntry {
        code: code.to_string(),
        name: name.to_string(),
        category: category.to_string(),
    }
}

#[test]
fn exact_then_suffix_then_fallback() {
    let catalog = ItemCatalog::from_entries([
        entry("Rifle", "Infantry rifle", "Small arms"),
        entry("Ammo23", "23mm shells", "Ammunition"),
    ]);
    assert_eq!(catalog.len(), 2);
    assert_eq!(
        catalog.resolve("Rifle"),
        ItemInfo::new("Infantry rifle", "Small arms")
    );
    assert_eq!(
        catalog.resolve("Ammo23C"),
        ItemInfo::new("23mm shells (crate)", "Ammunition")
    );
    assert_eq!(
        catalog.resolve("RifleCrate"),
        ItemInfo::new("Infantry rifle (crate)", "Small arms")
    );
    assert_eq!(catalog.resolve("Shovel"), ItemInfo::new("Shovel", "Other"));
}

#[test]
fn custom_rules_replace_defaults() {
    let catalog = ItemCatalog::from_entries([entry("Rifle", "Rifle", "Small arms")])
        .with_rules(vec![SuffixRule::new("Pallet", " x100")]);
    assert_eq!(catalog.resolve("RiflePallet").name, "Rifle x100");
    assert_eq!(catalog.resolve("RifleC").name, "RifleC");
    assert_eq!(catalog.lookup("RifleC"), None);
}

#[test]
fn resolver_by_reference() {
    fn name_of(resolver: impl ItemResolver, code: &str) -> String {
        resolver.resolve(code).name
    }
    let catalog = ItemCatalog::from_entries([entry("Rifle", "Rifle", "Small arms")]);
    assert_eq!(name_of(&catalog, "RifleC"), "Rifle (crate)");
}

#[cfg(feature = "serde")]
#[test]
fn entries_and_rules_deserialize_from_json() {
    let entries: Vec<CatalogEntry> = serde_json::from_str(
        r#"[{"code": "Ammo23", "name": "23mm shells", "category": "Ammunition"}]"#,
    )
    .unwrap();
    let rules: Vec<SuffixRule> =
        serde_json::from_str(r#"[{"suffix": "C", "label": " crate"}]"#).unwrap();
    let catalog = ItemCatalog::from_entries(entries).with_rules(rules);
    assert_eq!(catalog.resolve("Ammo23C").name, "23mm shells crate");
}
