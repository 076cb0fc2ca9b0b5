//! Template store: loads reference bitmaps once and shares them read-only.
//!
//! Two layouts are supported:
//! - a flat directory of glyph images (digits), keyed by file stem;
//! - a nested item tree where every subdirectory is named by an item code and
//!   holds one or more pose variants of that item.
//!
//! Unreadable files are skipped with a warning. A store may end up empty;
//! callers that need templates check with [`TemplateStore::require_non_empty`].

use crate::template::{Template, TemplateKey};
use crate::util::{StockMatchError, StockMatchResult};

#[cfg(feature = "image-io")]
use crate::image::io::{has_supported_extension, load_template_image};
#[cfg(feature = "image-io")]
use crate::template::VariantKey;
#[cfg(feature = "image-io")]
use crate::trace::{trace_debug, trace_event, trace_span, trace_warn};
#[cfg(feature = "image-io")]
use std::path::{Path, PathBuf};

/// Read-only collection of templates in a reproducible order.
#[derive(Clone, Debug, Default)]
pub struct TemplateStore {
    templates: Vec<Template>,
}

impl TemplateStore {
    /// Builds a store from in-memory templates, preserving their order.
    pub fn from_templates(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    /// Returns the number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no template is loaded.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Iterates templates in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    /// Looks up a template by key.
    pub fn get(&self, key: &TemplateKey) -> Option<&Template> {
        self.templates.iter().find(|tpl| tpl.key() == key)
    }

    /// Returns the template at `index` in load order.
    pub fn get_index(&self, index: usize) -> Option<&Template> {
        self.templates.get(index)
    }

    /// Appends every template of `other`.
    pub fn merge(&mut self, other: TemplateStore) {
        self.templates.extend(other.templates);
    }

    /// Fails with `EmptyTemplateSet` if the store holds no templates.
    pub fn require_non_empty(self, kind: &'static str) -> StockMatchResult<Self> {
        if self.is_empty() {
            return Err(StockMatchError::EmptyTemplateSet { kind });
        }
        Ok(self)
    }

    /// Loads every image in a flat directory, keyed by file stem.
    #[cfg(feature = "image-io")]
    pub fn load_glyph_dir(dir: &Path) -> StockMatchResult<Self> {
        let _span = trace_span!("load_glyph_dir").entered();
        let mut templates = Vec::new();
        for path in sorted_entries(dir, EntryKind::File)? {
            if !has_supported_extension(&path) {
                continue;
            }
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            if let Some(tpl) = load_one(&path, TemplateKey::Glyph(stem)) {
                templates.push(tpl);
            }
        }
        trace_event!(
            "glyph_templates_loaded",
            dir = dir.display().to_string().as_str(),
            count = templates.len()
        );
        Ok(Self { templates })
    }

    /// Loads a nested item tree; every subdirectory name is an item code.
    ///
    /// `set` tags the variants so several trees can be merged into one store.
    #[cfg(feature = "image-io")]
    pub fn load_item_tree(dir: &Path, set: u16) -> StockMatchResult<Self> {
        let _span = trace_span!("load_item_tree", set = set).entered();
        let mut templates = Vec::new();
        let item_dirs = sorted_entries(dir, EntryKind::Dir)?;
        for item_dir in &item_dirs {
            let Some(item_code) = item_dir.file_name().map(|s| s.to_string_lossy().into_owned())
            else {
                continue;
            };
            let files: Vec<PathBuf> = sorted_entries(item_dir, EntryKind::File)?
                .into_iter()
                .filter(|path| has_supported_extension(path))
                .collect();
            if files.is_empty() {
                trace_debug!("item_without_templates", item = item_code.as_str());
                continue;
            }
            for (ordinal, path) in files.iter().enumerate() {
                let ordinal = u16::try_from(ordinal).unwrap_or(u16::MAX);
                let key = TemplateKey::Variant(VariantKey::new(item_code.clone(), set, ordinal));
                if let Some(tpl) = load_one(path, key) {
                    templates.push(tpl);
                }
            }
        }
        trace_event!(
            "item_templates_loaded",
            dir = dir.display().to_string().as_str(),
            items = item_dirs.len(),
            variants = templates.len()
        );
        Ok(Self { templates })
    }

    /// Loads several item trees, tagging each with its position as `set`.
    #[cfg(feature = "image-io")]
    pub fn load_item_trees<P: AsRef<Path>>(dirs: &[P]) -> StockMatchResult<Self> {
        let mut store = Self::default();
        for (set, dir) in dirs.iter().enumerate() {
            let set =
                u16::try_from(set).map_err(|_| StockMatchError::config("too many icon sets"))?;
            store.merge(Self::load_item_tree(dir.as_ref(), set)?);
        }
        Ok(store)
    }
}

#[cfg(feature = "image-io")]
#[derive(Clone, Copy, PartialEq)]
enum EntryKind {
    File,
    Dir,
}

/// Lists directory entries of one kind in sorted path order.
///
/// A missing directory is reported as a warning and yields no entries.
#[cfg(feature = "image-io")]
fn sorted_entries(dir: &Path, kind: EntryKind) -> StockMatchResult<Vec<PathBuf>> {
    if !dir.exists() {
        trace_warn!(
            "template_dir_missing",
            dir = dir.display().to_string().as_str()
        );
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|err| StockMatchError::TemplateLoad {
        path: dir.to_path_buf(),
        reason: err.to_string(),
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| match kind {
            EntryKind::File => path.is_file(),
            EntryKind::Dir => path.is_dir(),
        })
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(feature = "image-io")]
fn load_one(path: &Path, key: TemplateKey) -> Option<Template> {
    let loaded = load_template_image(path).and_then(|gray| {
        Template::new(key, gray).map_err(|err| StockMatchError::TemplateLoad {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    });
    match loaded {
        Ok(tpl) => Some(tpl),
        Err(err) => {
            trace_warn!("template_skipped", error = err.to_string().as_str());
            None
        }
    }
}
