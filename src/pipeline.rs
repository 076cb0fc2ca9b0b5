//! End-to-end screenshot recognition.
//!
//! A [`Recognizer`] owns the loaded icon and glyph templates and turns one
//! screenshot into an [`InventoryReport`]: icon detection, glyph detection,
//! quantity composition and item resolution. Batches keep going past images
//! that fail to load and list them in the [`BatchSummary`].

use crate::catalog::{ItemCatalog, ItemResolver};
use crate::detect::{CancelToken, DigitDetection, DigitDetector, IconDetection, IconDetector};
use crate::image::OwnedImage;
use crate::quantity::{ComposeConfig, QuantityComposer};
use crate::record::{InventoryReport, RecordBuilder};
use crate::search::{MatchConfig, SearchImage};
use crate::template::TemplateStore;
use crate::trace::trace_event;
use crate::util::{StockMatchError, StockMatchResult};
use chrono::Local;
use std::path::PathBuf;
use std::time::Instant;

#[cfg(feature = "image-io")]
use crate::image::annotate::save_annotated;
#[cfg(feature = "image-io")]
use crate::image::io::{decode_screenshot, load_screenshot};
#[cfg(feature = "image-io")]
use crate::trace::{trace_span, trace_warn};
#[cfg(feature = "image-io")]
use std::path::Path;

/// Startup configuration of a [`Recognizer`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecognizerConfig {
    /// Nested item template trees; each becomes its own template set.
    pub icon_dirs: Vec<PathBuf>,
    /// Flat directory of glyph templates.
    pub digit_dir: PathBuf,
    pub match_cfg: MatchConfig,
    pub compose_cfg: ComposeConfig,
    /// Icon worker pool size; `None` derives it from the host.
    pub workers: Option<usize>,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            icon_dirs: vec![PathBuf::from("templates/items")],
            digit_dir: PathBuf::from("templates/digits"),
            match_cfg: MatchConfig::default(),
            compose_cfg: ComposeConfig::default(),
            workers: None,
        }
    }
}

impl RecognizerConfig {
    pub fn validate(&self) -> StockMatchResult<()> {
        self.match_cfg.validate()?;
        self.compose_cfg.validate()?;
        if self.icon_dirs.is_empty() {
            return Err(StockMatchError::config("at least one icon directory is required"));
        }
        if self.icon_dirs.iter().any(|dir| dir.as_os_str().is_empty())
            || self.digit_dir.as_os_str().is_empty()
        {
            return Err(StockMatchError::config("template directory paths must not be empty"));
        }
        if self.workers == Some(0) {
            return Err(StockMatchError::config("workers must be positive"));
        }
        Ok(())
    }
}

/// An image that could not be processed in a batch.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchSummary {
    pub reports: Vec<InventoryReport>,
    pub failures: Vec<ImageFailure>,
}

impl BatchSummary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Raw detections of one screenshot, before records are built.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Detections {
    pub icons: Vec<IconDetection>,
    /// Empty when no icon was found.
    pub digits: Vec<DigitDetection>,
}

/// Screenshot-to-inventory recognizer.
#[derive(Debug)]
pub struct Recognizer<R = ItemCatalog> {
    icons: IconDetector,
    digits: DigitDetector,
    builder: RecordBuilder,
    resolver: R,
}

impl<R: ItemResolver> Recognizer<R> {
    /// Builds a recognizer from already loaded template stores.
    pub fn from_stores(
        icon_store: TemplateStore,
        digit_store: TemplateStore,
        cfg: &RecognizerConfig,
        resolver: R,
    ) -> StockMatchResult<Self> {
        cfg.match_cfg.validate()?;
        cfg.compose_cfg.validate()?;
        let icons = IconDetector::with_workers(
            icon_store.require_non_empty("icon")?,
            cfg.match_cfg.clone(),
            cfg.workers,
        )?;
        let digits = DigitDetector::new(
            digit_store.require_non_empty("digit")?,
            cfg.match_cfg.clone(),
        )?;
        Ok(Self {
            icons,
            digits,
            builder: RecordBuilder::new(QuantityComposer::new(cfg.compose_cfg.clone())),
            resolver,
        })
    }

    /// Loads the template directories named in `cfg`.
    #[cfg(feature = "image-io")]
    pub fn from_config(cfg: &RecognizerConfig, resolver: R) -> StockMatchResult<Self> {
        cfg.validate()?;
        let _span = trace_span!("load_templates").entered();
        let start = Instant::now();
        let icon_store = TemplateStore::load_item_trees(&cfg.icon_dirs)?;
        let digit_store = TemplateStore::load_glyph_dir(&cfg.digit_dir)?;
        trace_event!(
            "templates_loaded",
            icons = icon_store.len(),
            glyphs = digit_store.len(),
            elapsed_ms = start.elapsed().as_millis() as u64
        );
        Self::from_stores(icon_store, digit_store, cfg, resolver)
    }

    pub fn icon_detector(&self) -> &IconDetector {
        &self.icons
    }

    pub fn digit_detector(&self) -> &DigitDetector {
        &self.digits
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Runs icon and glyph detection without building records.
    pub fn detect(&self, image: &SearchImage) -> StockMatchResult<Detections> {
        self.detect_inner(image, None)
    }

    /// Recognizes a prepared screenshot.
    pub fn process(
        &self,
        image: &SearchImage,
        source_image: Option<PathBuf>,
    ) -> StockMatchResult<InventoryReport> {
        self.process_inner(image, source_image, None).map(|(report, _)| report)
    }

    /// Like [`process`](Self::process), aborting icon detection when `cancel` fires.
    pub fn process_cancellable(
        &self,
        image: &SearchImage,
        source_image: Option<PathBuf>,
        cancel: &CancelToken,
    ) -> StockMatchResult<InventoryReport> {
        self.process_inner(image, source_image, Some(cancel)).map(|(report, _)| report)
    }

    /// Recognizes an in-memory grayscale screenshot.
    pub fn process_luma(&self, gray: OwnedImage) -> StockMatchResult<InventoryReport> {
        self.process(&SearchImage::new(gray), None)
    }

    /// Decodes and recognizes an encoded screenshot held in memory.
    #[cfg(feature = "image-io")]
    pub fn process_bytes(&self, bytes: &[u8]) -> StockMatchResult<InventoryReport> {
        let _span = trace_span!("process_bytes", len = bytes.len()).entered();
        let gray = decode_screenshot(bytes)?;
        self.process(&SearchImage::new(gray), None)
    }

    /// Loads and recognizes a screenshot file.
    #[cfg(feature = "image-io")]
    pub fn process_image(&self, path: &Path) -> StockMatchResult<InventoryReport> {
        self.process_image_with(path, None)
    }

    /// Like [`process_image`](Self::process_image), also writing a detection
    /// overlay to `annotate_dir/<stem>_annotated.png`.
    #[cfg(feature = "image-io")]
    pub fn process_image_annotated(
        &self,
        path: &Path,
        annotate_dir: &Path,
    ) -> StockMatchResult<InventoryReport> {
        self.process_image_with(path, Some(annotate_dir))
    }

    /// Recognizes every screenshot, recording failures instead of aborting.
    #[cfg(feature = "image-io")]
    pub fn process_batch<P: AsRef<Path>>(&self, paths: &[P]) -> BatchSummary {
        self.process_batch_with(paths, None)
    }

    /// Like [`process_batch`](Self::process_batch), writing an overlay per
    /// screenshot into `annotate_dir`.
    #[cfg(feature = "image-io")]
    pub fn process_batch_annotated<P: AsRef<Path>>(
        &self,
        paths: &[P],
        annotate_dir: &Path,
    ) -> BatchSummary {
        self.process_batch_with(paths, Some(annotate_dir))
    }

    #[cfg(feature = "image-io")]
    fn process_image_with(
        &self,
        path: &Path,
        annotate_dir: Option<&Path>,
    ) -> StockMatchResult<InventoryReport> {
        let _span = trace_span!("process_image", path = path.display().to_string().as_str())
            .entered();
        let image = SearchImage::new(load_screenshot(path)?);
        let (report, detections) = self.process_inner(&image, Some(path.to_path_buf()), None)?;
        if let Some(dir) = annotate_dir {
            let out = annotated_path(dir, path);
            save_annotated(&out, image.gray(), &detections.icons, &detections.digits)?;
            trace_event!("annotated", path = out.display().to_string().as_str());
        }
        Ok(report)
    }

    #[cfg(feature = "image-io")]
    fn process_batch_with<P: AsRef<Path>>(
        &self,
        paths: &[P],
        annotate_dir: Option<&Path>,
    ) -> BatchSummary {
        let _span = trace_span!("process_batch", images = paths.len()).entered();
        let mut summary = BatchSummary::default();
        for path in paths {
            let path = path.as_ref();
            match self.process_image_with(path, annotate_dir) {
                Ok(report) => summary.reports.push(report),
                Err(err) => {
                    trace_warn!(
                        "image_failed",
                        path = path.display().to_string().as_str(),
                        error = err.to_string().as_str()
                    );
                    summary.failures.push(ImageFailure {
                        path: path.to_path_buf(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        trace_event!(
            "batch_done",
            reports = summary.reports.len(),
            failures = summary.failures.len()
        );
        summary
    }

    fn detect_inner(
        &self,
        image: &SearchImage,
        cancel: Option<&CancelToken>,
    ) -> StockMatchResult<Detections> {
        let icons = match cancel {
            Some(token) => self.icons.detect_items_cancellable(image, token)?,
            None => self.icons.detect_items(image)?,
        };
        let digits = if icons.is_empty() {
            Vec::new()
        } else {
            self.digits.detect_numbers(image)
        };
        Ok(Detections { icons, digits })
    }

    fn process_inner(
        &self,
        image: &SearchImage,
        source_image: Option<PathBuf>,
        cancel: Option<&CancelToken>,
    ) -> StockMatchResult<(InventoryReport, Detections)> {
        let start = Instant::now();
        let timestamp = Local::now();
        let detections = self.detect_inner(image, cancel)?;
        let records = self.builder.build_at(
            &detections.icons,
            &detections.digits,
            &self.resolver,
            timestamp,
        );
        trace_event!(
            "image_processed",
            items = records.len(),
            glyphs = detections.digits.len(),
            elapsed_ms = start.elapsed().as_millis() as u64
        );
        Ok((
            InventoryReport::new(records, source_image, timestamp),
            detections,
        ))
    }
}

/// Overlay file name for `source` inside `dir`.
#[cfg(feature = "image-io")]
fn annotated_path(dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "screenshot".to_string());
    dir.join(format!("{stem}_annotated.png"))
}
