//! JSON layer manifest.
//!
//! ```json
//! {
//!   "width": 64, "height": 64, "color_mode": "rgb",
//!   "records": [
//!     { "name": "Group", "kind": "group_open" },
//!     { "name": "Sky", "bounds": [0, 0, 32, 64], "image": "sky.png", "opacity": 200 },
//!     { "name": "</Layer group>" }
//!   ]
//! }
//! ```
//!
//! Records are listed in stream order, exactly as the tree builder consumes them. A record
//! without `kind` is classified from its name, flags and bounds. Paths are relative to the
//! manifest file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::decode::decode_image_file;
use crate::color::space::{ColorMode, IccProfile};
use crate::document::model::{Document, DocumentInfo, LoadReport};
use crate::foundation::core::{EdgeBounds, Progress};
use crate::foundation::error::{LayerstackError, LayerstackResult};
use crate::records::builder::LoadOptions;
use crate::records::record::{LayerRecord, RecordFlags, RecordKind, classify};

fn default_bit_depth() -> u8 {
    8
}

fn default_opacity() -> u8 {
    255
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerManifest {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u8,
    #[serde(default)]
    pub color_mode: Option<String>,
    /// Path to an ICC profile file.
    #[serde(default)]
    pub icc_profile: Option<PathBuf>,
    pub records: Vec<ManifestRecord>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestRecord {
    pub name: String,
    #[serde(default)]
    pub kind: Option<RecordKind>,
    /// `[top, left, bottom, right]`; defaults to the image extent at the origin.
    #[serde(default)]
    pub bounds: Option<[i32; 4]>,
    #[serde(default = "default_opacity")]
    pub opacity: u8,
    #[serde(default)]
    pub flags: RecordFlags,
    #[serde(default)]
    pub image: Option<PathBuf>,
}

impl LayerManifest {
    pub fn from_reader<R: std::io::Read>(r: R) -> LayerstackResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| LayerstackError::serde(format!("parse layer manifest JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> LayerstackResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open layer manifest '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Resolve images and the profile relative to `root` and produce decoder output.
    pub fn resolve(self, root: &Path) -> LayerstackResult<(DocumentInfo, Vec<LayerRecord>)> {
        let icc_profile = match &self.icc_profile {
            Some(rel) => {
                let path = root.join(rel);
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("read ICC profile '{}'", path.display()))?;
                Some(IccProfile(bytes))
            }
            None => None,
        };
        let info = DocumentInfo {
            width: self.width,
            height: self.height,
            bit_depth: self.bit_depth,
            color_mode: self
                .color_mode
                .as_deref()
                .map_or(ColorMode::Rgb, ColorMode::parse),
            icc_profile,
        };

        let records = self
            .records
            .into_iter()
            .map(|r| r.resolve(root))
            .collect::<LayerstackResult<Vec<_>>>()?;
        Ok((info, records))
    }
}

impl ManifestRecord {
    fn resolve(self, root: &Path) -> LayerstackResult<LayerRecord> {
        let explicit_bounds = self
            .bounds
            .map(|[top, left, bottom, right]| EdgeBounds::new(top, left, bottom, right));
        let provisional = explicit_bounds.unwrap_or_default();
        let kind = self
            .kind
            .unwrap_or_else(|| classify(&self.name, provisional, self.flags));

        let image = match (&self.image, kind) {
            (Some(rel), RecordKind::Pixels | RecordKind::NonPixelShape) => {
                Some(decode_image_file(&root.join(rel))?)
            }
            (Some(rel), _) => {
                tracing::debug!(
                    name = %self.name,
                    image = %rel.display(),
                    "ignoring image on a group record"
                );
                None
            }
            (None, _) => None,
        };

        let bounds = match (explicit_bounds, &image) {
            (Some(b), _) => b,
            (None, Some(img)) => EdgeBounds::new(0, 0, img.height as i32, img.width as i32),
            (None, None) => EdgeBounds::default(),
        };

        Ok(LayerRecord {
            kind,
            name: self.name,
            bounds,
            opacity: self.opacity,
            flags: self.flags,
            image,
        })
    }
}

/// Load a document from a manifest file.
#[tracing::instrument(skip(progress))]
pub fn load_manifest(
    path: &Path,
    opts: LoadOptions,
    progress: &mut dyn FnMut(Progress),
) -> LayerstackResult<(Document, LoadReport)> {
    let manifest = LayerManifest::from_path(path)?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    let (info, records) = manifest.resolve(root)?;
    Document::load_with(info, records, opts, progress)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/manifest.rs"]
mod tests;
