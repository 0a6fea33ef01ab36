use crate::color::space::{ColorMode, IccProfile, select_color_space};
use crate::composite::merge::{Flattened, merge_pass};
use crate::composite::visibility::visibility_pass;
use crate::foundation::core::{Canvas, IRect, Progress, Raster};
use crate::foundation::error::LayerstackResult;
use crate::records::builder::{LoadOptions, build_tree_with};
use crate::records::record::LayerRecord;
use crate::tree::arena::{LayerTree, NodeId};

/// Document-level metadata reported by the layer decoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentInfo {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_mode: ColorMode,
    pub icc_profile: Option<IccProfile>,
}

impl DocumentInfo {
    /// 8-bit RGB without an embedded profile.
    pub fn rgb8(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bit_depth: 8,
            color_mode: ColorMode::Rgb,
            icc_profile: None,
        }
    }
}

/// Things the caller should surface after a load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// User-facing warnings, e.g. a substituted color profile.
    pub warnings: Vec<String>,
    /// Names of pixel records excluded from the tree.
    pub discarded: Vec<String>,
}

/// A layered document: canvas, group tree and the state derived from it.
///
/// The merged raster, the visibility raster and the flat leaf list are only recomputed by
/// [`Document::revalidate`]. Mutating the tree through [`Document::tree_mut`] marks them
/// stale until then.
#[derive(Clone, Debug)]
pub struct Document {
    pub(crate) canvas: Canvas,
    pub(crate) tree: LayerTree,
    pub(crate) merged: Raster,
    pub(crate) zbuffer: Raster,
    pub(crate) flat: Flattened,
    pub(crate) visible: Vec<bool>,
    pub(crate) stale: bool,
}

impl Document {
    /// An empty document; its derived state is trivially current.
    pub fn new(canvas: Canvas) -> Self {
        let merged = Raster::transparent(canvas.width(), canvas.height());
        let zbuffer = merged.clone();
        Self {
            canvas,
            tree: LayerTree::new(),
            merged,
            zbuffer,
            flat: Flattened::default(),
            visible: Vec::new(),
            stale: false,
        }
    }

    /// Wrap an existing tree and compute the derived state.
    pub fn with_tree(canvas: Canvas, tree: LayerTree) -> LayerstackResult<Self> {
        let mut doc = Self::new(canvas);
        doc.tree = tree;
        doc.revalidate()?;
        Ok(doc)
    }

    /// Build a document from decoder metadata and records in decoder order.
    ///
    /// `progress` is called once per leaf added to the tree. A structural error aborts the
    /// load and no document is returned.
    pub fn load(
        info: DocumentInfo,
        records: Vec<LayerRecord>,
        progress: &mut dyn FnMut(Progress),
    ) -> LayerstackResult<(Self, LoadReport)> {
        Self::load_with(info, records, LoadOptions::default(), progress)
    }

    /// [`Document::load`] with explicit [`LoadOptions`].
    #[tracing::instrument(
        skip_all,
        fields(
            width = info.width,
            height = info.height,
            records = records.len(),
            load_groups = opts.load_groups
        )
    )]
    pub fn load_with(
        info: DocumentInfo,
        records: Vec<LayerRecord>,
        opts: LoadOptions,
        progress: &mut dyn FnMut(Progress),
    ) -> LayerstackResult<(Self, LoadReport)> {
        let (color_space, warning) = select_color_space(&info.color_mode, info.icc_profile);
        let canvas = Canvas::new(info.width, info.height, color_space, info.bit_depth)?;
        let built = build_tree_with(records, opts, progress)?;
        let doc = Self::with_tree(canvas, built.tree)?;

        let report = LoadReport {
            warnings: warning.into_iter().collect(),
            discarded: built.discarded,
        };
        tracing::info!(
            layers = doc.num_layers(),
            discarded = report.discarded.len(),
            "document loaded"
        );
        Ok((doc, report))
    }

    /// Recompute the flat leaf list, merged raster and visibility from scratch.
    #[tracing::instrument(skip(self))]
    pub fn revalidate(&mut self) -> LayerstackResult<()> {
        let (merged, flat) = merge_pass(&self.tree, &self.canvas);
        let (zbuffer, visible) = visibility_pass(&self.canvas, &flat.bounds)?;
        self.merged = merged;
        self.zbuffer = zbuffer;
        self.flat = flat;
        self.visible = visible;
        self.stale = false;
        Ok(())
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn tree(&self) -> &LayerTree {
        &self.tree
    }

    /// Mutable tree access. Derived state is stale until the next [`Document::revalidate`].
    pub fn tree_mut(&mut self) -> &mut LayerTree {
        self.stale = true;
        &mut self.tree
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Leaf count of the live tree.
    pub fn num_layers(&self) -> usize {
        self.tree.num_layers()
    }

    /// Composite of all leaves as of the last revalidation.
    pub fn merged(&self) -> &Raster {
        &self.merged
    }

    /// Index z-buffer as of the last revalidation.
    pub fn visibility_raster(&self) -> &Raster {
        &self.zbuffer
    }

    /// Leaves in flattened (bottom-to-top) order as of the last revalidation.
    pub fn leaves(&self) -> &[NodeId] {
        &self.flat.leaves
    }

    /// Bounds parallel to [`Document::leaves`].
    pub fn leaf_bounds(&self) -> &[IRect] {
        &self.flat.bounds
    }

    /// Whether flattened leaf `index` is at least partly unoccluded.
    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    pub fn visibility(&self) -> &[bool] {
        &self.visible
    }

    pub fn leaf_name(&self, index: usize) -> Option<&str> {
        self.flat.leaves.get(index).map(|&id| self.tree.name(id))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
