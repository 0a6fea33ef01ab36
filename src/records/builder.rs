//! Stack-based reconstruction of the group tree from a flat record stream.
//!
//! Every record is appended as the last child of the current group, never prepended. The
//! decoder's reversed enumeration and the group brackets it emits cancel out under append,
//! so the flattened leaf order equals the order leaf records arrive in and reads
//! bottom-to-top.

use crate::foundation::core::{IRect, Progress, Raster};
use crate::foundation::error::{LayerstackError, LayerstackResult};
use crate::records::record::{LayerRecord, RecordKind};
use crate::tree::arena::{Layer, LayerTree, NodeId};

/// How records are turned into a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Rebuild the group hierarchy. When off, group brackets are ignored and every leaf is
    /// attached directly to the root.
    pub load_groups: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { load_groups: true }
    }
}

/// Incremental tree builder. Feed records with [`TreeBuilder::push`], then call
/// [`TreeBuilder::finish`].
#[derive(Debug)]
pub struct TreeBuilder {
    tree: LayerTree,
    cursor: NodeId,
    opts: LoadOptions,
    discarded: Vec<String>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::with_options(LoadOptions::default())
    }

    pub fn with_options(opts: LoadOptions) -> Self {
        let tree = LayerTree::new();
        let cursor = tree.root();
        Self {
            tree,
            cursor,
            opts,
            discarded: Vec::new(),
        }
    }

    /// The group new records are currently appended to.
    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    /// Consume one record. Returns the id of the leaf it produced, if any.
    pub fn push(&mut self, record: LayerRecord) -> LayerstackResult<Option<NodeId>> {
        match record.kind {
            RecordKind::Pixels if record.flags.transparency_protected => {
                tracing::debug!(name = %record.name, "discarding transparency-protected layer");
                self.discarded.push(record.name);
                Ok(None)
            }
            RecordKind::Pixels | RecordKind::NonPixelShape => {
                let (name, layer) = leaf_layer(record);
                let id = self.tree.add_layer(self.cursor, name, layer)?;
                Ok(Some(id))
            }
            RecordKind::GroupOpen | RecordKind::GroupClose if !self.opts.load_groups => {
                tracing::debug!(name = %record.name, "ignoring group record");
                Ok(None)
            }
            RecordKind::GroupOpen => {
                self.cursor = self.tree.add_group(self.cursor, record.name)?;
                Ok(None)
            }
            RecordKind::GroupClose => {
                let parent = self.tree.parent(self.cursor).ok_or_else(|| {
                    LayerstackError::structure("group close without a matching group open")
                })?;
                self.cursor = parent;
                Ok(None)
            }
        }
    }

    /// Names of pixel records dropped because their transparency was protected.
    pub fn discarded(&self) -> &[String] {
        &self.discarded
    }

    /// Finish the build, failing when groups are still open.
    pub fn finish(self) -> LayerstackResult<BuiltTree> {
        if self.cursor != self.tree.root() {
            return Err(LayerstackError::structure(format!(
                "record stream ended inside group '{}'",
                self.tree.path(self.cursor).join("/")
            )));
        }
        Ok(BuiltTree {
            tree: self.tree,
            discarded: self.discarded,
        })
    }
}

/// Result of a successful build.
#[derive(Clone, Debug)]
pub struct BuiltTree {
    pub tree: LayerTree,
    pub discarded: Vec<String>,
}

/// Build a tree from records in decoder order with default options.
pub fn build_tree(
    records: Vec<LayerRecord>,
    progress: &mut dyn FnMut(Progress),
) -> LayerstackResult<BuiltTree> {
    build_tree_with(records, LoadOptions::default(), progress)
}

/// Build a tree from records in decoder order, reporting one progress tick per leaf.
#[tracing::instrument(skip(records, progress), fields(records = records.len()))]
pub fn build_tree_with(
    records: Vec<LayerRecord>,
    opts: LoadOptions,
    progress: &mut dyn FnMut(Progress),
) -> LayerstackResult<BuiltTree> {
    let total = records.iter().filter(|r| is_leaf_record(r)).count();

    let mut builder = TreeBuilder::with_options(opts);
    let mut done = 0usize;
    for record in records {
        if builder.push(record)?.is_some() {
            done += 1;
            progress(Progress::new(done, total));
        }
    }
    builder.finish()
}

fn is_leaf_record(r: &LayerRecord) -> bool {
    match r.kind {
        RecordKind::Pixels => !r.flags.transparency_protected,
        RecordKind::NonPixelShape => true,
        RecordKind::GroupOpen | RecordKind::GroupClose => false,
    }
}

/// Leaf payload for a pixel or shape record. Records without pixels get a transparent raster
/// of their bounds.
fn leaf_layer(record: LayerRecord) -> (String, Layer) {
    let bounds = record.bounds.to_rect();
    let opacity = record.opacity_fraction();
    let image = match record.image {
        Some(img) => {
            check_raster_size(&record.name, bounds, &img);
            img
        }
        None => Raster::transparent(bounds.width.max(0) as u32, bounds.height.max(0) as u32),
    };
    let mut layer = Layer::new(image, bounds, opacity);
    layer.flags = record.flags;
    layer.shape = record.kind == RecordKind::NonPixelShape;
    (record.name, layer)
}

fn check_raster_size(name: &str, rect: IRect, img: &Raster) {
    if i64::from(img.width) != i64::from(rect.width)
        || i64::from(img.height) != i64::from(rect.height)
    {
        tracing::debug!(
            name,
            image_w = img.width,
            image_h = img.height,
            bounds_w = rect.width,
            bounds_h = rect.height,
            "layer raster size differs from its bounds"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/records/builder.rs"]
mod tests;
