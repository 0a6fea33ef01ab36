//! layerstack rebuilds layered image documents (Photoshop-style layer stacks) from a flat
//! record stream, composites them on the CPU and exports every layer on its own.
//!
//! # Pipeline overview
//!
//! 1. **Build**: `Vec<LayerRecord> -> LayerTree` with a bracket-matching stack ([`build_tree`])
//! 2. **Revalidate**: `LayerTree -> merged raster + visibility` ([`Document::revalidate`])
//! 3. **Export**: one canvas-sized raster per leaf, handed to a [`LayerEncoder`]
//!    ([`export_layers`])
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded**: every pass runs synchronously on the caller's thread. Progress
//!   callbacks return nothing and there is no cancellation.
//! - **Premultiplied RGBA8** internally; file encoders convert to straight alpha.
//! - **Derived state is explicit**: merged/visibility rasters and the flat leaf list only
//!   change on revalidation.
#![forbid(unsafe_code)]

mod assets;
mod color;
mod composite;
mod document;
mod export;
mod foundation;
mod records;
mod tree;

pub use assets::decode::{decode_image, decode_image_file};
pub use assets::manifest::{LayerManifest, ManifestRecord, load_manifest};
pub use color::space::{ColorMode, ColorSpace, IccProfile, select_color_space};
pub use composite::blend::{PremulRgba8, dst_over};
pub use composite::merge::{Flattened, flatten, merge_pass};
pub use composite::visibility::{MAX_LEAVES, decode_index, encode_index, visibility_pass};
pub use document::model::{Document, DocumentInfo, LoadReport};
pub use export::encoder::{ImageFileEncoder, InMemoryEncoder, LayerEncoder, write_raster};
pub use export::geometry::{ExportRects, GeometryIssue, clamp_layer, export_rects};
pub use export::naming::{FileNamer, layer_basename};
pub use export::pipeline::{ExportOptions, ExportSummary, ExportedLayer, cut_layer, export_layers};
pub use foundation::core::{Canvas, EdgeBounds, IRect, Progress, Raster};
pub use foundation::error::{LayerstackError, LayerstackResult};
pub use records::builder::{BuiltTree, LoadOptions, TreeBuilder, build_tree, build_tree_with};
pub use records::record::{GROUP_CLOSE_SENTINEL, LayerRecord, RecordFlags, RecordKind, classify};
pub use tree::arena::{DepthFirst, Layer, LayerTree, Node, NodeId, NodeKind};
