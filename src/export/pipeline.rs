use crate::document::model::Document;
use crate::export::encoder::LayerEncoder;
use crate::export::geometry::{ExportRects, GeometryIssue, clamp_layer};
use crate::export::naming::FileNamer;
use crate::foundation::core::{Progress, Raster};
use crate::foundation::error::LayerstackResult;
use crate::tree::arena::Layer;

/// Export configuration.
#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    /// Skip leaves the visibility pass found fully occluded.
    pub only_visible: bool,
}

/// One file handed to the encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedLayer {
    pub index: usize,
    pub name: String,
    pub file_name: String,
}

/// Outcome of an export run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: Vec<ExportedLayer>,
    /// Leaves with an empty clamped extent.
    pub skipped: Vec<GeometryIssue>,
    /// Leaves left out by [`ExportOptions::only_visible`].
    pub occluded: Vec<usize>,
}

/// Cut every leaf into its own canvas-sized raster and hand it to `encoder`.
///
/// Leaves are visited in flattened order and `progress` ticks once per leaf whatever its
/// outcome. Leaves whose clamped extent is empty are recorded in
/// [`ExportSummary::skipped`]; encoder errors abort the run. Clamping writes the clamped
/// width/height back to the layer, which leaves the document stale when that happens.
#[tracing::instrument(skip_all, fields(leaves = doc.num_layers(), ext = encoder.extension()))]
pub fn export_layers(
    doc: &mut Document,
    encoder: &mut dyn LayerEncoder,
    opts: &ExportOptions,
    progress: &mut dyn FnMut(Progress),
) -> LayerstackResult<ExportSummary> {
    if doc.is_stale() {
        doc.revalidate()?;
    }

    let (canvas_w, canvas_h) = (doc.canvas.width(), doc.canvas.height());
    let leaves = doc.flat.leaves.clone();
    let total = leaves.len();
    let mut namer = FileNamer::new();
    let mut summary = ExportSummary::default();
    let mut bounds_changed = false;

    for (index, id) in leaves.into_iter().enumerate() {
        let tick = Progress::new(index + 1, total);
        if opts.only_visible && !doc.is_visible(index) {
            tracing::debug!(index, "skipping occluded layer");
            summary.occluded.push(index);
            progress(tick);
            continue;
        }

        let name = doc.tree.name(id).to_string();
        let Some(layer) = doc.tree.layer_mut(id) else {
            progress(tick);
            continue;
        };
        let before = layer.bounds;
        let rects = clamp_layer(layer, canvas_w, canvas_h);
        bounds_changed |= layer.bounds != before;

        if rects.is_empty() {
            let issue = GeometryIssue {
                index,
                name,
                width: rects.dst.width,
                height: rects.dst.height,
            };
            tracing::warn!("{issue}");
            summary.skipped.push(issue);
            progress(tick);
            continue;
        }

        let raster = cut_layer(layer, rects, canvas_w, canvas_h);
        let file_name = namer.file_name(&name, index, encoder.extension());
        encoder.encode(&file_name, &raster)?;
        tracing::debug!(index, file = %file_name, "exported layer");
        summary.exported.push(ExportedLayer {
            index,
            name,
            file_name,
        });
        progress(tick);
    }

    if bounds_changed {
        doc.stale = true;
    }
    Ok(summary)
}

/// Copy the `rects.src` region of the layer raster to `rects.dst` in a transparent
/// canvas-sized raster. Source pixels outside the layer raster read as transparent.
pub fn cut_layer(layer: &Layer, rects: ExportRects, canvas_w: u32, canvas_h: u32) -> Raster {
    let mut out = Raster::transparent(canvas_w, canvas_h);
    if rects.is_empty() {
        return out;
    }
    for dy in 0..rects.dst.height {
        for dx in 0..rects.dst.width {
            let px = layer.image.pixel(rects.src.x + dx, rects.src.y + dy);
            out.set_pixel(rects.dst.x + dx, rects.dst.y + dy, px);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
