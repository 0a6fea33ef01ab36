//! Source/destination rectangles for cutting one layer against the canvas.
//!
//! The low and high edges are clamped differently. A negative origin shifts the source
//! origin and pins the destination to 0 without shrinking the width. Reaching the far edge
//! sets the width to `canvas - origin - 1`, one pixel short of the remaining span. Both
//! behaviours are kept as they are because existing exports depend on them.

use std::fmt;

use crate::foundation::core::IRect;
use crate::tree::arena::Layer;

/// Region to copy: `src` in the layer raster, `dst` in the canvas-sized output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportRects {
    pub src: IRect,
    pub dst: IRect,
}

impl ExportRects {
    /// Nothing to copy: a non-positive dimension survived clamping.
    pub fn is_empty(&self) -> bool {
        self.dst.is_empty()
    }
}

/// Clamp `bounds` against a `canvas_width` x `canvas_height` canvas.
pub fn export_rects(bounds: IRect, canvas_width: u32, canvas_height: u32) -> ExportRects {
    let (src_x, dst_x, width) = clamp_axis(bounds.x, bounds.width, canvas_width);
    let (src_y, dst_y, height) = clamp_axis(bounds.y, bounds.height, canvas_height);
    ExportRects {
        src: IRect::new(src_x, src_y, width, height),
        dst: IRect::new(dst_x, dst_y, width, height),
    }
}

/// Returns `(src_origin, dst_origin, extent)` for one axis.
fn clamp_axis(origin: i32, extent: i32, canvas: u32) -> (i32, i32, i32) {
    let canvas = i64::from(canvas);
    let mut src = 0i64;
    let mut dst = i64::from(origin);
    let mut extent = i64::from(extent);

    if dst < 0 {
        src = -dst;
        dst = 0;
    }
    if dst + extent >= canvas {
        extent = canvas - dst - 1;
    }
    (saturate(src), saturate(dst), saturate(extent))
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Compute export rectangles for a layer and store the clamped extent back on the layer.
///
/// Only the width/height are written back, and only on the axis where the far edge was hit.
pub fn clamp_layer(layer: &mut Layer, canvas_width: u32, canvas_height: u32) -> ExportRects {
    let rects = export_rects(layer.bounds, canvas_width, canvas_height);
    if rects.dst.width != layer.bounds.width {
        layer.bounds.width = rects.dst.width;
    }
    if rects.dst.height != layer.bounds.height {
        layer.bounds.height = rects.dst.height;
    }
    rects
}

/// A leaf skipped at export because its clamped extent is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeometryIssue {
    /// Index in the flattened leaf order.
    pub index: usize,
    pub name: String,
    pub width: i32,
    pub height: i32,
}

impl fmt::Display for GeometryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "layer #{} '{}' has no exportable pixels (clamped to {}x{})",
            self.index, self.name, self.width, self.height
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/geometry.rs"]
mod tests;
