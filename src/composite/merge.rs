use crate::composite::blend::dst_over;
use crate::foundation::core::{Canvas, IRect, Raster};
use crate::tree::arena::{Layer, LayerTree, NodeId};

/// Leaf order produced by one flattening pass, with a parallel bounds array.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Flattened {
    /// Leaves in traversal order; index 0 is the backmost layer.
    pub leaves: Vec<NodeId>,
    pub bounds: Vec<IRect>,
}

impl Flattened {
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

/// Flatten the tree into leaf order. Both arrays are sized to the live leaf count.
pub fn flatten(tree: &LayerTree) -> Flattened {
    let n = tree.num_layers();
    let mut leaves = Vec::with_capacity(n);
    let mut bounds = Vec::with_capacity(n);
    for (id, _) in tree.depth_first() {
        if let Some(layer) = tree.layer(id) {
            leaves.push(id);
            bounds.push(layer.bounds);
        }
    }
    debug_assert_eq!(leaves.len(), n);
    Flattened { leaves, bounds }
}

/// Flatten the tree and composite every leaf into a canvas-sized raster.
///
/// Leaves are fed front-to-back with destination-over, so the first leaf in traversal order
/// ends up at the back of the stack.
#[tracing::instrument(skip_all, fields(width = canvas.width(), height = canvas.height()))]
pub fn merge_pass(tree: &LayerTree, canvas: &Canvas) -> (Raster, Flattened) {
    let flat = flatten(tree);
    let mut merged = Raster::transparent(canvas.width(), canvas.height());
    for &id in flat.leaves.iter().rev() {
        if let Some(layer) = tree.layer(id) {
            paint_layer_under(&mut merged, canvas, layer);
        }
    }
    tracing::debug!(leaves = flat.len(), "merge pass done");
    (merged, flat)
}

fn paint_layer_under(dst: &mut Raster, canvas: &Canvas, layer: &Layer) {
    if layer.opacity <= 0.0 {
        return;
    }
    let Some(region) = layer.bounds.intersect(canvas.rect()) else {
        return;
    };
    for y in region.y..region.bottom() {
        for x in region.x..region.right() {
            let src = layer
                .image
                .pixel(x - layer.bounds.x, y - layer.bounds.y);
            if src[3] == 0 {
                continue;
            }
            let d = dst.pixel(x, y);
            dst.set_pixel(x, y, dst_over(d, src, layer.opacity));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/merge.rs"]
mod tests;
