//! Z-buffer occlusion test.
//!
//! Each leaf's bounding rectangle is filled with an opaque color encoding its traversal index,
//! frontmost leaves winning overlaps. A leaf is visible when its own index survives anywhere
//! inside its rectangle. Pixel alpha and layer opacity are ignored: a translucent layer on top
//! still hides what lies below it.

use crate::composite::blend::dst_over;
use crate::foundation::core::{Canvas, IRect, Raster};
use crate::foundation::error::{LayerstackError, LayerstackResult};

/// Largest leaf count the 24-bit index encoding can address.
pub const MAX_LEAVES: usize = 1 << 24;

pub fn encode_index(index: usize) -> [u8; 4] {
    [
        ((index >> 16) & 0xff) as u8,
        ((index >> 8) & 0xff) as u8,
        (index & 0xff) as u8,
        255,
    ]
}

/// Decode a z-buffer pixel; transparent pixels carry no leaf.
pub fn decode_index(px: [u8; 4]) -> Option<usize> {
    if px[3] == 0 {
        return None;
    }
    Some((usize::from(px[0]) << 16) | (usize::from(px[1]) << 8) | usize::from(px[2]))
}

/// Paint the index z-buffer for `bounds` (traversal order) and test each leaf against it.
#[tracing::instrument(skip_all, fields(leaves = bounds.len()))]
pub fn visibility_pass(canvas: &Canvas, bounds: &[IRect]) -> LayerstackResult<(Raster, Vec<bool>)> {
    if bounds.len() > MAX_LEAVES {
        return Err(LayerstackError::validation(format!(
            "{} leaves exceed the {MAX_LEAVES} the visibility buffer can index",
            bounds.len()
        )));
    }

    let mut zbuf = Raster::transparent(canvas.width(), canvas.height());
    for (index, rect) in bounds.iter().enumerate().rev() {
        let Some(region) = rect.intersect(canvas.rect()) else {
            continue;
        };
        let color = encode_index(index);
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                let d = zbuf.pixel(x, y);
                zbuf.set_pixel(x, y, dst_over(d, color, 1.0));
            }
        }
    }

    let visible = bounds
        .iter()
        .enumerate()
        .map(|(index, rect)| shows_index(&zbuf, canvas, *rect, index))
        .collect();
    Ok((zbuf, visible))
}

fn shows_index(zbuf: &Raster, canvas: &Canvas, rect: IRect, index: usize) -> bool {
    let Some(region) = rect.intersect(canvas.rect()) else {
        return false;
    };
    (region.y..region.bottom()).any(|y| {
        (region.x..region.right()).any(|x| decode_index(zbuf.pixel(x, y)) == Some(index))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/composite/visibility.rs"]
mod tests;
