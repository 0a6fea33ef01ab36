use crate::color::space::ColorSpace;
use crate::foundation::error::{LayerstackError, LayerstackResult};

/// Document canvas. Created once per document and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    color_space: ColorSpace,
    bit_depth: u8,
}

impl Canvas {
    /// Create a canvas, rejecting zero dimensions and a zero bit depth.
    pub fn new(
        width: u32,
        height: u32,
        color_space: ColorSpace,
        bit_depth: u8,
    ) -> LayerstackResult<Self> {
        if width == 0 || height == 0 {
            return Err(LayerstackError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(LayerstackError::validation("canvas dimensions exceed i32 range"));
        }
        if bit_depth == 0 {
            return Err(LayerstackError::validation("canvas bit depth must be > 0"));
        }
        Ok(Self {
            width,
            height,
            color_space,
            bit_depth,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color_space(&self) -> &ColorSpace {
        &self.color_space
    }

    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    /// The full canvas as a rectangle at the origin.
    pub fn rect(&self) -> IRect {
        IRect::new(0, 0, self.width as i32, self.height as i32)
    }
}

/// Axis-aligned integer rectangle in canvas space. `width`/`height` may be negative
/// before clamping; see [`IRect::is_empty`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct IRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl IRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Overlap of two rectangles, or `None` when they do not intersect.
    pub fn intersect(self, other: IRect) -> Option<IRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(IRect::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// Bounds as the layer decoder reports them: edges rather than origin + size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EdgeBounds {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl EdgeBounds {
    pub const fn new(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// True when the record spans no area at all (the group-open marker shape).
    pub fn is_empty(self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn to_rect(self) -> IRect {
        IRect::new(
            self.left,
            self.top,
            self.right.saturating_sub(self.left),
            self.bottom.saturating_sub(self.top),
        )
    }
}

/// Owned raster of premultiplied RGBA8 pixels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Raster {
    /// A fully transparent raster.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wrap premultiplied pixel bytes, checking that the length matches the dimensions.
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> LayerstackResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(LayerstackError::validation(format!(
                "raster {width}x{height} expects {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Fill with a single premultiplied color.
    pub fn solid(width: u32, height: u32, px: [u8; 4]) -> Self {
        Self {
            width,
            height,
            data: px.repeat(width as usize * height as usize),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at `(x, y)`, or transparent when outside the raster.
    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        match self.offset(x, y) {
            Some(i) => [
                self.data[i],
                self.data[i + 1],
                self.data[i + 2],
                self.data[i + 3],
            ],
            None => [0; 4],
        }
    }

    /// Write a pixel; writes outside the raster are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, px: [u8; 4]) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 4].copy_from_slice(&px);
        }
    }

    pub(crate) fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }
}

/// One progress tick: `current` leaves out of `total` are done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percent: u8,
}

impl Progress {
    pub fn new(current: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((current.min(total) * 100) / total) as u8
        };
        Self {
            current,
            total,
            percent,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
