use crate::foundation::core::{EdgeBounds, Raster};

/// Reserved layer name the decoder emits for the end of a group.
pub const GROUP_CLOSE_SENTINEL: &str = "</Layer group>";

/// What a decoded record stands for in the layer stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A raster layer.
    Pixels,
    /// Start of a group (a non-pixel record with empty bounds).
    GroupOpen,
    /// End of a group (the sentinel name).
    GroupClose,
    /// A non-pixel record with real bounds, e.g. a vector shape.
    NonPixelShape,
}

/// Per-record flags carried over from the decoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RecordFlags {
    pub transparency_protected: bool,
    pub pixel_data_irrelevant: bool,
}

/// One decoded layer or group descriptor.
#[derive(Clone, Debug)]
pub struct LayerRecord {
    pub kind: RecordKind,
    pub name: String,
    pub bounds: EdgeBounds,
    /// Opacity as stored by the decoder (0-255).
    pub opacity: u8,
    pub flags: RecordFlags,
    /// Pixel content for `Pixels` records. `None` yields a transparent raster of the bounds.
    pub image: Option<Raster>,
}

impl LayerRecord {
    /// Build a record whose kind is derived from its name, flags and bounds.
    pub fn classified(
        name: impl Into<String>,
        bounds: EdgeBounds,
        opacity: u8,
        flags: RecordFlags,
        image: Option<Raster>,
    ) -> Self {
        let name = name.into();
        let kind = classify(&name, bounds, flags);
        Self {
            kind,
            name,
            bounds,
            opacity,
            flags,
            image,
        }
    }

    pub fn pixels(name: impl Into<String>, bounds: EdgeBounds, image: Option<Raster>) -> Self {
        Self {
            kind: RecordKind::Pixels,
            name: name.into(),
            bounds,
            opacity: 255,
            flags: RecordFlags::default(),
            image,
        }
    }

    pub fn group_open(name: impl Into<String>) -> Self {
        Self {
            kind: RecordKind::GroupOpen,
            name: name.into(),
            bounds: EdgeBounds::default(),
            opacity: 255,
            flags: RecordFlags {
                pixel_data_irrelevant: true,
                ..RecordFlags::default()
            },
            image: None,
        }
    }

    pub fn group_close() -> Self {
        Self {
            kind: RecordKind::GroupClose,
            name: GROUP_CLOSE_SENTINEL.to_string(),
            bounds: EdgeBounds::default(),
            opacity: 255,
            flags: RecordFlags {
                pixel_data_irrelevant: true,
                ..RecordFlags::default()
            },
            image: None,
        }
    }

    pub fn shape(name: impl Into<String>, bounds: EdgeBounds) -> Self {
        Self {
            kind: RecordKind::NonPixelShape,
            name: name.into(),
            bounds,
            opacity: 255,
            flags: RecordFlags {
                pixel_data_irrelevant: true,
                ..RecordFlags::default()
            },
            image: None,
        }
    }

    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_flags(mut self, flags: RecordFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Opacity as a fraction in `[0, 1]`.
    pub fn opacity_fraction(&self) -> f32 {
        f32::from(self.opacity) / 255.0
    }
}

/// Derive a record kind the way the decoder marks groups: the sentinel name closes a group,
/// non-pixel records with empty bounds open one, other non-pixel records are shapes.
pub fn classify(name: &str, bounds: EdgeBounds, flags: RecordFlags) -> RecordKind {
    if name == GROUP_CLOSE_SENTINEL {
        RecordKind::GroupClose
    } else if flags.pixel_data_irrelevant {
        if bounds.is_empty() {
            RecordKind::GroupOpen
        } else {
            RecordKind::NonPixelShape
        }
    } else {
        RecordKind::Pixels
    }
}

#[cfg(test)]
#[path = "../../tests/unit/records/record.rs"]
mod tests;
