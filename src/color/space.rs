//! Canvas color space selection from decoder metadata.
//!
//! No color transforms happen here: the chosen [`ColorSpace`] is attached to the
//! [`Canvas`](crate::Canvas) and left for encoders to interpret.

/// Color mode string reported by the layer decoder.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Grayscale,
    Rgb,
    Cmyk,
    #[serde(untagged)]
    Other(String),
}

impl ColorMode {
    /// Parse a mode string case-insensitively; unknown strings are kept verbatim.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "grayscale" | "gray" | "greyscale" => Self::Grayscale,
            "rgb" => Self::Rgb,
            "cmyk" => Self::Cmyk,
            _ => Self::Other(s.to_string()),
        }
    }
}

/// Embedded ICC profile bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IccProfile(pub Vec<u8>);

/// Color space attached to a canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    /// Gray with a fixed 2.2 gamma curve, substituted for untagged grayscale documents.
    GrayGamma22,
    /// Linear-light RGB, used for color modes the decoder does not name.
    LinearRgb,
    Embedded(IccProfile),
}

impl ColorSpace {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Srgb => "sRGB",
            Self::GrayGamma22 => "Gray Gamma 2.2",
            Self::LinearRgb => "Linear RGB",
            Self::Embedded(_) => "embedded ICC profile",
        }
    }
}

/// Pick the canvas color space.
///
/// An embedded profile always wins. A grayscale document without one gets
/// [`ColorSpace::GrayGamma22`] and a warning the caller must surface to the user. CMYK
/// documents are tagged sRGB since the decoder hands out their layers already converted to RGB.
pub fn select_color_space(
    mode: &ColorMode,
    profile: Option<IccProfile>,
) -> (ColorSpace, Option<String>) {
    if let Some(p) = profile {
        return (ColorSpace::Embedded(p), None);
    }
    match mode {
        ColorMode::Grayscale => {
            let warning = "grayscale document has no embedded color profile; \
                           substituting Gray Gamma 2.2"
                .to_string();
            tracing::warn!("{warning}");
            (ColorSpace::GrayGamma22, Some(warning))
        }
        ColorMode::Rgb | ColorMode::Cmyk => (ColorSpace::Srgb, None),
        ColorMode::Other(_) => (ColorSpace::LinearRgb, None),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/space.rs"]
mod tests;
