//! Per-layer export: clamping geometry, pixel cutting, naming and encoding.

pub(crate) mod encoder;
pub(crate) mod geometry;
pub(crate) mod naming;
pub(crate) mod pipeline;
