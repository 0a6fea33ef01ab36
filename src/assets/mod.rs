//! File-backed stand-in for the layer decoder: a JSON manifest plus encoded images.

pub(crate) mod decode;
pub(crate) mod manifest;
