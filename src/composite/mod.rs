//! CPU compositing passes over a [`LayerTree`](crate::LayerTree).

pub(crate) mod blend;
pub(crate) mod merge;
pub(crate) mod visibility;
