//! Arena-backed group/layer tree.

pub(crate) mod arena;
