//! Decoded layer records and the tree builder that consumes them.

pub(crate) mod builder;
pub(crate) mod record;
