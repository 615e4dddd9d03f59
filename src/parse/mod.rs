//! Readers for external mesh formats.

pub mod inp;
