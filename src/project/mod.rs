//! Project inputs: paths and the declared dependency manifest

pub mod layout;
pub mod manifest;

pub use layout::ProjectLayout;
pub use manifest::Manifest;
