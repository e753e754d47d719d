//! CLI command implementations

pub mod install;
pub mod list;
pub mod pack;

pub use install::execute as install;
pub use list::execute as list;
pub use pack::execute as pack;
