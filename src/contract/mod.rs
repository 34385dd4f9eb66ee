pub mod document;
pub mod matcher;

pub use document::*;
pub use matcher::*;
