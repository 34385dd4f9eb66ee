pub mod graph;
pub mod parser;
pub mod xml;

pub use graph::*;
pub use parser::ProcessParser;
