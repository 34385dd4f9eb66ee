pub mod json;
pub mod markdown;
pub mod summary;

pub use json::{from_json, read_json, to_json, write_json};
pub use markdown::{render_markdown, write_markdown};
pub use summary::*;

use crate::error::ReportError;
use std::path::Path;
use tracing::info;

fn write_output(path: &Path, content: &str) -> Result<(), ReportError> {
    std::fs::write(path, content).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = content.len(), "Wrote report");
    Ok(())
}
