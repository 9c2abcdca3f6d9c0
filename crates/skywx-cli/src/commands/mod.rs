pub mod parse;
pub mod station;

use skywx_core::error::SkywxError;
use skywx_core::station::{builtin, load_registry, StationRegistry};
use std::path::Path;
use tracing::debug;

/// Load the dataset named by `--stations`, or the bundled one.
pub fn registry(path: Option<&Path>) -> Result<StationRegistry, SkywxError> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading station dataset");
            load_registry(path)
        }
        None => builtin::builtin(),
    }
}
