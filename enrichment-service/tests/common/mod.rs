//! Common test utilities for enrichment-service integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,enrichment_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Create a unit folder holding the given files.
pub fn write_unit(root: &Path, id: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(id);
    fs::create_dir_all(&dir).expect("Failed to create unit dir");
    for (name, content) in files {
        fs::write(dir.join(name), content).expect("Failed to write unit file");
    }
    dir
}

/// Parsed `output.json` of a unit folder.
pub fn read_output(dir: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(dir.join("output.json")).expect("Failed to read output.json");
    serde_json::from_str(&raw).expect("output.json is not valid JSON")
}
