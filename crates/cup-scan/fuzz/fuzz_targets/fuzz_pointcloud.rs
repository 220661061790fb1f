#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Write;
use tempfile::NamedTempFile;

fuzz_target!(|data: &[u8]| {
    // The first byte picks the loader, the rest is file content
    let Some((&selector, body)) = data.split_first() else {
        return;
    };
    let suffix = if selector % 2 == 0 { ".ply" } else { ".xyz" };

    let mut file = match NamedTempFile::with_suffix(suffix) {
        Ok(f) => f,
        Err(_) => return,
    };

    if file.write_all(body).is_err() {
        return;
    }

    // Loading must never panic, and a loaded cloud holds only finite points
    if let Ok(loaded) = cup_scan::PointCloud::load(file.path()) {
        assert!(loaded.cloud.points.iter().all(|p| p.is_finite()));
        assert!(!loaded.cloud.is_empty());
    }
});
