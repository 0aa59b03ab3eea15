//! Fuzz target for `sanitize_entry_path` with arbitrary entry names.
//!
//! Run with: cargo +nightly fuzz run sanitize_entry_path

#![no_main]

use std::path::{Component, Path};

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let name = String::from_utf8_lossy(data);
    let root = Path::new("/fuzz/dest");

    if let Ok(sanitized) = xarc::safety::sanitize_entry_path(root, &name, 0) {
        assert!(
            sanitized.full().starts_with(root),
            "escaped root: {:?}",
            name
        );
        assert!(
            sanitized
                .relative()
                .components()
                .all(|c| matches!(c, Component::Normal(_))),
            "special component kept: {:?}",
            name
        );
        assert!(!name.contains('\0'), "NUL byte accepted: {:?}", name);
    }
});
