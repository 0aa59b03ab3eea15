//! Fuzz target for format identification on arbitrary leading bytes.
//!
//! The first byte picks a file name so that both the extension table and the
//! signature checks are exercised.
//!
//! Run with: cargo +nightly fuzz run identify

#![no_main]

use std::io::{Cursor, Read};

use libfuzzer_sys::fuzz_target;

const NAMES: &[&str] = &[
    "input.tar", "input.zip", "input.tar.gz", "input.tar.zst", "input.gz", "input.xz",
    "input.7z", "input.bin",
];

fuzz_target!(|data: &[u8]| {
    let Some((&pick, rest)) = data.split_first() else {
        return;
    };
    let name = NAMES[pick as usize % NAMES.len()];

    if let Ok((_, mut reader)) = xarc::format::identify(name, Cursor::new(rest.to_vec())) {
        let mut replayed = Vec::new();
        reader.read_to_end(&mut replayed).expect("replay from memory");
        assert_eq!(replayed, rest, "sniffed bytes were not replayed");
    }
});
