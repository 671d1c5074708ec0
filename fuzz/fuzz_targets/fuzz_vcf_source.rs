#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use vcfconv::{input::VcfSource, transcode::write_rows};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must produce rows or an error, never a panic
    let Ok(mut source) = VcfSource::new(Cursor::new(data)) else {
        return;
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    if let Ok(summary) = write_rows(&mut source, &mut writer) {
        assert!(summary.emitted_rows <= summary.total_records);
    }
});
