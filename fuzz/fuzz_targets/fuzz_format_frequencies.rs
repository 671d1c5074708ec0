#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    // Must never panic; success keeps every entry
    if let Ok(formatted) = vcfconv::transcode::format_frequencies(&input, "fuzz_0") {
        if input.is_empty() {
            assert!(formatted.is_empty());
        } else {
            assert!(formatted.starts_with('{') && formatted.ends_with(",}"));
            assert!(formatted.matches(": ").count() >= input.split('|').count());
        }
    }
});
