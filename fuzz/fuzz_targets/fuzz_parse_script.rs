#![no_main]

use libfuzzer_sys::fuzz_target;

/// Scripts are line-oriented text; cap the input so the lossy UTF-8
/// conversion stays cheap.
const MAX_INPUT_BYTES: usize = 64 * 1024;

fuzz_target!(|data: &[u8]| {
    let data = if data.len() > MAX_INPUT_BYTES {
        &data[..MAX_INPUT_BYTES]
    } else {
        data
    };

    // Accept arbitrary bytes as input; treat invalid UTF-8 lossy.
    let source = String::from_utf8_lossy(data);
    if let Ok(instructions) = tabula_script::parse_script(&source) {
        // An instruction listing is itself a script; exercise the re-parse.
        let listing = instructions
            .iter()
            .map(|instruction| instruction.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let _ = tabula_script::parse_script(&listing);
    }
});
