#![no_main]

use libfuzzer_sys::fuzz_target;

/// Keep the harness itself bounded. The reader is total over arbitrary bytes
/// and sizes its allocations from what actually remains in the input, so
/// oversized corpora only slow exploration down.
const MAX_INPUT_BYTES: usize = 1 << 20;

fuzz_target!(|data: &[u8]| {
    let data = if data.len() > MAX_INPUT_BYTES {
        &data[..MAX_INPUT_BYTES]
    } else {
        data
    };

    // Must return a structured error, never panic or overallocate.
    let _ = tabula_payload::parse_stream(data);
});
