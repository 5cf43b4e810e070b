#![no_main]
use libfuzzer_sys::fuzz_target;
use mtt_hardware::protocol1::{decode_status, read_status};

fuzz_target!(|data: &[u8]| {
    let _ = decode_status(data);
    // header resync over arbitrary line noise
    let _ = read_status(&mut std::io::Cursor::new(data));
});
