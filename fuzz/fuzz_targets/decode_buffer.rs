#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let options = streamflate::DeflateOptions::default().set_limit(1 << 24);
    let mut decoder = streamflate::DeflateDecoder::new_with_options(data, options);
    let _ = decoder.decode_deflate();
});
