#![no_main]

use std::io::Write;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut decoder = streamflate::DeflateDecoder::new(&compressed);
    let decoded = decoder.decode_zlib().unwrap();

    assert_eq!(&decoded, data);
});
