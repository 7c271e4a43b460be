use std::io::prelude::*;

use streamflate::{
    InflateDecompressor, InflateStatus, HAS_MORE_INPUT, PARSE_GZIP_HEADER, PARSE_ZLIB_HEADER,
    USING_NON_WRAPPING_OUTPUT_BUF
};

fn encode_zlib(data: &[u8]) -> Vec<u8>
{
    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());

    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn encode_gzip(data: &[u8]) -> Vec<u8>
{
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());

    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A payload big enough to wrap a 32 KiB ring several times, mixing
/// long matches with incompressible noise.
fn large_payload() -> Vec<u8>
{
    let mut payload = Vec::with_capacity(128 * 1024);
    let mut state = 0x1234_5678_9ABC_DEF0_u64;

    while payload.len() < 128 * 1024
    {
        payload.extend_from_slice(b"round and round the ring buffer goes ");

        for _ in 0..32
        {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            payload.push((state >> 56) as u8);
        }
    }
    payload
}

/// Decode a whole stream in one call into a flat buffer.
fn decode_flat(stream: &[u8], framing: u32, capacity: usize) -> (InflateStatus, usize, Vec<u8>)
{
    let mut decompressor = InflateDecompressor::new();
    let mut out = vec![0_u8; capacity];

    let (status, consumed, written) =
        decompressor.decompress(stream, &mut out, 0, framing | USING_NON_WRAPPING_OUTPUT_BUF);

    out.truncate(written);
    (status, consumed, out)
}

#[test]
fn single_call_matches_reference()
{
    let payload = large_payload();
    let stream = encode_zlib(&payload);

    let (status, consumed, out) = decode_flat(&stream, PARSE_ZLIB_HEADER, payload.len() + 1);

    assert_eq!(status, InflateStatus::Done);
    assert_eq!(consumed, stream.len());
    assert_eq!(out, payload);
}

#[test]
fn chunked_input_is_equivalent()
{
    let payload = large_payload();
    let stream = encode_zlib(&payload);

    let (_, _, reference) = decode_flat(&stream, PARSE_ZLIB_HEADER, payload.len() + 1);

    for chunk_size in [1, 2, 3, 7, 13, 64, 997, 8192]
    {
        let mut decompressor = InflateDecompressor::new();
        let mut out = vec![0_u8; payload.len() + 1];
        let mut out_pos = 0;
        let mut offset = 0;

        let status = loop
        {
            let available = chunk_size.min(stream.len() - offset);
            let last = offset + available == stream.len();

            let mut flags = PARSE_ZLIB_HEADER | USING_NON_WRAPPING_OUTPUT_BUF;

            if !last
            {
                flags |= HAS_MORE_INPUT;
            }

            let (status, consumed, written) = decompressor.decompress(
                &stream[offset..offset + available],
                &mut out,
                out_pos,
                flags
            );

            offset += consumed;
            out_pos += written;

            match status
            {
                InflateStatus::NeedsMoreInput => continue,
                other => break other
            }
        };

        assert_eq!(status, InflateStatus::Done, "chunk size {chunk_size}");
        assert_eq!(offset, stream.len(), "chunk size {chunk_size}");
        assert_eq!(&out[..out_pos], &reference[..], "chunk size {chunk_size}");
    }
}

#[test]
fn ring_buffer_output_matches_flat()
{
    let payload = large_payload();
    let stream = encode_zlib(&payload);

    let (_, _, reference) = decode_flat(&stream, PARSE_ZLIB_HEADER, payload.len() + 1);

    for ring_size in [32 * 1024, 64 * 1024]
    {
        let mut decompressor = InflateDecompressor::new();
        let mut ring = vec![0_u8; ring_size];
        let mut collected = Vec::new();
        let mut out_pos = 0;
        let mut offset = 0;

        loop
        {
            let (status, consumed, written) = decompressor.decompress(
                &stream[offset..],
                &mut ring,
                out_pos,
                PARSE_ZLIB_HEADER
            );

            offset += consumed;
            collected.extend_from_slice(&ring[out_pos..out_pos + written]);
            out_pos += written;

            if out_pos == ring.len()
            {
                out_pos = 0;
            }

            match status
            {
                InflateStatus::Done => break,
                InflateStatus::HasMoreOutput => continue,
                other => panic!("ring size {ring_size}: unexpected status {other:?}")
            }
        }

        assert_eq!(collected, reference, "ring size {ring_size}");
    }
}

#[test]
fn ring_and_chunked_input_together()
{
    let payload = large_payload();
    let stream = encode_gzip(&payload);

    let mut decompressor = InflateDecompressor::new();
    let mut ring = vec![0_u8; 32 * 1024];
    let mut collected = Vec::new();
    let mut out_pos = 0;
    let mut offset = 0;

    loop
    {
        let available = 997.min(stream.len() - offset);
        let last = offset + available == stream.len();

        let mut flags = PARSE_GZIP_HEADER;

        if !last
        {
            flags |= HAS_MORE_INPUT;
        }

        let (status, consumed, written) =
            decompressor.decompress(&stream[offset..offset + available], &mut ring, out_pos, flags);

        offset += consumed;
        collected.extend_from_slice(&ring[out_pos..out_pos + written]);
        out_pos += written;

        if out_pos == ring.len()
        {
            out_pos = 0;
        }

        match status
        {
            InflateStatus::Done => break,
            InflateStatus::HasMoreOutput | InflateStatus::NeedsMoreInput => continue,
            other => panic!("unexpected status {other:?}")
        }
    }

    assert_eq!(collected, payload);
    assert_eq!(offset, stream.len());
}

#[test]
fn trailing_bytes_are_pushed_back()
{
    let payload = b"tail data must survive";
    let stream = encode_zlib(payload);

    let mut with_tail = stream.clone();

    with_tail.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

    let (status, consumed, out) = decode_flat(&with_tail, PARSE_ZLIB_HEADER, 1024);

    assert_eq!(status, InflateStatus::Done);
    assert_eq!(consumed, stream.len());
    assert_eq!(out, payload);
    assert_eq!(&with_tail[consumed..], &[0xDE, 0xAD, 0xBE, 0xEF]);
}

#[test]
fn structural_failure_is_sticky()
{
    // BFINAL=1, BTYPE=3 is always invalid
    let stream = [0b0000_0111, 0x00, 0x00, 0x00];
    let mut decompressor = InflateDecompressor::new();
    let mut out = vec![0_u8; 64];

    for _ in 0..3
    {
        let (status, _, _) =
            decompressor.decompress(&stream, &mut out, 0, USING_NON_WRAPPING_OUTPUT_BUF);

        assert_eq!(status, InflateStatus::Failed);
    }
}

#[test]
fn checksum_mismatch_reports_once_then_done()
{
    let payload = b"attested, not retried";
    let mut stream = encode_zlib(payload);

    let len = stream.len();
    stream[len - 1] ^= 0xFF;

    let mut decompressor = InflateDecompressor::new();
    let mut out = vec![0_u8; 256];

    let flags = PARSE_ZLIB_HEADER | USING_NON_WRAPPING_OUTPUT_BUF;
    let (status, consumed, written) = decompressor.decompress(&stream, &mut out, 0, flags);

    assert_eq!(status, InflateStatus::Adler32Mismatch);
    assert_eq!(consumed, stream.len());
    assert_eq!(&out[..written], payload);

    for _ in 0..3
    {
        let (status, _, _) = decompressor.decompress(&[], &mut out, written, flags);

        assert_eq!(status, InflateStatus::Done);
    }
}

#[test]
fn bad_parameters_are_rejected()
{
    let mut decompressor = InflateDecompressor::new();
    let stream = encode_zlib(b"x");

    // ring capacity must be a power of two
    let mut odd = vec![0_u8; 1000];
    let (status, _, _) = decompressor.decompress(&stream, &mut odd, 0, PARSE_ZLIB_HEADER);
    assert_eq!(status, InflateStatus::BadParam);

    // cursor past the end of the buffer
    let mut out = vec![0_u8; 64];
    let (status, _, _) =
        decompressor.decompress(&stream, &mut out, 65, USING_NON_WRAPPING_OUTPUT_BUF);
    assert_eq!(status, InflateStatus::BadParam);

    // both framings at once
    let (status, _, _) = decompressor.decompress(
        &stream,
        &mut out,
        0,
        PARSE_ZLIB_HEADER | PARSE_GZIP_HEADER | USING_NON_WRAPPING_OUTPUT_BUF
    );
    assert_eq!(status, InflateStatus::BadParam);
}

#[test]
fn undersized_ring_for_declared_window_fails()
{
    // the zlib header declares a 32 KiB window, an 8 KiB ring cannot
    // honor it
    let stream = encode_zlib(b"window check");
    let mut ring = vec![0_u8; 8 * 1024];
    let mut decompressor = InflateDecompressor::new();

    let (status, _, _) = decompressor.decompress(&stream, &mut ring, 0, PARSE_ZLIB_HEADER);

    assert_eq!(status, InflateStatus::Failed);
}

/// Writes deflate elements bit by bit, for handcrafting test blocks.
struct BitWriter
{
    bytes:    Vec<u8>,
    bit_pos:  u32,
    current:  u8
}

impl BitWriter
{
    fn new() -> BitWriter
    {
        BitWriter {
            bytes:   Vec::new(),
            bit_pos: 0,
            current: 0
        }
    }

    fn push_bit(&mut self, bit: u32)
    {
        self.current |= (bit as u8 & 1) << self.bit_pos;
        self.bit_pos += 1;

        if self.bit_pos == 8
        {
            self.bytes.push(self.current);
            self.current = 0;
            self.bit_pos = 0;
        }
    }

    /// Header fields go least significant bit first.
    fn put_bits(&mut self, value: u32, count: u32)
    {
        for i in 0..count
        {
            self.push_bit(value >> i);
        }
    }

    /// Huffman codewords go most significant bit first.
    fn put_code(&mut self, code: u32, count: u32)
    {
        for i in (0..count).rev()
        {
            self.push_bit(code >> i);
        }
    }

    fn finish(mut self) -> Vec<u8>
    {
        if self.bit_pos != 0
        {
            self.bytes.push(self.current);
        }
        self.bytes
    }
}

/// Emit a literal through the fixed litlen code.
fn put_fixed_literal(writer: &mut BitWriter, byte: u8)
{
    assert!(byte < 144);
    writer.put_code(0x30 + u32::from(byte), 8);
}

#[test]
fn overlapping_back_reference_repeats()
{
    // "ab" followed by a length 6, distance 2 match: the copy overlaps
    // its own output and must replicate, yielding "abababab"
    let mut writer = BitWriter::new();

    writer.put_bits(1, 1); // BFINAL
    writer.put_bits(1, 2); // fixed huffman

    put_fixed_literal(&mut writer, b'a');
    put_fixed_literal(&mut writer, b'b');

    // length 6 is symbol 260, a 7 bit code with no extra bits
    writer.put_code(260 - 256, 7);
    // distance 2 is symbol 1, a 5 bit code with no extra bits
    writer.put_code(1, 5);
    // end of block
    writer.put_code(0, 7);

    let stream = writer.finish();

    let (status, _, out) = decode_flat(&stream, 0, 64);

    assert_eq!(status, InflateStatus::Done);
    assert_eq!(out, b"abababab");

    // flate2 agrees on the handcrafted block
    let mut reference = Vec::new();
    flate2::read::DeflateDecoder::new(&stream[..])
        .read_to_end(&mut reference)
        .unwrap();
    assert_eq!(reference, out);
}

#[test]
fn distance_past_output_start_fails()
{
    // a match before any literal has been emitted
    let mut writer = BitWriter::new();

    writer.put_bits(1, 1);
    writer.put_bits(1, 2);
    writer.put_code(260 - 256, 7);
    writer.put_code(1, 5);
    writer.put_code(0, 7);

    let stream = writer.finish();

    let (status, _, _) = decode_flat(&stream, 0, 64);

    assert_eq!(status, InflateStatus::Failed);
}

#[test]
fn empty_zlib_stream_byte_exact()
{
    let stream = [0x78, 0x9C, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01];

    let (status, consumed, out) = decode_flat(&stream, PARSE_ZLIB_HEADER, 16);

    assert_eq!(status, InflateStatus::Done);
    assert_eq!(consumed, stream.len());
    assert!(out.is_empty());
}

#[test]
fn gzip_abc_byte_exact()
{
    let stream = [
        0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x4B, 0x4C, 0x4A, 0x06,
        0x00, 0xC2, 0x41, 0x24, 0x35, 0x03, 0x00, 0x00, 0x00
    ];

    let mut decompressor = InflateDecompressor::new();
    let mut out = vec![0_u8; 16];

    let (status, consumed, written) = decompressor.decompress(
        &stream,
        &mut out,
        0,
        PARSE_GZIP_HEADER | USING_NON_WRAPPING_OUTPUT_BUF
    );

    assert_eq!(status, InflateStatus::Done);
    assert_eq!(consumed, stream.len());
    assert_eq!(&out[..written], b"abc");
    assert_eq!(decompressor.checksum_expected(), 0x3524_41C2);
    assert_eq!(decompressor.checksum_computed(), 0x3524_41C2);
}

#[test]
fn truncated_gzip_statuses()
{
    let stream = [
        0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x4B, 0x4C, 0x4A, 0x06,
        0x00, 0xC2, 0x41, 0x24, 0x35, 0x03, 0x00, 0x00, 0x00
    ];
    let truncated = &stream[..stream.len() - 1];

    // all input present, so running dry is fatal
    let mut decompressor = InflateDecompressor::new();
    let mut out = vec![0_u8; 16];
    let (status, _, _) = decompressor.decompress(
        truncated,
        &mut out,
        0,
        PARSE_GZIP_HEADER | USING_NON_WRAPPING_OUTPUT_BUF
    );

    assert_eq!(status, InflateStatus::FailedCannotMakeProgress);

    // with more input promised the decoder just asks for it
    let mut decompressor = InflateDecompressor::new();
    let (status, _, written) = decompressor.decompress(
        truncated,
        &mut out,
        0,
        PARSE_GZIP_HEADER | USING_NON_WRAPPING_OUTPUT_BUF | HAS_MORE_INPUT
    );

    assert_eq!(status, InflateStatus::NeedsMoreInput);

    // and finishes cleanly when the byte shows up
    let (status, _, _) = decompressor.decompress(
        &stream[stream.len() - 1..],
        &mut out,
        written,
        PARSE_GZIP_HEADER | USING_NON_WRAPPING_OUTPUT_BUF
    );

    assert_eq!(status, InflateStatus::Done);
}

#[test]
fn needs_more_input_on_empty_slice()
{
    let mut decompressor = InflateDecompressor::new();
    let mut out = vec![0_u8; 16];

    let (status, consumed, written) = decompressor.decompress(
        &[],
        &mut out,
        0,
        USING_NON_WRAPPING_OUTPUT_BUF | HAS_MORE_INPUT
    );

    assert_eq!(status, InflateStatus::NeedsMoreInput);
    assert_eq!(consumed, 0);
    assert_eq!(written, 0);
}
