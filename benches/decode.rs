use std::io::{Cursor, Read};
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn decode_writer_flate(bytes: &[u8]) -> Vec<u8>
{
    let mut writer = Vec::new();

    let mut deflater = flate2::read::ZlibDecoder::new(Cursor::new(bytes));

    deflater.read_to_end(&mut writer).unwrap();

    writer
}

fn decode_writer_streamflate(bytes: &[u8]) -> Vec<u8>
{
    let mut deflater = streamflate::DeflateDecoder::new(bytes);

    deflater.decode_zlib().unwrap()
}

/// Compressible text with a pseudo-random sprinkle, ~20 MB decoded.
fn bench_payload() -> Vec<u8>
{
    let mut payload = Vec::with_capacity(20 * 1024 * 1024);
    let mut state = 0xFEED_F00D_u64;

    while payload.len() < 20 * 1024 * 1024
    {
        payload.extend_from_slice(b"benchmark corpora are never representative but here we are ");

        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        payload.push((state >> 56) as u8);
    }
    payload
}

fn decode_benchmark(c: &mut Criterion)
{
    use std::io::Write;

    let payload = bench_payload();

    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());

    encoder.write_all(&payload).unwrap();

    let compressed = encoder.finish().unwrap();

    let mut group = c.benchmark_group("zlib decode");

    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("streamflate", |b| {
        b.iter(|| black_box(decode_writer_streamflate(&compressed)))
    });

    group.bench_function("flate2", |b| {
        b.iter(|| black_box(decode_writer_flate(&compressed)))
    });

    group.finish();
}

criterion_group!(benches, decode_benchmark);
criterion_main!(benches);
