use std::io::Cursor;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use yxdb_reader::{BLOCK_SIZE, ReaderConfig, YxdbReader};
use yxdb_tests::compress::compress;
use yxdb_tests::schemas::{lots_of_records, tutorial_data, tutorial_record, very_long_field};
use yxdb_wire::OUTPUT_CAPACITY;
use yxdb_wire::lzf::decompress;

fn count_records(bytes: &[u8], config: ReaderConfig) -> u64 {
    let mut reader = YxdbReader::from_reader(Cursor::new(bytes.to_vec()), config).unwrap();
    let mut n = 0;
    while reader.advance() {
        n += 1;
    }
    reader.close().unwrap();
    n
}

fn bench_lzf_block(c: &mut Criterion) {
    let raw: Vec<u8> = (100..).flat_map(tutorial_record).take(BLOCK_SIZE).collect();
    let packed = compress(&raw);
    let mut out = vec![0u8; OUTPUT_CAPACITY];

    let mut group = c.benchmark_group("lzf");
    group.throughput(Throughput::Bytes(raw.len() as u64));
    group.bench_function("decompress_block", |b| {
        b.iter(|| decompress(&packed, &mut out).unwrap());
    });
    group.finish();
}

fn bench_read_files(c: &mut Criterion) {
    let fixtures = [
        ("tutorial_data", tutorial_data().build()),
        ("very_long_field", very_long_field().build()),
        ("lots_of_records", lots_of_records().build()),
    ];

    let mut group = c.benchmark_group("read_all");
    for (name, bytes) in &fixtures {
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("inline", name), bytes, |b, bytes| {
            b.iter(|| count_records(bytes, ReaderConfig::inline()));
        });
        group.bench_with_input(BenchmarkId::new("prefetch", name), bytes, |b, bytes| {
            b.iter(|| count_records(bytes, ReaderConfig::default()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lzf_block, bench_read_files);
criterion_main!(benches);
