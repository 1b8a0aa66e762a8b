//! Throughput Benchmark for cfsemu
//!
//! This benchmark measures the per-line protocol path: framing, parsing,
//! parameter validation and response encoding.

use bytes::{Bytes, BytesMut};
use cfsemu::commands::{read_chunk, Command, ReadMode};
use cfsemu::protocol::{parse_line, tokenize, Info, LineSplitter, Response};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

/// Benchmark line framing
fn bench_framing(c: &mut Criterion) {
    let mut input = Vec::new();
    for i in 0..1000 {
        input.extend_from_slice(format!("AT+CFSRFILE=0,\"app.bin\",1,512,{}\r\n", i * 512).as_bytes());
    }

    let mut group = c.benchmark_group("framing");
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("split_1000_lines", |b| {
        b.iter(|| {
            let mut splitter = LineSplitter::new();
            let mut buf = BytesMut::from(&input[..]);
            let mut count = 0;
            while let Some(line) = splitter.next_line(&mut buf) {
                black_box(line);
                count += 1;
            }
            count
        });
    });

    group.finish();
}

/// Benchmark parsing and validation
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(1));

    group.bench_function("parse_line", |b| {
        b.iter(|| parse_line(black_box("AT+CFSRFILE=0,\"app.bin\",1,512,1024")));
    });

    group.bench_function("tokenize_quoted", |b| {
        b.iter(|| tokenize(black_box("3,\"dir/with,comma/file.bin\",1,10240,99999")));
    });

    group.bench_function("validate_read_file", |b| {
        let spec = Command::ReadFile.spec();
        b.iter(|| spec.validate(black_box("0,\"app.bin\",1,512,1024")));
    });

    group.finish();
}

/// Benchmark response encoding
fn bench_encode(c: &mut Criterion) {
    let contents = Bytes::from(vec![0x5a; 64 * 1024]);

    let mut group = c.benchmark_group("encode");

    for size in [16usize, 1024, 10240] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("read_response_{}", size), |b| {
            b.iter(|| {
                let chunk = read_chunk(&contents, ReadMode::FromOffset, size, 4096).unwrap();
                let response = Response::success(
                    "AT+CFSRFILE=0,\"app.bin\",1,1024,4096",
                    vec![Info::payload("CFSRFILE", chunk)],
                );
                black_box(response.serialize())
            });
        });
    }

    group.bench_function("size_response", |b| {
        b.iter(|| {
            let response = Response::success(
                "AT+CFSGFIS=0,\"app.bin\"",
                vec![Info::value("CFSGFIS", black_box(123_456u64))],
            );
            black_box(response.serialize())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_framing, bench_parse, bench_encode);
criterion_main!(benches);
