use criterion::{black_box, Criterion};

use partition_test_tools::patterns;

use rank_partition::{simd_histogram_16, simd_histogram_8};

pub fn bench(c: &mut Criterion, test_len: usize) {
    let data: Vec<u16> = patterns::random(test_len)
        .into_iter()
        .map(|v| v as u16)
        .collect();

    c.bench_function(&format!("histogram_8-shift4-{test_len}"), |b| {
        b.iter(|| {
            let mut hist = [0i32; 8];
            simd_histogram_8(black_box(&data), 0, 4, &mut hist);
            black_box(hist)
        })
    });

    c.bench_function(&format!("histogram_16-shift4-{test_len}"), |b| {
        b.iter(|| {
            let mut hist = [0i32; 16];
            simd_histogram_16(black_box(&data), 0, 4, &mut hist);
            black_box(hist)
        })
    });

    c.bench_function(&format!("histogram_16-raw-{test_len}"), |b| {
        b.iter(|| {
            let mut hist = [0i32; 16];
            simd_histogram_16(black_box(&data), 0, -1, &mut hist);
            black_box(hist)
        })
    });
}
