use criterion::{black_box, BatchSize, Criterion};

use partition_test_tools::aligned::AlignedBuffer;
use partition_test_tools::patterns;

use rank_partition::{partition_fuzzy, simd_partition_fuzzy, KeepSmallest};

pub fn bench(c: &mut Criterion, test_len: usize) {
    let pattern_providers: Vec<(&str, fn(usize) -> Vec<i32>)> = vec![
        ("random", patterns::random),
        ("random_d20", |len| patterns::random_uniform(len, 0..20)),
        ("ascending", patterns::ascending),
    ];

    let q_min = test_len / 8;
    let q_max = q_min + q_min / 2;

    for (pattern_name, pattern_provider) in pattern_providers {
        let vals_f32: Vec<f32> = pattern_provider(test_len)
            .into_iter()
            .map(|v| v as f32)
            .collect();
        let vals_u16: Vec<u16> = pattern_provider(test_len)
            .into_iter()
            .map(|v| v as u16)
            .collect();
        let ids: Vec<u64> = (0..test_len as u64).collect();

        c.bench_function(
            &format!("partition_fuzzy-f32-{pattern_name}-{test_len}"),
            |b| {
                b.iter_batched(
                    || (vals_f32.clone(), ids.clone()),
                    |(mut v, mut i)| {
                        black_box(partition_fuzzy::<KeepSmallest<f32, u64>>(
                            &mut v,
                            &mut i,
                            q_min,
                            q_max,
                            None,
                        ))
                    },
                    BatchSize::LargeInput,
                )
            },
        );

        c.bench_function(
            &format!("partition_fuzzy-u16-simd-{pattern_name}-{test_len}"),
            |b| {
                b.iter_batched(
                    || (AlignedBuffer::from_slice(&vals_u16), ids.clone()),
                    |(mut v, mut i)| {
                        black_box(simd_partition_fuzzy::<KeepSmallest<u16, u64>>(
                            v.as_mut_slice(),
                            &mut i,
                            q_min,
                            q_max,
                            None,
                        ))
                    },
                    BatchSize::LargeInput,
                )
            },
        );
    }
}
