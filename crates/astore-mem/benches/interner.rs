//! String table benchmarks.
//!
//! Compares the fixed-capacity [`StringTable`] against a growable
//! `hashbrown` map keyed with `fxhash`, over identifier streams shaped like
//! an AST dump (heavy duplication of type names and paths).

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use astore_mem::string::hash_bytes;
use astore_mem::{HybridString, Property, StringTable};
use fxhash::FxBuildHasher;
use hashbrown::HashMap;

/// Roughly one third unique identifiers, the rest repeated names.
fn token_stream(size: usize) -> Vec<String> {
    (0..size)
        .map(|i| {
            if i % 3 == 0 {
                format!("unique_identifier_{i}")
            } else if i % 2 == 0 {
                format!("var_{}", i % 100)
            } else {
                match i % 5 {
                    0 => "int".to_string(),
                    1 => "const char *".to_string(),
                    2 => "/usr/include/x86_64-linux-gnu/bits/sched.h".to_string(),
                    3 => "size_t".to_string(),
                    _ => "void (ngx_err_t, const char *, ...)".to_string(),
                }
            }
        })
        .collect()
}

fn bench_intern_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern_stream");

    for size in [100, 1_000, 10_000] {
        let tokens = token_stream(size);

        group.bench_with_input(BenchmarkId::new("string_table", size), &tokens, |b, tokens| {
            b.iter(|| {
                let mut table = StringTable::with_capacity(10_099);
                for token in tokens {
                    black_box(table.intern(&HybridString::borrowed(token.as_bytes()), Property::TEXT));
                }
                table.len()
            });
        });

        group.bench_with_input(BenchmarkId::new("hashbrown_fx", size), &tokens, |b, tokens| {
            b.iter(|| {
                let mut map: HashMap<Vec<u8>, u8, FxBuildHasher> = HashMap::default();
                for token in tokens {
                    let property = map.entry(token.as_bytes().to_vec()).or_insert(0);
                    *property |= Property::TEXT.bits();
                    black_box(&*property);
                }
                map.len()
            });
        });
    }

    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");

    for load in [25usize, 50, 90] {
        let capacity = 10_099;
        let count = capacity * load / 100;
        let words: Vec<String> = (0..count).map(|i| format!("identifier_{i}")).collect();

        let mut table = StringTable::with_capacity(capacity);
        for word in &words {
            table.intern(&HybridString::borrowed(word.as_bytes()), Property::IDENTIFIER);
        }

        group.bench_with_input(BenchmarkId::from_parameter(load), &words, |b, words| {
            b.iter(|| {
                for word in words {
                    black_box(table.find(&HybridString::borrowed(word.as_bytes())));
                }
            });
        });
    }

    group.finish();
}

fn bench_content_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_hash");

    for len in [4usize, 22, 64, 256] {
        let bytes = vec![b'x'; len];

        group.bench_with_input(BenchmarkId::new("seeded", len), &bytes, |b, bytes| {
            b.iter(|| hash_bytes(black_box(bytes)));
        });

        group.bench_with_input(BenchmarkId::new("fxhash", len), &bytes, |b, bytes| {
            b.iter(|| fxhash::hash32(black_box(bytes)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_intern_stream, bench_find, bench_content_hash);
criterion_main!(benches);
