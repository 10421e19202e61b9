//! Run with:
//!   cargo bench --bench collect_benchmark

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pairgc::{Machine, MachineSettings};

/// Pushes `width` scalars and folds them into a single nested pair.
fn build_list(vm: &mut Machine, width: usize) {
    for i in 0..width {
        vm.push_scalar(i as i64).unwrap();
    }
    while vm.depth() >= 2 {
        vm.make_pair().unwrap();
    }
}

fn bench_churn(c: &mut Criterion) {
    c.bench_function("churn 100 lists of 20", |b| {
        b.iter(|| {
            let mut vm = Machine::new();
            for _ in 0..100 {
                build_list(&mut vm, 20);
                vm.pop_root();
            }
            black_box(vm.collect())
        })
    });
}

fn bench_collect_live(c: &mut Criterion) {
    let mut vm = Machine::with_settings(MachineSettings {
        initial_threshold: usize::MAX,
        ..Default::default()
    })
    .unwrap();
    for _ in 0..200 {
        build_list(&mut vm, 50);
    }

    c.bench_function("collect 200 live lists", |b| {
        b.iter(|| black_box(vm.collect()))
    });
}

criterion_group!(benches, bench_churn, bench_collect_live);
criterion_main!(benches);
