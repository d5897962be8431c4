//! Benchmarks for the approval ledger
//!
//! - deploy_release up to quorum across many maintainers
//! - check_release lookups in a ledger with many versions
//! - CBOR encode/decode of a populated ledger

use aiakos::identity::Identity;
use aiakos::ledger::{ApprovalLedger, ContentHash};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const OWNER: Identity = Identity::new([0xFF; 32]);

fn maintainer(id: u16) -> Identity {
    let mut bytes = [0u8; 32];
    bytes[..2].copy_from_slice(&id.to_be_bytes());
    Identity::new(bytes)
}

/// Ledger with `maintainers` registered maintainers and quorum `required`
fn create_ledger(maintainers: u16, required: u32) -> ApprovalLedger {
    let mut ledger = ApprovalLedger::new(OWNER, required).unwrap();
    for id in 0..maintainers {
        ledger.add_maintainer(&OWNER, maintainer(id)).unwrap();
    }
    ledger
}

/// Ledger where every version has reached quorum
fn create_populated_ledger(versions: usize) -> ApprovalLedger {
    let mut ledger = create_ledger(5, 3);
    for v in 0..versions {
        let version = format!("1.{}.0", v);
        let hash = ContentHash::digest(version.as_bytes());
        for id in 0..3 {
            ledger.deploy_release(&maintainer(id), &version, hash).unwrap();
        }
    }
    ledger
}

fn bench_deploy_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("deploy_release");
    let hash = ContentHash::digest(b"artifact");

    for size in [10u16, 100, 1000] {
        let base = create_ledger(size, size as u32);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut ledger = base.clone();
                for id in 0..size {
                    ledger
                        .deploy_release(&maintainer(id), black_box("1.0.0"), hash)
                        .unwrap();
                }
                ledger
            });
        });
    }

    group.finish();
}

fn bench_check_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_release");

    for versions in [10usize, 100, 1000] {
        let ledger = create_populated_ledger(versions);
        let version = format!("1.{}.0", versions / 2);
        let hash = ContentHash::digest(version.as_bytes());

        group.bench_with_input(
            BenchmarkId::from_parameter(versions),
            &versions,
            |b, _| {
                b.iter(|| ledger.check_release(black_box(&version), black_box(&hash)));
            },
        );
    }

    group.finish();
}

fn bench_serialization(c: &mut Criterion) {
    let ledger = create_populated_ledger(100);
    let bytes = ledger.to_bytes().unwrap();

    c.bench_function("ledger_to_bytes_100_releases", |b| {
        b.iter(|| black_box(&ledger).to_bytes().unwrap());
    });
    c.bench_function("ledger_from_bytes_100_releases", |b| {
        b.iter(|| ApprovalLedger::from_bytes(black_box(&bytes)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_deploy_release,
    bench_check_release,
    bench_serialization
);
criterion_main!(benches);
