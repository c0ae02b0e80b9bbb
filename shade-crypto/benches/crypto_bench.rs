//! Criterion benchmarks for SHADE crypto: keygen, derivation, codec, trial decryption.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shade_crypto::{cbc, derive_shared_secret, generate_keypair, nip04};

fn bench_keygen(c: &mut Criterion) {
    let mut g = c.benchmark_group("keygen");
    g.throughput(Throughput::Elements(1));
    g.bench_function("generate_keypair", |b| {
        b.iter(|| black_box(generate_keypair()));
    });
    g.finish();
}

fn bench_derivation(c: &mut Criterion) {
    let local = generate_keypair();
    let remote = generate_keypair();
    let mut g = c.benchmark_group("derivation");
    g.throughput(Throughput::Elements(1));
    g.bench_function("derive_shared_secret", |b| {
        b.iter(|| black_box(derive_shared_secret(&local.secret, &remote.public)).unwrap());
    });
    g.bench_function("nip04_conversation_key", |b| {
        b.iter(|| black_box(nip04::conversation_key(&local.secret, &remote.public)).unwrap());
    });
    g.finish();
}

fn bench_codec(c: &mut Criterion) {
    let local = generate_keypair();
    let remote = generate_keypair();
    let key = derive_shared_secret(&local.secret, &remote.public).unwrap();

    let mut g = c.benchmark_group("codec");
    for size in [64usize, 1024, 16 * 1024] {
        let plaintext = vec![0x42u8; size];
        let payload = cbc::encrypt(&key, &plaintext);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::new("encrypt", size), &plaintext, |b, pt| {
            b.iter(|| black_box(cbc::encrypt(&key, pt)));
        });
        g.bench_with_input(BenchmarkId::new("decrypt", size), &payload, |b, p| {
            b.iter(|| black_box(cbc::decrypt(&key, p)));
        });
    }
    g.finish();
}

/// Cost of one oracle step for a non-matching candidate (derive + rejected decrypt).
fn bench_trial(c: &mut Criterion) {
    let receiver = generate_keypair();
    let sender = generate_keypair();
    let wrong = generate_keypair();
    let key = derive_shared_secret(&sender.secret, &receiver.public).unwrap();
    let payload = cbc::encrypt(&key, br#"{"pubkey":"00","content":"x?iv=y"}"#);

    let mut g = c.benchmark_group("trial");
    g.throughput(Throughput::Elements(1));
    g.bench_function("wrong_candidate", |b| {
        b.iter(|| {
            let k = derive_shared_secret(&receiver.secret, &wrong.public).unwrap();
            black_box(cbc::decrypt(&k, &payload))
        });
    });
    g.bench_function("right_candidate", |b| {
        b.iter(|| {
            let k = derive_shared_secret(&receiver.secret, &sender.public).unwrap();
            black_box(cbc::decrypt(&k, &payload))
        });
    });
    g.finish();
}

criterion_group!(benches, bench_keygen, bench_derivation, bench_codec, bench_trial);
criterion_main!(benches);
