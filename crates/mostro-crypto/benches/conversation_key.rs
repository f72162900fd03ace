use criterion::{criterion_group, criterion_main, Criterion};
use mostro_crypto::conversation_key;
use secp256k1::{Keypair, SecretKey, SECP256K1};

fn random_xonly(seed: u8) -> [u8; 32] {
    let secret = SecretKey::from_slice(&[seed; 32]).unwrap();
    let keypair = Keypair::from_secret_key(SECP256K1, &secret);
    let (xonly, _) = keypair.x_only_public_key();
    xonly.serialize()
}

fn benchmark_conversation_key(c: &mut Criterion) {
    let a_priv = SecretKey::from_slice(&[1u8; 32]).unwrap().secret_bytes();
    let b_pub = random_xonly(2);

    c.bench_function("conversation_key", |b| {
        b.iter(|| conversation_key(&a_priv, &b_pub).unwrap());
    });
}

criterion_group!(benches, benchmark_conversation_key);
criterion_main!(benches);
