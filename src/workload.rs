//! Deterministic workload generator
//!
//! Dipakai bersama oleh `hermes_codec_perf`, integration tests dan
//! benches supaya ketiganya mengukur envelope yang sama persis.

use crate::error::EnvelopeError;
use crate::protocol::Envelope;

/// Pseudo-random body, deterministik per seed
pub fn build_body(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect()
}

/// `messages` envelope dengan body `body_len` bytes dan `properties`
/// entry `i -> i^3`. Envelope ke-i mendapat `born_time + i`.
pub fn build_workload(
    messages: usize,
    body_len: usize,
    properties: usize,
    born_time: i64,
) -> Result<Vec<Envelope>, EnvelopeError> {
    (0..messages)
        .map(|i| {
            Envelope::builder(format!("test.topic.a.topic.name.{i}"))
                .key(format!("topic.key.with.this.message.{i}"))
                .partition(format!("some.partition.on.kafka.{i}"))
                .born_time(born_time.wrapping_add(i as i64))
                .ack(true)
                .body(build_body(body_len, i as u64))
                .properties(
                    (0..properties as u64).map(|p| (p.to_string(), p.wrapping_pow(3).to_string())),
                )
                .build()
        })
        .collect()
}
