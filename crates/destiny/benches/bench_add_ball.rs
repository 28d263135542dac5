use std::hint::black_box;
use std::time::Instant;

use glam::DVec3;
use orrery_destiny::{
    BallState, ENVELOPE_LEN, Envelope, MovementMode, decode_update, encode_ball, encoded_len,
    sub_type, write_envelope,
};

fn make_state(name: &str, mode: MovementMode) -> BallState<'_> {
    BallState {
        id: 140_000_001,
        radius: 250.0,
        position: DVec3::new(1.0e6, -2.0e5, 3.5e7),
        sub_type: sub_type::PLAYER,
        mass: 1.2e7,
        cloaked: false,
        corporation_id: 1_000_044,
        alliance_id: 0,
        max_velocity: 180.0,
        velocity: DVec3::ZERO,
        agility: 0.45,
        speed_fraction: 1.0,
        mode,
        name,
    }
}

fn bench_encode(label: &str, state: &BallState<'_>, iterations: usize) {
    let start = Instant::now();
    for seq in 0..iterations {
        let len = ENVELOPE_LEN + encoded_len(state);
        let mut buf = Vec::with_capacity(len);
        write_envelope(&mut buf, Envelope::add_ball(seq as u32));
        encode_ball(black_box(state), &mut buf);
        black_box(buf);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  encode {label} ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_decode(label: &str, state: &BallState<'_>, iterations: usize) {
    let mut buf = Vec::new();
    write_envelope(&mut buf, Envelope::add_ball(1));
    encode_ball(state, &mut buf);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(decode_update(black_box(&buf)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  decode {label} ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("=== Add-ball Benchmarks ===\n");

    let long_name = "Interceptor ".repeat(16);
    let stopped = make_state("Rook", MovementMode::Stopped);
    let stopped_long = make_state(&long_name, MovementMode::Stopped);
    let warping = make_state(
        "Rook",
        MovementMode::Warping {
            target: DVec3::new(9.0e10, 0.0, -4.0e9),
        },
    );

    println!("Encode:");
    bench_encode("stopped", &stopped, 100_000);
    bench_encode("stopped, long name", &stopped_long, 100_000);
    bench_encode("warping", &warping, 100_000);

    println!("\nDecode:");
    bench_decode("stopped", &stopped, 100_000);
    bench_decode("warping", &warping, 100_000);

    println!("\n=== Done ===");
}
