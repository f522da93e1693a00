#![allow(clippy::unusual_byte_groupings)] // group bits by instruction field, not by nibble

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use lc3core::machine::Machine;

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("LC3_Instructions");

    group.bench_function("add_execution", |b| {
        b.iter_batched(
            || {
                let mut m = Machine::new();
                m.pc.set(0x3000);
                m.r[1].set(5);
                m.r[2].set(10);
                m.memory.write(0x3000, 0b0001_011_001_000_010); // ADD R3, R1, R2
                m
            },
            |mut m| {
                black_box(m.step());
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("and_execution", |b| {
        b.iter_batched(
            || {
                let mut m = Machine::new();
                m.pc.set(0x3000);
                m.r[1].set(0x00FF);
                m.r[2].set(0x0F0F);
                m.memory.write(0x3000, 0b0101_011_001_000_010); // AND R3, R1, R2
                m
            },
            |mut m| {
                black_box(m.step());
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("branch_execution", |b| {
        b.iter_batched(
            || {
                let mut m = Machine::new();
                m.pc.set(0x3000);
                m.r[1].set(0u16.wrapping_sub(1));
                m.update_flags(1);
                m.memory.write(0x3000, 0b0000_100_000001010); // BRn #10
                m
            },
            |mut m| {
                black_box(m.step());
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("load_store_execution", |b| {
        b.iter_batched(
            || {
                let mut m = Machine::new();
                m.pc.set(0x3000);
                m.memory.write(0x3006, 0x1234); // 0x3000 + 1 (fetch advance) + 5 (offset)
                m.memory.write(0x3000, 0b0010_011_000000101); // LD R3, #5
                m
            },
            |mut m| {
                black_box(m.step());
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("jsr_execution", |b| {
        b.iter_batched(
            || {
                let mut m = Machine::new();
                m.pc.set(0x3000);
                m.memory.write(0x3000, 0b0100_1_00000010100); // JSR #20
                m
            },
            |mut m| {
                black_box(m.step());
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("trap_execution", |b| {
        b.iter_batched(
            || {
                let mut m = Machine::new();
                m.pc.set(0x3000);
                m.memory.write(0x3000, 0b1111_0000_00100101); // TRAP x25 (HALT)
                m
            },
            |mut m| {
                black_box(m.step());
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("tick_loop_until_halt", |b| {
        b.iter_batched(
            || {
                let mut m = Machine::new();
                m.pc.set(0x3000);
                // A short loop: ADD R1,R1,#1 then BR back to self, for 99
                // iterations, then TRAP x25. Exercises the full fetch-pump-
                // step-MCC cycle repeatedly rather than one instruction.
                m.memory.write(0x3000, 0b0001_001_001_1_00001); // ADD R1, R1, #1
                m.memory.write(0x3001, 0b0000_111_111111110); // BRnzp -2 (self)
                m.r[1].set(0u16.wrapping_sub(100));
                m.start_running();
                m
            },
            |mut m| {
                for _ in 0..200 {
                    if !m.tick() {
                        break;
                    }
                }
                black_box(());
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
