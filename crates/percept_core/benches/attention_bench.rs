use criterion::{black_box, criterion_group, criterion_main, Criterion};
use percept_core::attention::{AttentionHint, CycleContext, Situation, TacticalContext};
use percept_core::config::{BeliefConfig, PerceptConfig};
use percept_core::geom::{Position, Velocity};
use percept_core::observation::{Hypothesis, ObservationBatch, SelfReport, Sighting};
use percept_core::{AttentionScheduler, EntityId, PlayMode, SensorWidth, SightTiming, WorldBelief};

fn full_pitch_world() -> WorldBelief {
    let cfg = BeliefConfig::default();
    let mut world = WorldBelief::new(6, &cfg).unwrap();
    let mut batch = ObservationBatch::new(1, true)
        .with_self_report(SelfReport {
            pos: Position::new(-5.0, 3.0),
            vel: Velocity::new(0.3, 0.0),
            body_dir: 20.0,
            neck_dir: -15.0,
            view_width: SensorWidth::Normal,
            age: 0,
            confidence: 1.0,
        })
        .with_sighting(Sighting::position(EntityId::Ball, Position::new(12.0, -4.0), 0, 1.0))
        .with_sighting(Sighting::velocity(EntityId::Ball, Velocity::new(1.2, 0.4), 0, 1.0));
    for u in 1..=11u8 {
        let f = f64::from(u);
        batch = batch
            .with_sighting(Sighting::position(
                EntityId::Teammate(u),
                Position::new(-45.0 + f * 7.0, (f * 37.0) % 60.0 - 30.0),
                u32::from(u % 4),
                0.9,
            ))
            .with_sighting(Sighting::position(
                EntityId::Opponent(u),
                Position::new(45.0 - f * 7.5, (f * 23.0) % 60.0 - 30.0),
                u32::from(u % 5),
                0.8,
            ));
    }
    batch = batch.with_hypotheses(
        EntityId::Opponent(9),
        vec![
            Hypothesis { pos: Position::new(20.0, 10.0), probability: 0.6 },
            Hypothesis { pos: Position::new(22.0, -12.0), probability: 0.3 },
        ],
    );
    world.advance_cycle(Some(&batch), &cfg);
    world.set_goalies(Some(1), Some(1));
    for _ in 0..6 {
        world.advance_cycle(None, &cfg);
    }
    world
}

fn bench_decide_full_pitch(c: &mut Criterion) {
    let world = full_pitch_world();
    let ctx = CycleContext {
        cycle: 7,
        play_mode: PlayMode::PlayOn,
        last_play_mode: PlayMode::PlayOn,
        tactical: TacticalContext { situation: Situation::ForwardAttack, ..Default::default() },
        hints: vec![AttentionHint::Refresh { entity: EntityId::Opponent(4), eva: 2.0 }],
        ..Default::default()
    };
    let mut scheduler = AttentionScheduler::new(PerceptConfig::default());
    c.bench_function("decide_22_players", |b| {
        b.iter(|| scheduler.decide(black_box(&world), black_box(&ctx)))
    });
}

fn bench_decide_between_sights(c: &mut Criterion) {
    let world = full_pitch_world();
    let ctx = CycleContext {
        cycle: 7,
        play_mode: PlayMode::PlayOn,
        sight: SightTiming::new(1),
        ..Default::default()
    };
    let mut scheduler = AttentionScheduler::new(PerceptConfig::default());
    c.bench_function("decide_between_sights", |b| {
        b.iter(|| scheduler.decide(black_box(&world), black_box(&ctx)))
    });
}

fn bench_advance_cycle(c: &mut Criterion) {
    let cfg = BeliefConfig::default();
    let world = full_pitch_world();
    c.bench_function("advance_cycle_decay_only", |b| {
        b.iter_batched(
            || world.clone(),
            |mut w| w.advance_cycle(None, black_box(&cfg)),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_decide_full_pitch, bench_decide_between_sights, bench_advance_cycle);
criterion_main!(benches);
