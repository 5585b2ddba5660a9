use criterion::{criterion_group, criterion_main, Criterion};
use game_model::GainEvent;

fn bench_burst_ingestion(c: &mut Criterion) {
    let events: Vec<GainEvent> = (0..64)
        .map(|i| GainEvent {
            skill: Some(["Woodcutting", "Mining", "Foraging"][i % 3].to_string()),
            xp: Some(5 + (i as i64 % 11)),
            item: Some(["Wood", "Stone", "Herbs"][i % 3].to_string()),
            quantity: Some(1),
        })
        .collect();
    c.bench_function("gains_burst", |b| {
        b.iter(|| {
            let mut tracker = client_state::GainsTracker::new();
            let mut now = 0u64;
            for event in &events {
                tracker.record(event, now);
                now += 50;
            }
            tracker.poll(now + client_state::COALESCE_WINDOW_MS)
        })
    });
}

criterion_group!(benches, bench_burst_ingestion);
criterion_main!(benches);
