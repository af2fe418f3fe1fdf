//! Benchmarks for inbound message parsing and outbound rendering

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use game_link::ws::{InboundMessage, OutboundMessage};
use serde_json::json;

const DIALOGUE_FRAME: &str =
    r#"{"type":"dialogue","speaker":"Guide","line":"Welcome back, traveller.","choices":["Continue","Leave"]}"#;

fn benchmark_parse_json(c: &mut Criterion) {
    c.bench_function("inbound_parse_json", |b| {
        b.iter(|| InboundMessage::parse(black_box(DIALOGUE_FRAME.to_string())))
    });
}

fn benchmark_parse_raw_fallback(c: &mut Criterion) {
    c.bench_function("inbound_parse_raw", |b| {
        b.iter(|| InboundMessage::parse(black_box("server says hello".to_string())))
    });
}

fn benchmark_outbound_wire(c: &mut Criterion) {
    let payload = json!({"type": "dialogue_choice", "option": 1, "scene": "DialogueScene"});

    c.bench_function("outbound_json_wire", |b| {
        b.iter(|| OutboundMessage::Json(black_box(payload.clone())).into_wire())
    });
}

criterion_group!(
    benches,
    benchmark_parse_json,
    benchmark_parse_raw_fallback,
    benchmark_outbound_wire
);
criterion_main!(benches);
