use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use cycle_segments::pipeline::{PipelineOptions, json_to_table};
use cycle_segments::smoothing::SmoothingOptions;
use serde_json::{Value, json};

/// Synthetic journey with `segments` legs of `vertices` points each.
fn synthetic_journey(segments: usize, vertices: usize) -> Value {
    let mut markers = vec![json!({"@attributes": {"plan": "balanced", "length": "0"}})];
    let mut lon = -1.55;
    let mut lat = 53.80;
    for i in 0..segments {
        let mut points = Vec::with_capacity(vertices);
        let mut elevations = Vec::with_capacity(vertices);
        for v in 0..vertices {
            points.push(format!("{lon:.6},{lat:.6}"));
            elevations.push(format!("{:.1}", 50.0 + ((i * vertices + v) as f64 * 0.3).sin() * 8.0));
            if v + 1 < vertices {
                lon += 0.0002;
                lat += 0.0001;
            }
        }
        markers.push(json!({"@attributes": {
            "name": format!("Segment {i}"),
            "time": "12",
            "busynance": "100",
            "points": points.join(" "),
            "elevations": elevations.join(","),
        }}));
    }
    json!({ "marker": markers })
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_to_table");
    let options = PipelineOptions {
        smoothing: SmoothingOptions {
            enabled: true,
            ..SmoothingOptions::default()
        },
        ..PipelineOptions::default()
    };

    for (segments, vertices) in [(10, 5), (100, 20), (1_000, 20)] {
        let journey = synthetic_journey(segments, vertices);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{segments}x{vertices}")),
            &journey,
            |b, journey| b.iter(|| json_to_table(black_box(journey), &options)),
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_pipeline);
criterion_main!(benches);
