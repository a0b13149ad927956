use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hostevent_core::event::decode_payload;
use hostevent_core::{PageLinks, ParsedEvent};

fn link_header(page: u32, last: u32) -> String {
    let url = |p: u32| {
        format!(
            "<https://api.github.com/repositories/1296269/pulls?state=open&per_page=100&page={}>",
            p
        )
    };
    format!(
        r#"{}; rel="prev", {}; rel="next", {}; rel="last", {}; rel="first""#,
        url(page - 1),
        url(page + 1),
        url(last),
        url(1)
    )
}

fn bench_link_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("link_parse");

    let header = link_header(2, 34);
    group.throughput(Throughput::Bytes(header.len() as u64));
    group.bench_function("github_four_rels", |b| {
        b.iter(|| PageLinks::parse(black_box(&header)))
    });

    let relative = r#"</pulls?page=2>; rel="next", </pulls?page=9>; rel="last""#;
    group.bench_function("relative_targets", |b| {
        b.iter(|| PageLinks::parse(black_box(relative)))
    });

    group.finish();
}

fn workflow_run_context(padding: usize) -> String {
    // Realistic payloads carry a lot of fields the resolver never reads
    let filler: Vec<String> = (0..padding)
        .map(|i| format!(r#""field_{}": {{"url": "https://example.com/{}", "id": {}}}"#, i, i, i))
        .collect();
    format!(
        r#"{{
            "event_name": "workflow_run",
            "token": "ghs_abc",
            "repository": "acme/widgets",
            "event": {{
                {},
                "repository": {{"name": "widgets", "owner": {{"login": "acme"}}}},
                "workflow_run": {{"head_sha": "4bf24cc72f3a62423927a0ac8d70febad7c78e0a"}}
            }}
        }}"#,
        filler.join(",")
    )
}

fn bench_event_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_decode");

    for padding in [0, 50, 500] {
        let raw = workflow_run_context(padding);

        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(padding), &raw, |b, raw| {
            b.iter(|| {
                let event = ParsedEvent::parse(black_box(raw)).unwrap();
                decode_payload(&event.event_kind, event.raw_payload.as_deref()).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_link_parse, bench_event_decode);
criterion_main!(benches);
