use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hostevent_core::coordination::find_by_head_sha;
use hostevent_core::traits::PageSource;
use hostevent_core::{fetch_all, Page, PageLinks, PullRequestSummary, Result};
use std::future::Ready;

/// In-memory collection served `per_page` items at a time
struct MemoryPages {
    pulls: Vec<PullRequestSummary>,
    per_page: usize,
}

impl MemoryPages {
    fn new(count: u64, per_page: usize) -> Self {
        let pulls = (1..=count)
            .map(|n| PullRequestSummary::new(n, format!("{:040x}", n)))
            .collect();
        Self { pulls, per_page }
    }

    fn total(&self) -> u32 {
        self.pulls.len().div_ceil(self.per_page).max(1) as u32
    }
}

impl PageSource for MemoryPages {
    type Item = PullRequestSummary;

    type PageFuture<'a>
        = Ready<Result<Page<PullRequestSummary>>>
    where
        Self: 'a;

    fn fetch_page(&self, page: u32) -> Self::PageFuture<'_> {
        let start = (page as usize - 1) * self.per_page;
        let items = self
            .pulls
            .iter()
            .skip(start)
            .take(self.per_page)
            .cloned()
            .collect();
        let total = self.total();
        let links = PageLinks {
            next: (page < total).then_some(page + 1),
            last: Some(total),
        };
        std::future::ready(Ok(Page::new(items, links)))
    }
}

fn bench_fetch_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("fetch_all");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    for count in [10u64, 100, 1000, 10_000] {
        let source = MemoryPages::new(count, 100);

        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &source, |b, source| {
            b.iter(|| runtime.block_on(fetch_all(black_box(source))).unwrap())
        });
    }

    group.finish();
}

fn bench_head_sha_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_by_head_sha");

    for count in [100u64, 1000, 10_000] {
        let pulls = MemoryPages::new(count, 100).pulls;
        let last_sha = format!("{:040x}", count);

        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("worst_case", count), &pulls, |b, pulls| {
            b.iter(|| find_by_head_sha(black_box(pulls), black_box(&last_sha)).map(|p| p.number))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fetch_all, bench_head_sha_lookup);
criterion_main!(benches);
