use criterion::{criterion_group, criterion_main, Criterion, black_box};
use piebot_datagen::board::Position;
use piebot_datagen::search::alphabeta::Searcher;

fn bench_search(c: &mut Criterion) {
    let pos = Position::startpos();
    c.bench_function("ranked_search_3000_nodes_startpos", |ben| {
        ben.iter(|| {
            let mut s = Searcher::default();
            let ranked = s.search_ranked(black_box(&pos), 3_000);
            black_box(ranked.len())
        })
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
