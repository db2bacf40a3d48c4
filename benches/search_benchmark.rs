use chess_negamax::chess_position;
use chess_negamax::position::{Board, GameState};
use chess_negamax::search::{SearchConfig, Searcher};
use shakmaty::Move;

use criterion::{criterion_group, criterion_main, Criterion};

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("negamax back rank mate", |b| b.iter(find_back_rank_mate));
    c.bench_function("negamax opening depth 3", |b| b.iter(search_opening));
    c.bench_function("negamax opening depth 3 parallel", |b| {
        b.iter(search_opening_parallel)
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn find_back_rank_mate() {
    let mut board = chess_position! { b;
        ....r..k
        ....q...
        ........
        ........
        ........
        ........
        .....PPP
        R.....K.
    };
    let mut searcher: Searcher<Move> = Searcher::with_seed(SearchConfig::with_depth(2), 1);

    let chess_move = searcher.get_move(&mut board).unwrap();
    board.push(&chess_move);
}

fn search_opening() {
    let mut board = Board::from_fen(
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    )
    .unwrap();
    let mut searcher: Searcher<Move> = Searcher::with_seed(SearchConfig::with_depth(3), 1);
    searcher.get_move(&mut board).unwrap();
}

fn search_opening_parallel() {
    let mut board = Board::from_fen(
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    )
    .unwrap();
    let config = SearchConfig {
        parallel: true,
        ..SearchConfig::with_depth(3)
    };
    let mut searcher: Searcher<Move> = Searcher::with_seed(config, 1);
    searcher.get_move(&mut board).unwrap();
}
