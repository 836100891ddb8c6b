use piebot_datagen::board::Position;
use piebot_datagen::search::eval::MATE_SCORE;
use piebot_datagen::search::{RootMove, SearchEngine};
use piebot_datagen::selfplay::codec::{RecordFormat, PACKED_RECORD_SIZE};
use piebot_datagen::selfplay::config::DatagenConfig;
use piebot_datagen::selfplay::game::{GameRunner, MovePolicy, Termination, MAX_GAME_PLIES};
use piebot_datagen::selfplay::label::GameOutcome;
use piebot_datagen::board::DrawReason;
use piebot_datagen::selfplay::opening::{Opening, OpeningBook, OpeningSource, OpeningSupplier};
use piebot_datagen::selfplay::rng::{RandomSource, SeededRandom};
use piebot_datagen::selfplay::writer::read_records;
use piebot_datagen::selfplay::run;
use pretty_assertions::assert_eq;
use std::path::Path;

/// Claims a forced mate with whatever move is generated first.
struct MateInOne;

impl SearchEngine for MateInOne {
    fn search(&mut self, pos: &Position, _nodes: u64) -> Vec<RootMove> {
        pos.legal_moves().into_iter().take(1)
            .map(|mv| RootMove { mv, score: MATE_SCORE - 1, pv: vec![mv] })
            .collect()
    }
}

/// Remembers the moves that led to every searched position and then gives up.
#[derive(Default)]
struct Recorder {
    seen: Vec<Vec<String>>,
}

impl SearchEngine for Recorder {
    fn search(&mut self, pos: &Position, _nodes: u64) -> Vec<RootMove> {
        self.seen.push(pos.moves().to_vec());
        Vec::new()
    }
}

/// Plays uniformly random legal moves with a flat score.
struct RandomMover(SeededRandom);

impl SearchEngine for RandomMover {
    fn search(&mut self, pos: &Position, _nodes: u64) -> Vec<RootMove> {
        let moves = pos.legal_moves();
        if moves.is_empty() { return Vec::new(); }
        let mv = moves[self.0.next_int(moves.len())];
        vec![RootMove { mv, score: 0, pv: vec![mv] }]
    }
}

/// Reports the first legal move as getting mated.
struct Mated;

impl SearchEngine for Mated {
    fn search(&mut self, pos: &Position, _nodes: u64) -> Vec<RootMove> {
        pos.legal_moves().into_iter().take(1)
            .map(|mv| RootMove { mv, score: -(MATE_SCORE - 2), pv: vec![mv] })
            .collect()
    }
}

/// Shuffles the g-knights out and back.
struct KnightShuffle;

impl SearchEngine for KnightShuffle {
    fn search(&mut self, pos: &Position, _nodes: u64) -> Vec<RootMove> {
        let token = ["g1f3", "g8f6", "f3g1", "f6g8"][pos.ply_count() % 4];
        let mv = pos.parse_token(token).unwrap();
        vec![RootMove { mv, score: 0, pv: vec![mv] }]
    }
}

/// Proposes a pawn jump that is never legal from the start position.
struct Illegal;

impl SearchEngine for Illegal {
    fn search(&mut self, _pos: &Position, _nodes: u64) -> Vec<RootMove> {
        let mv = "e2e5".parse().unwrap();
        vec![RootMove { mv, score: 0, pv: vec![mv] }]
    }
}

/// Mates at once, noting the on-disk corpus size each time a game starts.
struct DiskWatcher {
    out: String,
    sizes: Vec<u64>,
}

impl SearchEngine for DiskWatcher {
    fn search(&mut self, pos: &Position, nodes: u64) -> Vec<RootMove> {
        MateInOne.search(pos, nodes)
    }

    fn new_game(&mut self) {
        self.sizes.push(std::fs::metadata(&self.out).map(|m| m.len()).unwrap_or(0));
    }
}

fn startpos_opening() -> Opening {
    Opening { position: Position::startpos(), plies: 0, source: OpeningSource::Random }
}

fn fresh(path: &str) -> String {
    std::fs::create_dir_all("target/selfplay_test").unwrap();
    let _ = std::fs::remove_file(path);
    path.to_string()
}

#[test]
fn forced_mate_writes_one_winning_record() {
    let out = fresh("target/selfplay_test/mate.binpack");
    let config = DatagenConfig::from_options(&format!("games 1 nodes 1 seed 5 progress off out {out}"));
    let summary = run(&config, &mut MateInOne, &mut SeededRandom::new(5)).unwrap();

    assert_eq!(summary.games, 1);
    assert_eq!(summary.samples, 1);
    assert_eq!(std::fs::metadata(&out).unwrap().len(), PACKED_RECORD_SIZE as u64);
    let recs = read_records(&out, RecordFormat::Packed).unwrap();
    assert_eq!(recs.len(), 1);
    let mover_wins = if recs[0].side == 0 { 1 } else { -1 };
    assert_eq!(recs[0].result, mover_wins);
    assert_eq!(recs[0].score, (MATE_SCORE - 1) as i16);
}

#[test]
fn book_line_is_replayed_before_search() {
    let out = fresh("target/selfplay_test/book.binpack");
    let book = "target/selfplay_test/book_moves.txt";
    std::fs::write(book, "e4 e5\n").unwrap();
    let config = DatagenConfig::from_options(&format!("games 1 progress off book {book} out {out}"));
    let mut engine = Recorder::default();
    let summary = run(&config, &mut engine, &mut SeededRandom::new(9)).unwrap();

    assert_eq!(engine.seen, vec![vec!["e2e4".to_string(), "e7e5".to_string()]]);
    assert_eq!(summary.samples, 0);
    assert_eq!(summary.draws, 1);
}

#[test]
fn random_opening_is_eight_to_twelve_plies() {
    let book = OpeningBook::default();
    let supplier = OpeningSupplier::new(&book, 8, 12);
    let mut rng = SeededRandom::new(77);
    for _ in 0..20 {
        let mut engine = Recorder::default();
        let opening = supplier.supply(&mut rng);
        let session = GameRunner::new(&mut engine, &mut rng, 1, MovePolicy::default()).play(opening);
        let plies = engine.seen[0].len();
        assert!((8..=12).contains(&plies), "{plies} opening plies");
        assert_eq!(session.opening_plies, plies);
        assert_eq!(session.termination, Some(Termination::NoMoves));
    }
}

#[test]
fn games_respect_ply_cap_and_share_one_label() {
    let book = OpeningBook::default();
    let supplier = OpeningSupplier::new(&book, 8, 12);
    for seed in 0..12u64 {
        let mut rng = SeededRandom::new(seed);
        let mut engine = RandomMover(SeededRandom::new(seed ^ 0xABCD));
        let opening = supplier.supply(&mut rng);
        let session = GameRunner::new(&mut engine, &mut rng, 1, MovePolicy::default()).play(opening);

        assert!(session.samples.len() <= MAX_GAME_PLIES);
        if session.termination == Some(Termination::PlyCap) {
            assert_eq!(session.samples.len(), MAX_GAME_PLIES);
            assert_eq!(session.outcome, GameOutcome::Draw);
        }
        let label = session.outcome.label();
        assert!(session.samples.iter().all(|s| s.result == label), "mixed labels in game {seed}");
        // sides alternate ply by ply
        for w in session.samples.windows(2) { assert_ne!(w[0].side, w[1].side); }
    }
}

#[test]
fn checkmate_on_the_board_is_scored_for_the_mating_side() {
    // Fool's mate: after 1.f3 e5 2.g4 Qh4# White has no moves.
    let book = OpeningBook::parse("f3 e5 g4 Qh4#");
    let supplier = OpeningSupplier::new(&book, 8, 12);
    let mut rng = SeededRandom::new(1);
    let opening = supplier.supply(&mut rng);
    assert_eq!(opening.plies, 4);
    let mut engine = RandomMover(SeededRandom::new(2));
    let session = GameRunner::new(&mut engine, &mut rng, 1, MovePolicy::default()).play(opening);
    assert_eq!(session.outcome, GameOutcome::Win(cozy_chess::Color::Black));
    assert_eq!(session.termination, Some(Termination::NoMoves));
    assert!(session.samples.is_empty());
}

#[test]
fn repeated_runs_append_to_the_same_file() {
    let out = fresh("target/selfplay_test/append.binpack");
    let config = DatagenConfig::from_options(&format!("games 2 progress off out {out}"));
    let first = run(&config, &mut MateInOne, &mut SeededRandom::new(1)).unwrap();
    let second = run(&config, &mut MateInOne, &mut SeededRandom::new(2)).unwrap();
    assert_eq!(first.bytes, 2 * PACKED_RECORD_SIZE as u64);
    assert_eq!(second.bytes, 4 * PACKED_RECORD_SIZE as u64);
    assert!(Path::new(&out).exists());
}

#[test]
fn mated_mover_credits_the_opponent() {
    let mut rng = SeededRandom::new(3);
    let session = GameRunner::new(&mut Mated, &mut rng, 1, MovePolicy::default()).play(startpos_opening());
    assert_eq!(session.outcome, GameOutcome::Win(cozy_chess::Color::Black));
    assert_eq!(session.termination, Some(Termination::DecisiveScore));
    assert_eq!(session.samples.len(), 1);
    assert_eq!(session.samples[0].result, -1);
}

#[test]
fn repetition_ends_the_game_as_a_draw() {
    let mut rng = SeededRandom::new(3);
    let session = GameRunner::new(&mut KnightShuffle, &mut rng, 1, MovePolicy::default()).play(startpos_opening());
    assert_eq!(session.outcome, GameOutcome::Draw);
    assert_eq!(session.termination, Some(Termination::Adjudicated(DrawReason::Repetition)));
    assert_eq!(session.samples.len(), 8);
    assert!(session.samples.iter().all(|s| s.result == 0));
}

#[test]
fn illegal_engine_move_is_reported_separately() {
    let mut rng = SeededRandom::new(3);
    let session = GameRunner::new(&mut Illegal, &mut rng, 1, MovePolicy::default()).play(startpos_opening());
    assert_eq!(session.outcome, GameOutcome::Draw);
    assert_eq!(session.termination, Some(Termination::IllegalEngineMove));
    assert!(session.samples.is_empty());
}

#[test]
fn records_reach_disk_on_the_flush_cadence() {
    let rec = PACKED_RECORD_SIZE as u64;

    let out = fresh("target/selfplay_test/flush_each.binpack");
    let config = DatagenConfig::from_options(&format!("games 3 flush 1 progress off out {out}"));
    let mut engine = DiskWatcher { out: out.clone(), sizes: Vec::new() };
    run(&config, &mut engine, &mut SeededRandom::new(6)).unwrap();
    assert_eq!(engine.sizes, vec![0, rec, 2 * rec]);

    let out = fresh("target/selfplay_test/flush_pairs.binpack");
    let config = DatagenConfig::from_options(&format!("games 4 flush 2 progress off out {out}"));
    let mut engine = DiskWatcher { out: out.clone(), sizes: Vec::new() };
    let summary = run(&config, &mut engine, &mut SeededRandom::new(6)).unwrap();
    assert_eq!(engine.sizes, vec![0, 0, 2 * rec, 2 * rec]);
    assert_eq!(std::fs::metadata(&out).unwrap().len(), summary.bytes);
    assert_eq!(summary.samples, 4);
}
