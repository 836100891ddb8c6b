use crate::board::{DrawReason, Position};
use crate::search::eval::{is_loss, is_win};
use crate::search::{RootMove, SearchEngine};
use crate::selfplay::codec::{self, PositionSample};
use crate::selfplay::label::{self, GameOutcome};
use crate::selfplay::opening::Opening;
use crate::selfplay::rng::RandomSource;

/// Hard cap on recorded plies per game.
pub const MAX_GAME_PLIES: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Opening,
    Playing,
    Terminated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The searched score proved a forced mate.
    DecisiveScore,
    Adjudicated(DrawReason),
    /// The engine had no candidate move to offer.
    NoMoves,
    /// The engine's chosen move was not legal in the position.
    IllegalEngineMove,
    PlyCap,
}

/// One game in flight, discarded once its samples are written.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub position: Position,
    pub phase: GamePhase,
    pub opening_plies: usize,
    pub samples: Vec<PositionSample>,
    pub outcome: GameOutcome,
    pub termination: Option<Termination>,
}

impl GameSession {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            phase: GamePhase::Opening,
            opening_plies: 0,
            samples: Vec::new(),
            outcome: GameOutcome::Undetermined,
            termination: None,
        }
    }

    fn terminate(&mut self, outcome: GameOutcome, termination: Termination) {
        self.outcome = outcome;
        self.termination = Some(termination);
        self.phase = GamePhase::Terminated;
        label::apply(outcome, &mut self.samples);
    }
}

/// Epsilon-greedy choice between the two best candidates.
#[derive(Clone, Copy, Debug)]
pub struct MovePolicy {
    pub epsilon_percent: u32,
    pub volatility_cp: i32,
}

impl Default for MovePolicy {
    fn default() -> Self { Self { epsilon_percent: 10, volatility_cp: 30 } }
}

impl MovePolicy {
    /// Index into `candidates` (best first) of the move to play.
    pub fn select(&self, candidates: &[RootMove], rng: &mut dyn RandomSource) -> usize {
        if candidates.len() > 1 && rng.next_int(100) < self.epsilon_percent as usize {
            let gap = (candidates[0].score - candidates[1].score).abs();
            if gap < self.volatility_cp { return 1; }
        }
        0
    }
}

pub struct GameRunner<'a, E: SearchEngine + ?Sized> {
    engine: &'a mut E,
    rng: &'a mut dyn RandomSource,
    nodes: u64,
    policy: MovePolicy,
}

impl<'a, E: SearchEngine + ?Sized> GameRunner<'a, E> {
    pub fn new(engine: &'a mut E, rng: &'a mut dyn RandomSource, nodes: u64, policy: MovePolicy) -> Self {
        Self { engine, rng, nodes, policy }
    }

    /// Plays a game from `opening` to completion; the returned samples are labelled.
    pub fn play(&mut self, opening: Opening) -> GameSession {
        let mut session = GameSession::new(opening.position);
        session.opening_plies = opening.plies;
        session.phase = GamePhase::Playing;
        self.engine.new_game();

        while session.samples.len() < MAX_GAME_PLIES {
            let pos = &session.position;
            let ranked = self.engine.search(pos, self.nodes);
            if ranked.is_empty() {
                let outcome = if pos.is_checkmate() { GameOutcome::Win(!pos.side_to_move()) } else { GameOutcome::Draw };
                session.terminate(outcome, Termination::NoMoves);
                break;
            }

            let chosen = &ranked[self.policy.select(&ranked, &mut *self.rng)];
            if !pos.board().is_legal(chosen.mv) {
                log::error!("engine proposed illegal move {} in {}", chosen.mv, pos.board());
                session.terminate(GameOutcome::Draw, Termination::IllegalEngineMove);
                break;
            }
            let (board, side) = codec::encode(pos);
            let score = chosen.score;
            session.samples.push(PositionSample {
                board,
                key: pos.key(),
                side,
                score: score.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
                mv: pos.move_code(chosen.mv),
                result: 0,
            });

            let mover = pos.side_to_move();
            let mv = chosen.mv;
            session.position.play(mv);

            if is_win(score) {
                session.terminate(GameOutcome::Win(mover), Termination::DecisiveScore);
                break;
            }
            if is_loss(score) {
                session.terminate(GameOutcome::Win(!mover), Termination::DecisiveScore);
                break;
            }
            if let Some(reason) = session.position.draw_reason() {
                session.terminate(GameOutcome::Draw, Termination::Adjudicated(reason));
                break;
            }
        }
        if session.phase != GamePhase::Terminated {
            session.terminate(GameOutcome::Draw, Termination::PlyCap);
        }
        session
    }
}
