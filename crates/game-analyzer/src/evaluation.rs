//! Sampled per-phase evaluation of a single game.

use std::future::Future;

use chess_core::game_data::PlayerColor;
use chess_core::sampling::{build_sample_set, partition_by_phase, SampleTargets};
use serde::{Deserialize, Serialize};
use shakmaty::san::{San, SanPlus};
use shakmaty::{Chess, Move, Position};
use tracing::{debug, warn};

use crate::error::AnalyzerError;

/// Something that can score a position.
pub trait Evaluator {
    /// White-relative centipawn score of `position`. `Ok(None)` means the
    /// search finished without reporting a score.
    fn evaluate(
        &mut self,
        position: &Chess,
    ) -> impl Future<Output = Result<Option<i32>, AnalyzerError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedMove {
    /// 1-based position of the move in the game's move list
    pub move_number: usize,
    /// SAN with check suffix
    pub notation: String,
    /// Centipawns from the requesting player's point of view
    pub evaluation: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvaluation {
    pub opening: Vec<EvaluatedMove>,
    pub middlegame: Vec<EvaluatedMove>,
    pub endgame: Vec<EvaluatedMove>,
}

impl GameEvaluation {
    /// Group evaluated moves into thirds of the evaluated list itself.
    pub fn from_evaluated(evaluated: Vec<EvaluatedMove>) -> Self {
        let (opening, middlegame, endgame) = partition_by_phase(evaluated);
        Self { opening, middlegame, endgame }
    }

    /// Concatenate each phase across several games.
    pub fn merged<'a>(games: impl IntoIterator<Item = &'a GameEvaluation>) -> Self {
        let mut merged = Self::default();
        for game in games {
            merged.opening.extend(game.opening.iter().cloned());
            merged.middlegame.extend(game.middlegame.iter().cloned());
            merged.endgame.extend(game.endgame.iter().cloned());
        }
        merged
    }

    pub fn is_empty(&self) -> bool {
        self.opening.is_empty() && self.middlegame.is_empty() && self.endgame.is_empty()
    }

    pub fn len(&self) -> usize {
        self.opening.len() + self.middlegame.len() + self.endgame.len()
    }
}

/// Flip a white-relative score to `perspective`.
pub fn normalize_score(score: i32, perspective: Option<PlayerColor>) -> i32 {
    match perspective {
        Some(PlayerColor::Black) => -score,
        _ => score,
    }
}

/// Resolve a SAN token against the current position.
fn resolve_move(pos: &Chess, index: usize, token: &str) -> Result<Move, AnalyzerError> {
    let san: SanPlus = token.parse().map_err(|_| AnalyzerError::Notation {
        index,
        san: token.to_string(),
    })?;
    let san: San = san.san;
    san.to_move(pos).map_err(|_| AnalyzerError::IllegalMove {
        index,
        san: token.to_string(),
    })
}

/// Evaluate a sampled subset of `moves`.
///
/// The sample set is fixed from the full move count before walking. Every
/// playable move advances the board; tokens that are unreadable or illegal
/// in the current position are skipped. Evaluator failures drop only the
/// affected sample. The surviving entries are split into thirds of their
/// own count, not of the move list.
pub async fn evaluate_game<E: Evaluator>(
    moves: &[String],
    evaluator: &mut E,
    targets: &SampleTargets,
    perspective: Option<PlayerColor>,
) -> GameEvaluation {
    let samples = build_sample_set(moves.len(), targets);
    let mut pos = Chess::default();
    let mut evaluated = Vec::with_capacity(samples.len());

    for (index, token) in moves.iter().enumerate() {
        let mv = match resolve_move(&pos, index, token) {
            Ok(mv) => mv,
            Err(e) => {
                debug!(error = %e, "Skipping move");
                continue;
            }
        };
        let notation = SanPlus::from_move_and_play_unchecked(&mut pos, mv).to_string();

        if !samples.contains(&index) {
            continue;
        }

        match evaluator.evaluate(&pos).await {
            Ok(score) => evaluated.push(EvaluatedMove {
                move_number: index + 1,
                notation,
                evaluation: score.map(|s| normalize_score(s, perspective)),
            }),
            Err(e) => {
                warn!(index, notation = %notation, error = %e, "Dropping sample");
            }
        }
    }

    GameEvaluation::from_evaluated(evaluated)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use shakmaty::fen::Fen;
    use shakmaty::EnPassantMode;

    /// Replays canned answers and records the FEN of every position it sees.
    #[derive(Default)]
    struct ScriptedEvaluator {
        answers: VecDeque<Result<Option<i32>, ()>>,
        fallback: Option<i32>,
        seen: Vec<String>,
    }

    impl ScriptedEvaluator {
        fn constant(score: i32) -> Self {
            Self { fallback: Some(score), ..Default::default() }
        }

        fn failing() -> Self {
            Self::default()
        }
    }

    impl Evaluator for ScriptedEvaluator {
        async fn evaluate(&mut self, position: &Chess) -> Result<Option<i32>, AnalyzerError> {
            self.seen
                .push(Fen::from_position(position, EnPassantMode::Legal).to_string());
            match self.answers.pop_front() {
                Some(Ok(score)) => Ok(score),
                Some(Err(())) => Err(AnalyzerError::Timeout(std::time::Duration::from_secs(1))),
                None => self
                    .fallback
                    .map(Some)
                    .ok_or_else(|| AnalyzerError::Stockfish("engine gone".into())),
            }
        }
    }

    fn moves(sans: &[&str]) -> Vec<String> {
        sans.iter().map(|s| s.to_string()).collect()
    }

    fn numbers(list: &[EvaluatedMove]) -> Vec<usize> {
        list.iter().map(|m| m.move_number).collect()
    }

    const RUY_LOPEZ: [&str; 12] = [
        "e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Ba4", "Nf6", "O-O", "Be7", "Re1", "b5",
    ];

    #[tokio::test]
    async fn test_short_game_evaluates_every_move() {
        // 12 moves: three windows of 4, each stride 1
        let game = moves(&RUY_LOPEZ);
        let mut evaluator = ScriptedEvaluator::constant(25);
        let result = evaluate_game(&game, &mut evaluator, &SampleTargets::default(), None).await;

        assert_eq!(evaluator.seen.len(), 12);
        assert_eq!(result.len(), 12);
        assert_eq!(numbers(&result.opening), vec![1, 2, 3, 4]);
        assert_eq!(numbers(&result.middlegame), vec![5, 6, 7, 8]);
        assert_eq!(numbers(&result.endgame), vec![9, 10, 11, 12]);
        assert_eq!(result.opening[0].notation, "e4");
        assert_eq!(result.middlegame[0].notation, "Bb5");
        assert_eq!(result.endgame[0].notation, "O-O");
        assert!(result.opening.iter().all(|m| m.evaluation == Some(25)));
    }

    #[tokio::test]
    async fn test_output_phases_follow_evaluated_count() {
        // 30 moves of knight shuffling; 13 samples -> output thirds of 13 (4/4/5)
        let cycle = ["Nf3", "Nf6", "Ng1", "Ng8"];
        let game: Vec<String> = (0..30).map(|i| cycle[i % 4].to_string()).collect();
        let mut evaluator = ScriptedEvaluator::constant(0);
        let result = evaluate_game(&game, &mut evaluator, &SampleTargets::default(), None).await;

        assert_eq!(numbers(&result.opening), vec![1, 4, 7, 10]);
        assert_eq!(numbers(&result.middlegame), vec![11, 13, 15, 17]);
        assert_eq!(numbers(&result.endgame), vec![19, 21, 24, 27, 30]);
    }

    #[tokio::test]
    async fn test_black_perspective_negates() {
        let game = moves(&["e4", "e5", "Nf3"]);

        let mut white = ScriptedEvaluator::constant(40);
        let as_white =
            evaluate_game(&game, &mut white, &SampleTargets::default(), Some(PlayerColor::White))
                .await;
        let mut black = ScriptedEvaluator::constant(40);
        let as_black =
            evaluate_game(&game, &mut black, &SampleTargets::default(), Some(PlayerColor::Black))
                .await;

        assert_eq!(as_white.opening[0].evaluation, Some(40));
        assert_eq!(as_black.opening[0].evaluation, Some(-40));
        assert_eq!(normalize_score(-120, Some(PlayerColor::Black)), 120);
        assert_eq!(normalize_score(-120, None), -120);
    }

    #[tokio::test]
    async fn test_illegal_move_is_skipped_and_board_stays_correct() {
        // "Qh5" is not available to Black after 1.e4; the walk carries on with 1...e5
        let game = moves(&["e4", "Qh5", "e5", "Nf3", "Nc6", "Bc4"]);
        let mut evaluator = ScriptedEvaluator::constant(10);
        let result = evaluate_game(&game, &mut evaluator, &SampleTargets::default(), None).await;

        let all: Vec<&str> = [&result.opening, &result.middlegame, &result.endgame]
            .iter()
            .flat_map(|phase| phase.iter().map(|m| m.notation.as_str()))
            .collect();
        assert_eq!(all, vec!["e4", "e5", "Nf3", "Nc6", "Bc4"]);
        assert_eq!(result.len(), 5);
        assert!(!numbers(&result.opening).contains(&2));
        assert_eq!(
            evaluator.seen.last().map(String::as_str),
            Some("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3")
        );
    }

    #[tokio::test]
    async fn test_unreadable_notation_is_skipped() {
        let game = moves(&["e4", "zz9", "e5"]);
        let mut evaluator = ScriptedEvaluator::constant(0);
        let result = evaluate_game(&game, &mut evaluator, &SampleTargets::default(), None).await;
        assert_eq!(result.len(), 2);
        assert_eq!(evaluator.seen.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_samples_are_dropped() {
        let game = moves(&RUY_LOPEZ);
        let mut evaluator = ScriptedEvaluator {
            answers: VecDeque::from(vec![Ok(Some(20)), Err(()), Ok(None), Err(())]),
            fallback: Some(30),
            seen: Vec::new(),
        };
        let result = evaluate_game(&game, &mut evaluator, &SampleTargets::default(), None).await;

        // 12 asked, 2 failed -> 10 entries split 3/3/4
        assert_eq!(evaluator.seen.len(), 12);
        assert_eq!(result.len(), 10);
        assert_eq!(numbers(&result.opening), vec![1, 3, 5]);
        assert_eq!(result.opening[1].evaluation, None);
        assert_eq!(result.endgame.len(), 4);
    }

    #[tokio::test]
    async fn test_all_samples_failing_gives_empty_phases() {
        let game = moves(&RUY_LOPEZ);
        let mut evaluator = ScriptedEvaluator::failing();
        let result = evaluate_game(&game, &mut evaluator, &SampleTargets::default(), None).await;
        assert!(!evaluator.seen.is_empty());
        assert_eq!(result, GameEvaluation::default());
    }

    #[tokio::test]
    async fn test_empty_game() {
        let mut evaluator = ScriptedEvaluator::constant(0);
        let result = evaluate_game(&[], &mut evaluator, &SampleTargets::default(), None).await;
        assert!(result.is_empty());
        assert!(evaluator.seen.is_empty());
    }

    #[test]
    fn test_merged_concatenates_phases() {
        let entry = |n: usize| EvaluatedMove { move_number: n, notation: "e4".into(), evaluation: Some(0) };
        let a = GameEvaluation { opening: vec![entry(1)], middlegame: vec![], endgame: vec![entry(9)] };
        let b = GameEvaluation { opening: vec![entry(2)], middlegame: vec![entry(5)], endgame: vec![] };
        let merged = GameEvaluation::merged([&a, &b]);
        assert_eq!(numbers(&merged.opening), vec![1, 2]);
        assert_eq!(numbers(&merged.middlegame), vec![5]);
        assert_eq!(numbers(&merged.endgame), vec![9]);
    }
}
