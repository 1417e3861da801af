//! Stockfish engine wrapper using UCI protocol (async I/O)

use std::time::Duration;

use shakmaty::fen::Fen;
use shakmaty::{Chess, Color, EnPassantMode, Position};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::AnalyzerError;
use crate::evaluation::Evaluator;

/// Score reported for mate in 0; mate in N is pulled toward zero by 10 per move.
pub const MATE_SCORE: i32 = 10_000;

/// Extra time allowed on top of the search budget before giving up on a position.
const SEARCH_GRACE: Duration = Duration::from_secs(2);

/// How long `quit` waits for the process to exit before killing it.
const QUIT_GRACE: Duration = Duration::from_secs(1);

/// Result of a single position evaluation
#[derive(Debug, Clone, Default)]
pub struct EvalResult {
    /// Centipawn score (from engine's perspective, i.e., side to move)
    pub cp: Option<i32>,
    /// Mate in N moves (positive = side to move mates, negative = gets mated)
    pub mate: Option<i32>,
    /// Best move in UCI notation
    pub best_move: String,
    /// Depth of the last scored info line
    pub depth: Option<u32>,
}

impl EvalResult {
    /// Score from White's point of view, or `None` if the engine never sent one.
    pub fn white_score(&self, white_to_move: bool) -> Option<i32> {
        let score = if let Some(m) = self.mate {
            if m > 0 {
                MATE_SCORE - m * 10
            } else {
                -MATE_SCORE - m * 10
            }
        } else {
            self.cp?
        };
        Some(if white_to_move { score } else { -score })
    }
}

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    depth: u32,
    time_budget: Duration,
    grace: Duration,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(config: &EngineConfig) -> Result<Self, AnalyzerError> {
        let mut process = Command::new(&config.stockfish_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AnalyzerError::Stockfish(format!("Failed to spawn Stockfish: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| AnalyzerError::Stockfish("Stockfish stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| AnalyzerError::Stockfish("Stockfish stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            depth: config.depth,
            time_budget: config.time_budget,
            grace: SEARCH_GRACE,
        };

        engine.send("uci").await?;
        engine.wait_for("uciok").await?;

        engine
            .send(&format!("setoption name Threads value {}", config.threads))
            .await?;
        engine
            .send(&format!("setoption name Hash value {}", config.hash_mb))
            .await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        Ok(engine)
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), AnalyzerError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| AnalyzerError::Stockfish(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| AnalyzerError::Stockfish(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Read one trimmed line; EOF means the process is gone.
    ///
    /// Cancel safe: a line interrupted by a timeout is returned by the next call.
    async fn read_line(&mut self) -> Result<String, AnalyzerError> {
        let line = self
            .stdout
            .next_line()
            .await
            .map_err(|e| AnalyzerError::Stockfish(format!("Failed to read from Stockfish: {e}")))?
            .ok_or_else(|| AnalyzerError::Stockfish("Stockfish closed its output".into()))?;
        let trimmed = line.trim().to_string();
        debug!(line = %trimmed, "SF >");
        Ok(trimmed)
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), AnalyzerError> {
        loop {
            if self.read_line().await? == expected {
                return Ok(());
            }
        }
    }

    fn go_command(&self) -> String {
        if self.time_budget.is_zero() {
            format!("go depth {}", self.depth)
        } else {
            format!(
                "go depth {} movetime {}",
                self.depth,
                self.time_budget.as_millis()
            )
        }
    }

    /// Evaluate a position given as FEN. Scores are side-to-move relative.
    ///
    /// With a time budget the search is stopped once it overruns the budget
    /// plus a grace period. Depth-only searches run until the engine answers.
    pub async fn evaluate_fen(&mut self, fen: &str) -> Result<EvalResult, AnalyzerError> {
        self.send(&format!("position fen {fen}")).await?;
        let go = self.go_command();
        self.send(&go).await?;

        if self.time_budget.is_zero() {
            return self.read_search().await;
        }

        let limit = self.time_budget + self.grace;
        match tokio::time::timeout(limit, self.read_search()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(fen, ?limit, "Search overran its budget, stopping");
                self.send("stop").await?;
                tokio::time::timeout(self.grace, self.read_search())
                    .await
                    .map_err(|_| {
                        AnalyzerError::Stockfish("Stockfish unresponsive after stop".into())
                    })??;
                Err(AnalyzerError::Timeout(limit))
            }
        }
    }

    /// Collect info lines until `bestmove`; the last scored line wins.
    async fn read_search(&mut self) -> Result<EvalResult, AnalyzerError> {
        let mut result = EvalResult::default();
        loop {
            let line = self.read_line().await?;
            if line.starts_with("info") && line.contains(" score ") {
                if let Some(cp) = parse_cp(&line) {
                    result.cp = Some(cp);
                    result.mate = None;
                }
                if let Some(mate) = parse_mate(&line) {
                    result.mate = Some(mate);
                    result.cp = None;
                }
                if let Some(depth) = parse_depth(&line) {
                    result.depth = Some(depth);
                }
            } else if line.starts_with("bestmove") {
                if let Some(best) = line.split_whitespace().nth(1) {
                    result.best_move = best.to_string();
                }
                return Ok(result);
            }
        }
    }

    /// Send quit command and wait for process to exit, killing it if it lingers
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        if tokio::time::timeout(QUIT_GRACE, self.process.wait()).await.is_err() {
            warn!("Stockfish ignored quit, killing it");
            let _ = self.process.start_kill();
            let _ = self.process.wait().await;
        }
    }
}

impl Evaluator for StockfishEngine {
    async fn evaluate(&mut self, position: &Chess) -> Result<Option<i32>, AnalyzerError> {
        let fen = Fen::from_position(position, EnPassantMode::Legal).to_string();
        let result = self.evaluate_fen(&fen).await?;
        debug!(depth = ?result.depth, best_move = %result.best_move, "Position evaluated");
        Ok(result.white_score(position.turn() == Color::White))
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

/// Value following `keyword` in a whitespace-separated UCI line
fn parse_after<T: std::str::FromStr>(line: &str, keyword: &str) -> Option<T> {
    let mut parts = line.split_whitespace();
    parts.find(|part| *part == keyword)?;
    parts.next()?.parse().ok()
}

/// Parse centipawn score from info line
fn parse_cp(line: &str) -> Option<i32> {
    parse_after(line, "cp")
}

/// Parse mate score from info line
fn parse_mate(line: &str) -> Option<i32> {
    parse_after(line, "mate")
}

fn parse_depth(line: &str) -> Option<u32> {
    parse_after(line, "depth")
}
