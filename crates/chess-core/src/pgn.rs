//! PGN move source built on `pgn-reader`.
//!
//! Yields the SAN tokens of the mainline in order, plus the player names
//! needed to work out which side the requesting user played. Variations of
//! any depth are skipped. Legality is not checked here.

use std::io;
use std::ops::ControlFlow;

use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};

use crate::game_data::{GameData, GameMetadata};

const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Default)]
struct GameTags {
    white: Option<String>,
    black: Option<String>,
    result: Option<String>,
    setup: bool,
    fen: Option<String>,
}

struct Mainline {
    metadata: GameMetadata,
    moves: Vec<String>,
}

/// Collects the mainline of the first game in the input.
struct MainlineCollector;

impl Visitor for MainlineCollector {
    type Tags = GameTags;
    type Movetext = Mainline;
    type Output = Option<GameData>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, GameTags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut GameTags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let value = value.decode_utf8_lossy().into_owned();
        match name {
            b"White" => tags.white = Some(value),
            b"Black" => tags.black = Some(value),
            b"Result" => tags.result = Some(value),
            b"SetUp" => tags.setup = value == "1",
            b"FEN" => tags.fen = Some(value),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: GameTags) -> ControlFlow<Self::Output, Mainline> {
        // Analysis always starts from the initial position
        if tags.setup {
            if let Some(fen) = tags.fen.as_deref() {
                if fen.trim() != STANDARD_START_FEN {
                    return ControlFlow::Break(None);
                }
            }
        }

        ControlFlow::Continue(Mainline {
            metadata: GameMetadata {
                white: tags.white.unwrap_or_else(|| "Unknown".to_string()),
                black: tags.black.unwrap_or_else(|| "Unknown".to_string()),
                result: tags.result.unwrap_or_else(|| "*".to_string()),
            },
            moves: Vec::new(),
        })
    }

    fn san(&mut self, mainline: &mut Mainline, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        mainline.moves.push(san_plus.to_string());
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _mainline: &mut Mainline) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, mainline: Mainline) -> Self::Output {
        if mainline.moves.is_empty() {
            return None;
        }
        Some(GameData {
            metadata: mainline.metadata,
            moves: mainline.moves,
        })
    }
}

/// Parse the first game of a PGN string.
///
/// Returns `None` when the text has no moves or the game starts from a
/// non-standard position.
pub fn parse_pgn(pgn: &str) -> Option<GameData> {
    let mut reader = Reader::new(io::Cursor::new(pgn.as_bytes()));
    reader
        .read_game(&mut MainlineCollector)
        .ok()
        .flatten()
        .flatten()
}
