//! PGN parse/render collaborator, built on `pgn_reader::Visitor` the same
//! way the teacher's opening-book builder streams games out of a PGN file.

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};
use shakmaty::{Chess, Position as _};

use crate::error::{AnnotatorError, Result};

#[derive(Debug, Clone, Default)]
pub struct Game {
    pub headers: BTreeMap<String, String>,
    /// SAN text of each played move, in order.
    pub moves: Vec<String>,
    /// UCI text of each played move, in order, parallel to `moves`.
    pub moves_uci: Vec<String>,
}

impl Game {
    pub fn white(&self) -> Option<&str> {
        self.headers.get("White").map(String::as_str)
    }

    pub fn black(&self) -> Option<&str> {
        self.headers.get("Black").map(String::as_str)
    }
}

struct GameCollector {
    games: Vec<Game>,
    current: Game,
    board: Chess,
}

impl GameCollector {
    fn new() -> Self {
        Self {
            games: Vec::new(),
            current: Game::default(),
            board: Chess::default(),
        }
    }
}

impl Visitor for GameCollector {
    type Tags = ();
    type Movetext = ();
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        self.current = Game::default();
        self.board = Chess::default();
        ControlFlow::Continue(())
    }

    fn tag(&mut self, _tags: &mut Self::Tags, name: &[u8], value: RawTag<'_>) -> ControlFlow<Self::Output> {
        let name = String::from_utf8_lossy(name).to_string();
        let value = value.decode_utf8_lossy().to_string();
        self.current.headers.insert(name, value);
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(())
    }

    fn san(&mut self, _movetext: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        if let Ok(m) = san_plus.san.to_move(&self.board) {
            let uci = shakmaty::uci::UciMove::from_standard(m).to_string();
            self.current.moves.push(san_plus.san.to_string());
            self.current.moves_uci.push(uci);
            self.board.play_unchecked(m);
        }
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _movetext: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        // Sub-variations in the source PGN are not part of the annotated
        // game tree this crate builds (it builds its own via exploration).
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, _movetext: Self::Movetext) -> Self::Output {
        self.games.push(std::mem::take(&mut self.current));
    }
}

/// Parses one or more PGN games from `text`.
pub fn parse(text: &str) -> Result<Vec<Game>> {
    let mut collector = GameCollector::new();
    let mut reader = Reader::new(text.as_bytes());
    loop {
        match reader.read_game(&mut collector) {
            Ok(Some(())) => continue,
            Ok(None) => break,
            Err(e) => return Err(AnnotatorError::ValidationError(format!("PGN parse error: {e}"))),
        }
    }
    if collector.games.is_empty() {
        return Err(AnnotatorError::ValidationError("no games found in PGN text".to_string()));
    }
    Ok(collector.games)
}

/// Renders a game (optionally with inline `{comment}` text and `$n` NAGs per
/// ply, supplied by the caller as parallel vectors) back to PGN movetext.
pub struct AnnotatedMove {
    pub san: String,
    pub nags: Vec<u8>,
    pub comment: Option<String>,
}

pub fn render(headers: &BTreeMap<String, String>, moves: &[AnnotatedMove]) -> String {
    let mut out = String::new();
    for (key, value) in headers {
        out.push_str(&format!("[{key} \"{value}\"]\n"));
    }
    out.push('\n');

    let mut fullmove = 1u32;
    for (i, mv) in moves.iter().enumerate() {
        if i % 2 == 0 {
            out.push_str(&format!("{fullmove}. "));
        }
        out.push_str(&mv.san);
        for nag in &mv.nags {
            out.push_str(&format!(" ${nag}"));
        }
        if let Some(comment) = &mv.comment {
            out.push_str(&format!(" {{{comment}}}"));
        }
        out.push(' ');
        if i % 2 == 1 {
            fullmove += 1;
        }
    }
    out.push_str("*\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "[Event \"Test\"]\n[White \"A\"]\n[Black \"B\"]\n\n1. e4 e5 2. Nf3 Nc6 *\n";

    #[test]
    fn parses_headers_and_moves() {
        let games = parse(SAMPLE).unwrap();
        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert_eq!(game.white(), Some("A"));
        assert_eq!(game.moves, vec!["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(game.moves_uci, vec!["e2e4", "e7e5", "g1f3", "b8c6"]);
    }

    #[test]
    fn rejects_empty_pgn() {
        assert!(parse("").is_err());
    }

    #[test]
    fn renders_moves_with_nags_and_comments() {
        let mut headers = BTreeMap::new();
        headers.insert("Event".to_string(), "Test".to_string());
        let moves = vec![
            AnnotatedMove {
                san: "e4".to_string(),
                nags: vec![1],
                comment: Some("a strong central move".to_string()),
            },
            AnnotatedMove {
                san: "e5".to_string(),
                nags: vec![],
                comment: None,
            },
        ];
        let rendered = render(&headers, &moves);
        assert!(rendered.contains("1. e4 $1 {a strong central move} e5"));
    }
}
