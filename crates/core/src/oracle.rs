//! Full-rules legality oracle
//!
//! The game manager never decides legality itself. It asks a
//! [`LegalityOracle`], which owns the position and its undo stack.
//! [`ShakmatyOracle`] is the production implementation.

use std::fmt;
use std::str::FromStr;

use shakmaty::{
    fen::Fen, CastlingMode, Chess, Color, EnPassantMode, File, Move, Piece, Position, Role,
    Square,
};

use crate::error::{Error, Result};
use crate::square::to_coords;

/// A move as the outside world names it: two squares and an optional
/// promotion piece. Displays as UCI (`e2e4`, `e7e8q`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveDescriptor {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl MoveDescriptor {
    pub fn new(from: Square, to: Square, promotion: Option<Role>) -> Self {
        Self { from, to, promotion }
    }

    /// Parses `from` and `to` squares plus an optional promotion letter.
    pub fn parse(from: &str, to: &str, promotion: Option<&str>) -> Result<Self> {
        let from = to_coords(from).map_err(|_| Error::InvalidNotation)?;
        let to = to_coords(to).map_err(|_| Error::InvalidNotation)?;

        let promotion = match promotion {
            None => None,
            Some(p) => Some(parse_promotion(p).ok_or(Error::InvalidNotation)?),
        };

        Ok(Self::new(from.to_square(), to.to_square(), promotion))
    }

    /// Converts a shakmaty move, writing castling as the king's two-square step.
    pub fn from_move(mv: &Move) -> Self {
        match mv {
            Move::Normal { from, to, promotion, .. } => Self::new(*from, *to, *promotion),
            Move::EnPassant { from, to } => Self::new(*from, *to, None),
            Move::Castle { king, rook } => {
                let file = if rook.file() > king.file() { File::G } else { File::C };
                Self::new(*king, Square::from_coords(file, king.rank()), None)
            }
            Move::Put { to, .. } => Self::new(*to, *to, None),
        }
    }
}

fn parse_promotion(s: &str) -> Option<Role> {
    let mut chars = s.chars();
    let role = chars.next().and_then(|c| Role::from_char(c.to_ascii_lowercase()))?;
    if chars.next().is_some() {
        return None;
    }
    match role {
        Role::Queen | Role::Rook | Role::Bishop | Role::Knight => Some(role),
        _ => None,
    }
}

impl fmt::Display for MoveDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

impl FromStr for MoveDescriptor {
    type Err = Error;

    fn from_str(uci: &str) -> Result<Self> {
        let from = uci.get(0..2).ok_or(Error::InvalidNotation)?;
        let to = uci.get(2..4).ok_or(Error::InvalidNotation)?;
        let promotion = uci.get(4..).filter(|rest| !rest.is_empty());
        Self::parse(from, to, promotion)
    }
}

/// Everything the game manager needs from a complete chess-rules engine.
pub trait LegalityOracle: Default {
    /// Builds an oracle positioned at `fen` with an empty history.
    fn from_fen(fen: &str) -> Result<Self>;

    fn fen(&self) -> String;

    fn turn(&self) -> Color;

    fn piece_at(&self, square: Square) -> Option<Piece>;

    /// Legal moves in a stable, deterministic order.
    fn legal_moves(&self) -> Vec<MoveDescriptor>;

    fn is_legal(&self, mv: &MoveDescriptor) -> bool {
        self.legal_moves().contains(mv)
    }

    /// Applies a legal move. Fails with [`Error::IllegalMove`] and leaves the
    /// position untouched otherwise.
    fn push(&mut self, mv: &MoveDescriptor) -> Result<()>;

    /// Reverts the last applied move.
    fn pop(&mut self) -> Option<MoveDescriptor>;

    /// Moves applied since construction or the last reset, oldest first.
    fn history(&self) -> Vec<MoveDescriptor>;

    /// Returns to the standard initial position and clears history.
    fn reset(&mut self);

    fn is_check(&self) -> bool;

    fn is_checkmate(&self) -> bool;

    fn is_stalemate(&self) -> bool;

    fn is_insufficient_material(&self) -> bool;

    /// Number of `color` pieces of kind `role` on the board.
    fn count(&self, color: Color, role: Role) -> u32;
}

#[derive(Debug, Clone, Default)]
pub struct ShakmatyOracle {
    position: Chess,
    /// Position before each applied move, paired with that move.
    stack: Vec<(Chess, MoveDescriptor)>,
}

impl ShakmatyOracle {
    pub fn position(&self) -> &Chess {
        &self.position
    }

    fn find_move(&self, mv: &MoveDescriptor) -> Option<Move> {
        self.position
            .legal_moves()
            .into_iter()
            .find(|m| MoveDescriptor::from_move(m) == *mv)
    }
}

impl LegalityOracle for ShakmatyOracle {
    fn from_fen(fen: &str) -> Result<Self> {
        let fen: Fen = fen
            .trim()
            .parse()
            .map_err(|e| Error::InvalidFen(format!("{}", e)))?;
        let position: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| Error::InvalidFen(format!("{}", e)))?;
        Ok(Self {
            position,
            stack: Vec::new(),
        })
    }

    fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }

    fn turn(&self) -> Color {
        self.position.turn()
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    fn legal_moves(&self) -> Vec<MoveDescriptor> {
        self.position
            .legal_moves()
            .iter()
            .map(MoveDescriptor::from_move)
            .collect()
    }

    fn is_legal(&self, mv: &MoveDescriptor) -> bool {
        self.find_move(mv).is_some()
    }

    fn push(&mut self, mv: &MoveDescriptor) -> Result<()> {
        let m = self.find_move(mv).ok_or(Error::IllegalMove)?;
        let next = self
            .position
            .clone()
            .play(m)
            .map_err(|_| Error::IllegalMove)?;
        let previous = std::mem::replace(&mut self.position, next);
        self.stack.push((previous, *mv));
        Ok(())
    }

    fn pop(&mut self) -> Option<MoveDescriptor> {
        let (previous, mv) = self.stack.pop()?;
        self.position = previous;
        Some(mv)
    }

    fn history(&self) -> Vec<MoveDescriptor> {
        self.stack.iter().map(|(_, mv)| *mv).collect()
    }

    fn reset(&mut self) {
        self.position = Chess::default();
        self.stack.clear();
    }

    fn is_check(&self) -> bool {
        self.position.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    fn is_insufficient_material(&self) -> bool {
        self.position.is_insufficient_material()
    }

    fn count(&self, color: Color, role: Role) -> u32 {
        self.position.board().by_piece(Piece { color, role }).count() as u32
    }
}
