//! Material evaluation and one-ply move suggestion

use serde::{Deserialize, Serialize};
use shakmaty::{Color, Role};

use crate::oracle::LegalityOracle;

/// Material weights. The king carries none.
pub const PIECE_VALUES: [(Role, i32); 5] = [
    (Role::Pawn, 1),
    (Role::Knight, 3),
    (Role::Bishop, 3),
    (Role::Rook, 5),
    (Role::Queen, 9),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// White material minus black material.
    pub score: i32,
    pub evaluation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub best_move: Option<String>,
    pub evaluation: Option<i32>,
    pub message: String,
}

pub fn material_score<O: LegalityOracle>(oracle: &O) -> i32 {
    PIECE_VALUES
        .iter()
        .map(|&(role, value)| {
            let white = oracle.count(Color::White, role) as i32;
            let black = oracle.count(Color::Black, role) as i32;
            (white - black) * value
        })
        .sum()
}

pub fn evaluate<O: LegalityOracle>(oracle: &O) -> Evaluation {
    let score = material_score(oracle);

    let evaluation = if score > 0 {
        format!("White is better (+{})", score)
    } else if score < 0 {
        format!("Black is better ({})", score)
    } else {
        "Position is equal (0.0)".to_string()
    };

    Evaluation { score, evaluation }
}

/// Tries every legal move one ply deep and keeps the one with the best
/// material score for the side to move. Ties go to the earliest move in the
/// oracle's enumeration order.
///
/// Every move is pushed and popped again, so the oracle ends where it started.
pub fn suggest_best_move<O: LegalityOracle>(oracle: &mut O) -> Suggestion {
    let maximizing = oracle.turn() == Color::White;
    let mut best: Option<(String, i32)> = None;

    for mv in oracle.legal_moves() {
        if oracle.push(&mv).is_err() {
            continue;
        }
        let score = material_score(oracle);
        oracle.pop();

        let improves = match &best {
            None => true,
            Some((_, best_score)) if maximizing => score > *best_score,
            Some((_, best_score)) => score < *best_score,
        };

        if improves {
            best = Some((mv.to_string(), score));
        }
    }

    match best {
        Some((uci, score)) => Suggestion {
            message: format!("Suggested move: {}", uci),
            best_move: Some(uci),
            evaluation: Some(score),
        },
        None => Suggestion {
            best_move: None,
            evaluation: None,
            message: "No legal moves available".to_string(),
        },
    }
}
