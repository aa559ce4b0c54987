//! Geometric move validation
//!
//! Checks only whether the from/to pair has a shape the piece can move in.
//! Occupancy, blocking pieces, captures of own colour and check safety are
//! left to the legality oracle.

use std::fmt;

use shakmaty::{Color, Role};

use crate::error::{Error, Result};
use crate::square::{to_coords, Coords};

/// A rejected move shape, carrying the human readable rule that was broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeViolation {
    pub reason: &'static str,
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason)
    }
}

impl From<ShapeViolation> for Error {
    fn from(violation: ShapeViolation) -> Self {
        Error::ShapeViolation(violation.reason.to_string())
    }
}

fn reject(reason: &'static str) -> std::result::Result<(), ShapeViolation> {
    Err(ShapeViolation { reason })
}

/// Validates the geometric shape of a move for `role`.
///
/// `side` only matters for pawns, whose forward direction and start rank
/// depend on colour.
pub fn validate_shape(
    role: Role,
    from: Coords,
    to: Coords,
    side: Color,
) -> std::result::Result<(), ShapeViolation> {
    let fx = i32::from(from.file());
    let fy = i32::from(from.rank());
    let tx = i32::from(to.file());
    let ty = i32::from(to.rank());

    let dx = (tx - fx).abs();
    let dy = (ty - fy).abs();

    let straight = dx == 0 || dy == 0;
    let diagonal = dx == dy;

    match role {
        Role::Rook if !straight => reject("Rook moves only horizontally or vertically"),
        Role::Bishop if !diagonal => reject("Bishop moves only diagonally"),
        Role::Queen if !(straight || diagonal) => {
            reject("Queen moves horizontally, vertically, or diagonally")
        }
        Role::Knight if !matches!((dx, dy), (1, 2) | (2, 1)) => {
            reject("Knight moves in an L-shape")
        }
        Role::King if dx > 1 || dy > 1 => reject("King moves only 1 square in any direction"),
        Role::Pawn => {
            let (direction, start_rank) = match side {
                Color::White => (1, 1),
                Color::Black => (-1, 6),
            };

            let single = tx == fx && ty == fy + direction;
            let double = tx == fx && fy == start_rank && ty == fy + 2 * direction;
            let capture = dx == 1 && ty == fy + direction;

            if single || double || capture {
                Ok(())
            } else {
                reject("Pawn move invalid")
            }
        }
        _ => Ok(()),
    }
}

/// Same as [`validate_shape`] but takes squares in algebraic notation.
pub fn validate_shape_str(role: Role, from: &str, to: &str, side: Color) -> Result<()> {
    let from = to_coords(from)?;
    let to = to_coords(to)?;
    validate_shape(role, from, to, side)?;
    Ok(())
}
