//! Algebraic square notation to board coordinates

use shakmaty::{File, Rank, Square};

use crate::error::{Error, Result};

/// Zero-based file/rank pair. `a1` is `(0, 0)`, `h8` is `(7, 7)`.
///
/// Only built by [`to_coords`] or [`Coords::from_square`], so both values
/// are always on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coords {
    file: u8,
    rank: u8,
}

impl Coords {
    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn to_square(self) -> Square {
        Square::from_coords(File::new(u32::from(self.file)), Rank::new(u32::from(self.rank)))
    }

    pub fn from_square(square: Square) -> Self {
        let name = square.to_string();
        let bytes = name.as_bytes();
        Self {
            file: bytes[0] - b'a',
            rank: bytes[1] - b'1',
        }
    }
}

/// Converts a square such as `"e2"` into zero-based coordinates.
///
/// Anything other than a lower-case file `a`-`h` followed by a rank digit
/// `1`-`8` fails with [`Error::InvalidSquare`].
pub fn to_coords(square: &str) -> Result<Coords> {
    match square.as_bytes() {
        [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Ok(Coords {
            file: file - b'a',
            rank: rank - b'1',
        }),
        _ => Err(Error::InvalidSquare(square.to_string())),
    }
}
