//! Live game state built on the core simulation types.
//!
//! - [`GameField`] - board, falling piece, piece supply and statistics
//! - [`GameStats`] - score, cleared lines and placed pieces
//! - [`PieceGenerator`] - uniform or 7-bag piece supply with a preview queue
//! - [`PieceSeed`] - seed for deterministic piece generation
//!
//! # Game Flow
//!
//! 1. Create a [`GameField`] with board dimensions and a [`PieceGenerator`]
//! 2. Move or rotate the falling piece, or [`GameField::place`] it directly at a
//!    `(rotation, column)` chosen by a search
//! 3. [`GameField::hard_drop`] locks it, clears rows and spawns the next piece
//! 4. Repeat until the new piece collides at spawn (top-out)
//!
//! # Example
//!
//! ```
//! use blockdrop_engine::{GameField, PieceGenerator, PieceRule};
//!
//! let mut field = GameField::new(20, 10, PieceGenerator::new(PieceRule::Uniform));
//!
//! field.try_move_left().ok();
//! field.try_rotate().ok();
//!
//! let (clear, result) = field.hard_drop();
//! assert_eq!(clear.count, 0);
//! assert!(result.is_ok());
//! assert_eq!(field.stats().completed_pieces(), 1);
//! ```

pub use self::{game_field::*, game_stats::*, piece_generator::*};

mod game_field;
mod game_stats;
mod piece_generator;
