//! Board and piece simulation for a falling-block puzzle game.
//!
//! - [`core`] - occupancy grid ([`Board`]), piece shapes and rotations ([`PieceKind`],
//!   [`ActivePiece`]), line clears, and the side-effect-free [`simulator`]
//! - [`engine`] - a live game driver: piece supply ([`PieceGenerator`]), the playing
//!   field ([`GameField`]) and statistics ([`GameStats`])
//!
//! Placement search and board evaluation live in the `blockdrop-evaluator` crate.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding when setting falling piece")]
pub struct PieceCollisionError;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum CompletePieceDropError {
    #[display("new piece collides at spawn position")]
    NewPieceCollision,
    #[display("game is already over")]
    GameOver,
}
