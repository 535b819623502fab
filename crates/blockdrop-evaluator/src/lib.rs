//! Board evaluation and placement search for the falling-block game.
//!
//! The crate is organized in three levels:
//!
//! 1. **Board Metrics** ([`board_metrics`]) - aggregate height, completed lines, holes and
//!    bumpiness of a board
//! 2. **Placement Evaluation** ([`placement_evaluator`]) - scores a candidate board as a
//!    weighted sum of its metrics ([`weights`])
//! 3. **Placement Search** ([`placement_search`]) - simulates every legal placement of the
//!    current piece, optionally looks one piece ahead, and returns the best one
//!
//! [`auto_player`] drives a [`blockdrop_engine::GameField`] with the search until the game
//! ends.
//!
//! # Architecture
//!
//! ```text
//! AutoPlayer (play a game)
//!     ↓ uses
//! PlacementSearch (select best placement)
//!     ↓ uses
//! PlacementEvaluator (score single board)
//!     ↓ uses
//! BoardMetrics (measure board)
//! ```
//!
//! # Features
//!
//! - `parallel` (default): score candidates with rayon when
//!   [`SearchConfig::parallel`](placement_search::SearchConfig::parallel) is set.

pub mod auto_player;
pub mod board_metrics;
pub mod placement_evaluator;
pub mod placement_search;
pub mod weights;
