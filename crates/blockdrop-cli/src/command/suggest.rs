use std::path::PathBuf;

use blockdrop_engine::{Board, PieceKind};
use blockdrop_evaluator::{
    placement_evaluator::HeuristicEvaluator, placement_search::PlacementSearch,
};

use crate::{config::GameConfig, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SuggestArg {
    /// Board JSON file: an array of row strings, `.` empty and `#` occupied
    #[arg(long)]
    board: PathBuf,
    /// Piece to place
    #[arg(long, value_parser = util::parse_piece_kind)]
    piece: PieceKind,
    /// Next piece, used when lookahead is enabled
    #[arg(long, value_parser = util::parse_piece_kind)]
    next: Option<PieceKind>,
    /// Config file (JSON); only the weights and search options are used
    #[arg(long)]
    config: Option<PathBuf>,
    /// Enable the one-piece lookahead regardless of the config
    #[arg(long)]
    lookahead: bool,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SuggestArg) -> anyhow::Result<()> {
    let SuggestArg {
        board,
        piece,
        next,
        config,
        lookahead,
        output,
    } = arg;

    let mut config = GameConfig::load(config.as_deref())?;
    config.search.lookahead |= *lookahead;
    let board: Board = util::read_json_file("board", board)?;

    let search = PlacementSearch::new(
        Box::new(HeuristicEvaluator::new(config.weights)),
        config.search,
    );
    let placement = search.best_placement(&board, *piece, *next)?;
    eprintln!(
        "{piece:?}: rotation {} column {} row {} (score {:.3})",
        placement.rotation.index(),
        placement.column,
        placement.row,
        placement.score
    );

    util::save_json(&placement, output.as_deref())
}
