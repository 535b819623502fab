use std::path::PathBuf;

use blockdrop_engine::{GameField, PieceGenerator, PieceRule, PieceSeed};
use blockdrop_evaluator::{
    auto_player::AutoPlayer, placement_evaluator::HeuristicEvaluator,
    placement_search::PlacementSearch,
};
use rand::Rng as _;

use crate::{config::GameConfig, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Config file (JSON); command line options override it
    #[arg(long)]
    pub(super) config: Option<PathBuf>,
    /// Number of board rows
    #[arg(long)]
    pub(super) rows: Option<usize>,
    /// Number of board columns
    #[arg(long)]
    pub(super) columns: Option<usize>,
    /// Piece sequence seed as 32 hex characters (random if omitted)
    #[arg(long, value_parser = PieceSeed::from_hex)]
    pub(super) seed: Option<PieceSeed>,
    /// Stop after this many pieces
    #[arg(long)]
    pub(super) max_pieces: Option<usize>,
    /// Search the next piece as well
    #[arg(long)]
    pub(super) lookahead: bool,
    /// Draw pieces from shuffled bags of seven instead of uniformly
    #[arg(long)]
    pub(super) bag7: bool,
    /// Also write the final statistics as JSON to this file
    #[arg(long)]
    pub(super) stats_output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        config,
        rows,
        columns,
        seed,
        max_pieces,
        lookahead,
        bag7,
        stats_output,
    } = arg;

    let mut config = GameConfig::load(config.as_deref())?;
    config.rows = rows.unwrap_or(config.rows);
    config.columns = columns.unwrap_or(config.columns);
    config.search.lookahead |= *lookahead;
    config.validate()?;

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let rule = if *bag7 {
        PieceRule::Bag7
    } else {
        PieceRule::Uniform
    };
    log::info!(
        "{}x{} board, {rule:?} pieces, seed {}, lookahead {}",
        config.rows,
        config.columns,
        seed.to_hex(),
        config.search.lookahead
    );

    let search = PlacementSearch::new(
        Box::new(HeuristicEvaluator::new(config.weights)),
        config.search,
    );
    let player = AutoPlayer::new(search);
    let mut field = GameField::new(
        config.rows,
        config.columns,
        PieceGenerator::with_seed(rule, seed),
    );
    let stats = player.play(&mut field, *max_pieces);

    eprintln!("{}", field.board());
    eprintln!();
    eprintln!("Pieces: {}", stats.completed_pieces());
    eprintln!("Lines:  {}", stats.total_cleared_lines());
    eprintln!("Score:  {}", stats.score());
    let [_, singles, doubles, triples, quads] = *stats.line_cleared_counter();
    eprintln!("Clears: {singles} single, {doubles} double, {triples} triple, {quads} quad");
    eprintln!(
        "Result: {}",
        if field.is_game_over() {
            "game over"
        } else {
            "piece limit reached"
        }
    );

    if let Some(path) = stats_output {
        util::save_json(&stats, Some(path.as_path()))?;
    }
    Ok(())
}
