use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context as _;
use blockdrop_engine::PieceKind;
use serde::{Serialize, de::DeserializeOwned};

/// Writes `value` as pretty JSON to the file at `path`, or to stdout when `path` is `None`.
pub(crate) fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_json(BufWriter::new(file), value, &path.display().to_string())
        }
        None => write_json(io::stdout().lock(), value, "stdout"),
    }
}

fn write_json<W, T>(mut writer: W, value: &T, target: &str) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {target}"))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to flush output to {target}"))?;
    Ok(())
}

/// Reads a JSON file; `what` names the file in error messages.
pub(crate) fn read_json_file<T>(what: &str, path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {what} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {what} JSON file: {}", path.display()))
}

/// Parses a piece letter (`O`, `J`, `L`, `Z`, `S`, `T` or `I`, any case) for clap.
pub(crate) fn parse_piece_kind(s: &str) -> Result<PieceKind, String> {
    let mut chars = s.chars();
    let kind = match (chars.next(), chars.next()) {
        (Some(c), None) => PieceKind::from_char(c.to_ascii_uppercase()),
        _ => None,
    };
    kind.ok_or_else(|| format!("invalid piece {s:?}: expected one of O, J, L, Z, S, T, I"))
}
