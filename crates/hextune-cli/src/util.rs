use std::{
    fs::File,
    io::{self, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context as _;
use hextune_trajectory::{EmptyUnitCatalog, StaticUnitCatalog, UnitCatalog};

/// Serializes `value` as pretty JSON to `path`, or to stdout when no path
/// is given.
pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    match path {
        None => write_json(&mut io::stdout().lock(), value, "stdout"),
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_json(
                &mut BufWriter::new(file),
                value,
                &path.display().to_string(),
            )
        }
    }
}

fn write_json<W, T>(writer: &mut W, value: &T, target: &str) -> anyhow::Result<()>
where
    W: io::Write,
    T: serde::Serialize,
{
    serde_json::to_writer_pretty(&mut *writer, value)
        .with_context(|| format!("Failed to write JSON to {target}"))?;
    writeln!(writer).with_context(|| format!("Failed to write JSON to {target}"))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush output to {target}"))?;
    Ok(())
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;
    let value = serde_json::from_reader(io::BufReader::new(file)).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;
    Ok(value)
}

/// Loads the unit-definition catalog, or an empty one when no file is
/// given. Parsing still succeeds without definitions; derived unit stats
/// just stay zeroed.
pub fn load_catalog(path: Option<&Path>) -> anyhow::Result<Box<dyn UnitCatalog>> {
    match path {
        Some(path) => {
            let catalog: StaticUnitCatalog = read_json_file("unit definitions", path)?;
            eprintln!("loaded {} unit definitions", catalog.len());
            Ok(Box::new(catalog))
        }
        None => Ok(Box::new(EmptyUnitCatalog)),
    }
}
