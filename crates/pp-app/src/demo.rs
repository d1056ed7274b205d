//! Synthetic layers for the demo window

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;

use pp_data::{AttributeTable, Layer, MissingValues};

const COLORS: [&str; 3] = ["red", "green", "blue"];

/// A points-like table: `a` uniform in [0, 20), `b` a sine sweep, `c` a
/// random color label
pub fn points_table(rows: usize) -> Result<AttributeTable> {
    let mut rng = rand::thread_rng();

    let a = (0..rows).map(|_| rng.gen::<f64>() * 20.0).collect();
    let b = (0..rows)
        .map(|i| {
            let t = if rows > 1 { 10.0 * i as f64 / (rows - 1) as f64 } else { 0.0 };
            t.sin()
        })
        .collect();
    let c: Vec<&str> = (0..rows)
        .map(|_| COLORS.choose(&mut rng).copied().unwrap_or("red"))
        .collect();

    AttributeTable::builder()
        .continuous("a", a)
        .continuous("b", b)
        .categorical("c", c)
        .build()
        .context("Failed to build demo table")
}

/// Layers shown at startup: one plottable points layer and one image
/// layer without properties
pub fn startup_layers() -> Result<Vec<Arc<Layer>>> {
    Ok(vec![
        Layer::new("points", Some(points_table(100)?)),
        Layer::new("image", None),
    ])
}

/// Load a CSV file as a layer named after the file stem
pub fn csv_layer(path: &Path) -> Result<Arc<Layer>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let table = AttributeTable::from_csv_reader(file, &MissingValues::default())
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Layer::new(name, Some(table)))
}
