#![allow(dead_code)]

use tides::{
    config::MapConfig,
    geo::{GeoGrid, GeoSample},
    grid::{build_grid, TileCatalog, TileGrid},
};

/// Survey data whose retained grid at stride 1 is exactly `cells`.
///
/// The builder drops the first and last survey column, so each row gets a
/// throwaway column on both sides.
pub fn survey(cells: &[&[(&str, f64)]]) -> GeoGrid {
    let rows = cells
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let mut samples = vec![GeoSample::new(r as f64, 0.0, 99.0, "Barren")];
            samples.extend(row.iter().enumerate().map(|(c, (label, elevation))| {
                GeoSample::new(r as f64, (c + 1) as f64, *elevation, *label)
            }));
            samples.push(GeoSample::new(r as f64, (row.len() + 1) as f64, 99.0, "Barren"));
            samples
        })
        .collect();
    GeoGrid::new(rows).expect("rows are rectangular")
}

pub fn grid(cells: &[&[(&str, f64)]]) -> TileGrid {
    build_grid(&survey(cells), 1, &TileCatalog::default()).expect("grid builds")
}

pub fn config(name: &str, cells: &[&[(&str, f64)]], increment: f64) -> MapConfig {
    MapConfig::new(name, survey(cells), 1, increment).expect("valid config")
}

/// A 3x3 board: ocean in the middle at 0, barren land at 2 around it.
pub fn island_basin() -> Vec<Vec<(&'static str, f64)>> {
    (0..3)
        .map(|r| {
            (0..3)
                .map(|c| {
                    if (r, c) == (1, 1) {
                        ("Salt Water", 0.0)
                    } else {
                        ("Barren", 2.0)
                    }
                })
                .collect()
        })
        .collect()
}

pub fn as_cells<'a>(rows: &'a [Vec<(&'static str, f64)>]) -> Vec<&'a [(&'static str, f64)]> {
    rows.iter().map(Vec::as_slice).collect()
}
