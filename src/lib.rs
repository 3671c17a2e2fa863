//! Probabilistic Minesweeper bot.
//!
//! Unknown squares next to revealed numbers are grouped into independent
//! edges. Small edges are enumerated exactly; large ones are split into
//! overlapping subsets under a size limit. The resulting probabilities drive
//! `solver::Bot`, which plays certain moves first and guesses otherwise.
//!
//! Grid-shaped data is row-major: `cells[row * cols + col]`.

pub mod board;
pub mod config;
pub mod edges;
pub mod enumerate;
pub mod error;
pub mod probability;
pub mod rng;
pub mod snapshot;
pub mod solver;
pub mod subsets;
pub mod types;

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use wasm_bindgen::prelude::*;

    use crate::config::SolverConfig;
    use crate::probability;
    use crate::snapshot::GridSnapshot;
    use crate::solver::Bot;

    fn to_js(err: crate::error::SolverError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }

    fn snapshot(
        rows: usize,
        cols: usize,
        mines: usize,
        cells: &[i8],
        edge_limit: usize,
        approximate: bool,
    ) -> Result<(GridSnapshot, SolverConfig), JsValue> {
        let grid = GridSnapshot::new(rows, cols, mines, cells.to_vec()).map_err(to_js)?;
        let config = SolverConfig::new(edge_limit, approximate).map_err(to_js)?;
        Ok((grid, config))
    }

    /// Mine probability of every square, row-major.
    /// `cells` holds `-1` hidden, `-2` flagged, `0..=8` revealed.
    #[wasm_bindgen(js_name = "probabilityMap")]
    pub fn wasm_probability_map(
        rows: usize,
        cols: usize,
        mines: usize,
        cells: &[i8],
        edge_limit: usize,
        approximate: bool,
    ) -> Result<js_sys::Float64Array, JsValue> {
        let (grid, config) = snapshot(rows, cols, mines, cells, edge_limit, approximate)?;
        let search = probability::edge_search(&grid, &config).map_err(to_js)?;

        let values = search.probabilities.as_slice();
        let arr = js_sys::Float64Array::new_with_length(values.len() as u32);
        arr.copy_from(values);
        Ok(arr)
    }

    /// Run one selection cycle.
    /// Returns JS object `{ reveal: [row, col] | null, flags: [[row, col], ...] }`.
    #[wasm_bindgen(js_name = "nextMove")]
    pub fn wasm_next_move(
        rows: usize,
        cols: usize,
        mines: usize,
        cells: &[i8],
        edge_limit: usize,
        approximate: bool,
    ) -> Result<JsValue, JsValue> {
        let (mut grid, config) = snapshot(rows, cols, mines, cells, edge_limit, approximate)?;
        let mut bot = Bot::new(config);
        bot.select_next_move(&mut grid).map_err(to_js)?;
        Ok(serde_wasm_bindgen::to_value(&grid.into_planned())?)
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "WASM minesweeper bot ready".to_string()
    }
}
