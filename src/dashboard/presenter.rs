//! Rendering collaborators.
//!
//! The dashboard hands finished chart configs and table rows to these
//! sinks and never reads anything back.

use crate::models::{ChartConfig, TableRow};

/// Draws one chart per call.
pub trait ChartPresenter {
    fn draw(&mut self, config: &ChartConfig);
}

/// Appends one visual row per call.
pub trait TableRenderer {
    fn append(&mut self, row: &TableRow);
}

/// Collects drawn charts in memory, in draw order.
impl ChartPresenter for Vec<ChartConfig> {
    fn draw(&mut self, config: &ChartConfig) {
        self.push(config.clone());
    }
}

/// Collects appended rows in memory, in append order.
impl TableRenderer for Vec<TableRow> {
    fn append(&mut self, row: &TableRow) {
        self.push(row.clone());
    }
}
