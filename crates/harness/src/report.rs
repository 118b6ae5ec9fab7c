//! Sweep reports: JSON persistence, baseline diffing, summary tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRow {
    pub case: String,
    pub label: String,
    pub workers: usize,
    pub policy: String,
    pub elapsed_ms: f64,
    pub speedup: f64,
    pub baseline: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub generated_at_unix_ms: u128,
    pub rows: Vec<SweepRow>,
}

impl SweepReport {
    pub fn new(rows: Vec<SweepRow>) -> Self {
        let generated_at_unix_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| Duration::from_secs(0))
            .as_millis();
        Self {
            generated_at_unix_ms,
            rows,
        }
    }

    pub fn as_map(&self) -> BTreeMap<&str, &SweepRow> {
        self.rows
            .iter()
            .map(|row| (row.case.as_str(), row))
            .collect()
    }

    /// Index of the fastest row; ties resolve to the earliest case.
    pub fn fastest(&self) -> Option<(usize, &SweepRow)> {
        let mut best: Option<(usize, &SweepRow)> = None;
        for (idx, row) in self.rows.iter().enumerate() {
            match &best {
                Some((_, fastest)) if row.elapsed_ms >= fastest.elapsed_ms => {}
                _ => best = Some((idx, row)),
            }
        }
        best
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)?;
        let report = serde_json::from_str(&json)?;
        Ok(report)
    }

    pub fn diff<'a>(&'a self, baseline: &'a SweepReport) -> BTreeMap<&'a str, SweepDelta<'a>> {
        let mut deltas = BTreeMap::new();
        let previous = baseline.as_map();

        for (case, row) in self.as_map() {
            if let Some(&baseline_row) = previous.get(case) {
                deltas.insert(
                    case,
                    SweepDelta {
                        current: row,
                        baseline: baseline_row,
                        elapsed_ms_delta: row.elapsed_ms - baseline_row.elapsed_ms,
                        speedup_delta: row.speedup - baseline_row.speedup,
                    },
                );
            }
        }

        deltas
    }

    /// The performance summary the benchmarks print.
    pub fn render_table(&self) -> String {
        let mut table = String::new();
        let _ = writeln!(table, "{:<30} | Time (ms) | Speedup", "Configuration");
        let _ = writeln!(table, "{}", "-".repeat(56));
        for row in &self.rows {
            let _ = write!(table, "{:<30} | {:>9.3} |", row.case, row.elapsed_ms);
            if row.baseline {
                let _ = writeln!(table, " baseline");
            } else {
                let _ = writeln!(table, " {:.2}x", row.speedup);
            }
        }
        if let Some((_, best)) = self.fastest() {
            let _ = writeln!(
                table,
                "Best configuration: {} ({:.3} ms)",
                best.case, best.elapsed_ms
            );
        }
        table
    }
}

#[derive(Debug)]
pub struct SweepDelta<'a> {
    pub current: &'a SweepRow,
    pub baseline: &'a SweepRow,
    pub elapsed_ms_delta: f64,
    pub speedup_delta: f64,
}
