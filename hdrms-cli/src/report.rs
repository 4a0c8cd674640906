//! Output of a simulated run

use std::fmt::Display;

use hdrms::{FinalConsumption, FinalSelection};
use hdrms_geometry::PointId;
use itertools::Itertools;
use serde::Serialize;

/// Supported output formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format (default)
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown output format '{}'. Valid options: table, json",
                s
            )),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub dataset: String,
    pub points: usize,
    pub skyline: usize,
    pub dimensions: usize,
    pub seed: u64,
    pub utility: Vec<f64>,
    pub final_dimensions: Vec<usize>,
    pub questions: FinalConsumption,
    pub selection: FinalSelection,
    pub selected: Vec<PointId>,
    /// Skyline point scoring best under the simulated utility
    pub ground_truth: Option<PointId>,
    /// `1 - best selected score / best score` under the simulated utility
    pub utility_regret: f64,
    /// Exact maximum regret ratio of a covering subset over the skyline on
    /// the final dimensions
    pub max_regret_ratio: Option<f64>,
    pub elapsed_ms: ElapsedMs,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElapsedMs {
    pub narrowing_and_splitting: f64,
    pub final_selection: f64,
}

impl RunReport {
    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self),
            OutputFormat::Table => Ok(self.table()),
        }
    }

    fn table(&self) -> String {
        let mut rows: Vec<(&str, String)> = vec![
            ("dataset", self.dataset.clone()),
            (
                "points",
                format!("{} ({} on the skyline, {} dimensions)", self.points, self.skyline, self.dimensions),
            ),
            ("seed", self.seed.to_string()),
            (
                "final dimensions",
                format!("[{}]", self.final_dimensions.iter().join(", ")),
            ),
            (
                "questions",
                format!(
                    "{} (narrowing {}, splitting {}, elicitation {})",
                    self.questions.total_questions(),
                    self.questions.narrowing,
                    self.questions.splitting,
                    self.questions.elicitation
                ),
            ),
        ];
        match &self.selection {
            FinalSelection::Interactive {
                rounds,
                candidates_left,
                regret_bound,
            } => {
                rows.push((
                    "mode",
                    format!(
                        "interactive ({} rounds, {} candidates left, bound {:.4})",
                        rounds, candidates_left, regret_bound
                    ),
                ));
                rows.push(("elicited", self.selected.iter().join(", ")));
                rows.push((
                    "ground truth",
                    self.ground_truth.map_or_else(|| "-".to_string(), |id| id.to_string()),
                ));
            }
            FinalSelection::Covering { rounds_run } => {
                rows.push(("mode", format!("covering ({} rounds)", rounds_run)));
                rows.push(("output size", self.selected.len().to_string()));
                rows.push(("selected", self.selected.iter().join(", ")));
                if let Some(mrr) = self.max_regret_ratio {
                    rows.push(("max regret ratio", format!("{:.6}", mrr)));
                }
            }
        }
        rows.push(("utility regret", format!("{:.6}", self.utility_regret)));
        rows.push((
            "time (ms)",
            format!(
                "{:.1} phases 1-2, {:.1} final",
                self.elapsed_ms.narrowing_and_splitting, self.elapsed_ms.final_selection
            ),
        ));

        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        rows.iter()
            .map(|(k, v)| format!("{:<width$}  {}", k, v, width = width))
            .join("\n")
    }
}
