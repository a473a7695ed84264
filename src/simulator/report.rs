//! Experiment report generation.

use super::config::SimConfig;
use super::runner::TrialResult;
use super::stats::Summary;
use crate::combat::{BattleOutcome, CombatState};
use crate::error::SimError;
use serde::Serialize;
use std::path::Path;

/// How the trials ended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    pub party1_victories: u32,
    pub party2_victories: u32,
    pub resolved: u32,
    pub round_limit: u32,
}

impl OutcomeTally {
    fn record(&mut self, state: CombatState) {
        match state {
            CombatState::Party1Victory => self.party1_victories += 1,
            CombatState::Party2Victory => self.party2_victories += 1,
            CombatState::Resolved => self.resolved += 1,
            CombatState::RoundLimit => self.round_limit += 1,
            CombatState::Ongoing => {}
        }
    }
}

/// Raw per-trial samples in the layout other tooling reads.
#[derive(Debug, Serialize)]
struct RawResults<'a> {
    ac: &'a [usize],
    #[serde(rename = "mod")]
    modifier: &'a [usize],
}

/// Aggregated results from an experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    pub num_trials: u32,
    /// Base seed the trials were derived from.
    pub seed: u64,
    /// Name of the character whose convergence was sampled.
    pub representative: String,

    pub modifier: Summary,
    pub armor_class: Summary,

    pub outcomes: OutcomeTally,
    pub avg_rounds: f64,

    // Per-trial samples, in trial order
    pub modifier_rounds: Vec<usize>,
    pub ac_rounds: Vec<usize>,

    /// The first trial, kept for its HP series and traces.
    pub sample_trial: Option<BattleOutcome>,
}

impl ExperimentReport {
    pub fn from_trials(trials: &[TrialResult], config: &SimConfig, seed: u64) -> Self {
        let num_trials = trials.len() as u32;

        let modifier_rounds: Vec<usize> = trials.iter().map(|t| t.modifier_rounds).collect();
        let ac_rounds: Vec<usize> = trials.iter().map(|t| t.ac_rounds).collect();

        let mut outcomes = OutcomeTally::default();
        for trial in trials {
            outcomes.record(trial.outcome.state);
        }

        let avg_rounds = trials
            .iter()
            .map(|t| t.outcome.rounds as f64)
            .sum::<f64>()
            / num_trials.max(1) as f64;

        let representative = trials
            .first()
            .and_then(|t| t.outcome.traces.first())
            .map(|trace| trace.name.clone())
            .or_else(|| {
                config
                    .matchup
                    .representative(config.tracked_side)
                    .map(|c| c.name.clone())
            })
            .unwrap_or_default();

        let summarize = |samples: &[usize]| {
            Summary::from_samples(
                samples,
                config.histogram_bin_width,
                config.histogram_upper_edge,
            )
        };

        Self {
            num_trials,
            seed,
            representative,
            modifier: summarize(&modifier_rounds),
            armor_class: summarize(&ac_rounds),
            outcomes,
            avg_rounds,
            modifier_rounds,
            ac_rounds,
            sample_trial: trials.first().map(|t| t.outcome.clone()),
        }
    }

    /// Share of trials that ended with every tracked estimate collapsed.
    pub fn resolved_rate(&self) -> f64 {
        self.outcomes.resolved as f64 / self.num_trials.max(1) as f64
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                  ROUNDS-TO-CERTAINTY REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Trials: {}    Seed: {}    Tracked: {}\n\n",
            self.num_trials, self.seed, self.representative
        ));

        report.push_str("── OUTCOMES ─────────────────────────────────────────────────────\n");
        report.push_str(&format!(
            "  Resolved:        {:>6} ({:.1}%)\n",
            self.outcomes.resolved,
            self.resolved_rate() * 100.0
        ));
        report.push_str(&format!(
            "  Party 1 Wins:    {:>6}\n",
            self.outcomes.party1_victories
        ));
        report.push_str(&format!(
            "  Party 2 Wins:    {:>6}\n",
            self.outcomes.party2_victories
        ));
        report.push_str(&format!(
            "  Round Limit:     {:>6}\n",
            self.outcomes.round_limit
        ));
        report.push_str(&format!("  Avg Rounds:      {:>9.1}\n\n", self.avg_rounds));

        push_summary(&mut report, "ATTACK MODIFIER", &self.modifier, self.num_trials);
        push_summary(&mut report, "ARMOR CLASS", &self.armor_class, self.num_trials);

        report.push_str("═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Per-trial rounds-to-certainty as `{"ac": [...], "mod": [...]}`.
    pub fn results_json(&self) -> String {
        let raw = RawResults {
            ac: &self.ac_rounds,
            modifier: &self.modifier_rounds,
        };
        serde_json::to_string(&raw).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn save_results(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        std::fs::write(path, self.results_json())?;
        Ok(())
    }
}

fn push_summary(report: &mut String, title: &str, summary: &Summary, num_trials: u32) {
    let rule_len = 60usize.saturating_sub(title.len() + 4);
    report.push_str(&format!("── {} {}\n", title, "─".repeat(rule_len)));
    report.push_str(&format!("  Mean:     {:>8.2}\n", summary.mean));
    report.push_str(&format!("  Std Dev:  {:>8.2}\n", summary.std_dev));
    report.push_str(&format!("  Skew:     {:>8.3}\n", summary.skew));
    report.push_str(&format!("  Kurtosis: {:>8.3}\n", summary.kurtosis));
    report.push_str(&format!(
        "  Median:   {:>8.1}    Range: {}..={}\n\n",
        summary.median, summary.min, summary.max
    ));

    for bin in summary.histogram.iter().filter(|b| b.count > 0) {
        let pct = (bin.count as f64 / num_trials.max(1) as f64) * 100.0;
        let bar: String = "█".repeat((pct / 2.0) as usize);
        report.push_str(&format!(
            "  {:>3}-{:<3} {:>5.1}% {}\n",
            bin.lower, bin.upper, pct, bar
        ));
    }
    if summary.out_of_range > 0 {
        report.push_str(&format!(
            "  beyond {}: {}\n",
            summary.histogram.last().map(|b| b.upper).unwrap_or(0),
            summary.out_of_range
        ));
    }
    report.push('\n');
}

// The raw per-trial samples go through `results_json` instead.
impl Serialize for ExperimentReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ExperimentReport", 9)?;
        state.serialize_field("num_trials", &self.num_trials)?;
        state.serialize_field("seed", &self.seed)?;
        state.serialize_field("representative", &self.representative)?;
        state.serialize_field("modifier", &self.modifier)?;
        state.serialize_field("armor_class", &self.armor_class)?;
        state.serialize_field("outcomes", &self.outcomes)?;
        state.serialize_field("avg_rounds", &self.avg_rounds)?;
        state.serialize_field("resolved_rate", &self.resolved_rate())?;
        state.serialize_field("sample_trial", &self.sample_trial)?;
        state.end()
    }
}
