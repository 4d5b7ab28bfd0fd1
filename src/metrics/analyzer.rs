use super::CostSample;
use crate::mailbox::Round;
use crate::problem::Cost;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub name: String,
    pub algorithm: String,
    pub rounds: Round,
    pub initial_cost: f64,
    pub final_cost: f64,
    pub best_cost: f64,
    pub best_round: f64,
    /// Fraction of the initial cost removed by the end of the run
    pub improvement: f64,
}

pub fn analyze(samples: &[CostSample], name: &str, algorithm: &str) -> RunReport {
    let initial = samples.first().map_or(0, |s| s.global_cost);
    let last = samples.last().map_or(0, |s| s.global_cost);
    let best = samples
        .iter()
        .min_by_key(|s| (s.global_cost, s.round))
        .copied()
        .unwrap_or(CostSample { round: 0, global_cost: 0 });

    RunReport {
        name: name.to_string(),
        algorithm: algorithm.to_string(),
        rounds: samples.last().map_or(0, |s| s.round),
        initial_cost: initial as f64,
        final_cost: last as f64,
        best_cost: best.global_cost as f64,
        best_round: best.round as f64,
        improvement: improvement(initial, last),
    }
}

fn improvement(initial: Cost, last: Cost) -> f64 {
    if initial == 0 {
        0.0
    } else {
        (initial as f64 - last as f64) / initial as f64
    }
}

/// Mean of several runs of the same algorithm. Name and algorithm come from
/// the first report.
pub fn average_reports(reports: &[RunReport]) -> Option<RunReport> {
    let first = reports.first()?;
    let n = reports.len() as f64;
    let mean = |f: fn(&RunReport) -> f64| reports.iter().map(f).sum::<f64>() / n;

    Some(RunReport {
        name: first.name.clone(),
        algorithm: first.algorithm.clone(),
        rounds: reports.iter().map(|r| r.rounds).max().unwrap_or(0),
        initial_cost: mean(|r| r.initial_cost),
        final_cost: mean(|r| r.final_cost),
        best_cost: mean(|r| r.best_cost),
        best_round: mean(|r| r.best_round),
        improvement: mean(|r| r.improvement),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(costs: &[Cost]) -> Vec<CostSample> {
        costs
            .iter()
            .enumerate()
            .map(|(round, &global_cost)| CostSample { round: round as Round, global_cost })
            .collect()
    }

    #[test]
    fn test_analyze() {
        let report = analyze(&samples(&[100, 60, 50, 55]), "run", "MGM");
        assert_eq!(report.rounds, 3);
        assert_eq!(report.initial_cost, 100.0);
        assert_eq!(report.final_cost, 55.0);
        assert_eq!(report.best_cost, 50.0);
        assert_eq!(report.best_round, 2.0);
        assert!((report.improvement - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_empty() {
        let report = analyze(&[], "empty", "DSA");
        assert_eq!(report.improvement, 0.0);
        assert_eq!(report.rounds, 0);
    }

    #[test]
    fn test_average_reports() {
        let a = analyze(&samples(&[10, 4]), "a", "DSA");
        let b = analyze(&samples(&[20, 10]), "b", "DSA");
        let avg = average_reports(&[a, b]).unwrap();
        assert_eq!(avg.name, "a");
        assert_eq!(avg.initial_cost, 15.0);
        assert_eq!(avg.final_cost, 7.0);
        assert!((avg.improvement - 0.55).abs() < 1e-9);
        assert!(average_reports(&[]).is_none());
    }
}
