//! Grade aggregation engine.
//!
//! # Responsibility
//! - Compute a student's overall and per-term averages from grade lines.
//!
//! # Invariants
//! - The overall average is the unweighted arithmetic mean of all scores;
//!   credits are reported as a total but never weight the mean.
//! - An empty grade set yields no summary, never a numeric zero.

use crate::model::records::{GradeLine, Term};
use serde::{Deserialize, Serialize};

/// Two-decimal rounding used for every displayed average.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean of the scores restricted to one term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermAverage {
    pub term: Term,
    pub average: f64,
    /// Number of graded subjects contributing to this term's mean.
    pub subject_count: usize,
}

/// Aggregated results over a student's full grade set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    /// Unweighted mean of all scores, rounded to 2 decimals.
    pub overall_average: f64,
    /// Sum of credits across graded subjects. Informational only.
    pub total_credits: i64,
    /// Per-term means in term order, only for terms that have grades.
    pub per_term: Vec<TermAverage>,
}

/// Computes the grade summary for one student's lines.
///
/// Returns `None` when the student has no grades; callers must render a
/// distinct "no grades" message instead of a zero average.
pub fn summarize(lines: &[GradeLine]) -> Option<GradeSummary> {
    if lines.is_empty() {
        return None;
    }

    let mut sum = 0.0;
    let mut total_credits = 0;
    let mut term_sums: [(f64, usize); 2] = [(0.0, 0); 2];

    for line in lines {
        sum += line.score;
        total_credits += line.credits;
        let slot = match line.term {
            Term::First => &mut term_sums[0],
            Term::Second => &mut term_sums[1],
        };
        slot.0 += line.score;
        slot.1 += 1;
    }

    let per_term = [Term::First, Term::Second]
        .into_iter()
        .zip(term_sums)
        .filter(|(_, (_, count))| *count > 0)
        .map(|(term, (term_sum, count))| TermAverage {
            term,
            average: round2(term_sum / count as f64),
            subject_count: count,
        })
        .collect();

    Some(GradeSummary {
        overall_average: round2(sum / lines.len() as f64),
        total_credits,
        per_term,
    })
}
