//! Transcript (bulletin) model and plain-text renderer.
//!
//! # Responsibility
//! - Derive the qualitative rating from the overall average.
//! - Render a student's grade history and results as a printable bulletin.
//!
//! # Invariants
//! - Rating thresholds are inclusive at the lower bound of each band and
//!   applied to the rounded overall average.
//! - With zero grades the bulletin carries a "no grades" message and no
//!   rating line.

use crate::model::records::{GradeLine, Student};
use crate::service::aggregation::GradeSummary;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Write as _};

/// Qualitative rating (appréciation) derived from the overall average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mention {
    TresBien,
    Bien,
    AssezBien,
    Passable,
    Insuffisant,
}

impl Mention {
    /// Maps a rounded /20 average onto its rating band. Each threshold is
    /// inclusive: exactly 16.0 is Très Bien, exactly 10.0 is Passable.
    pub fn from_average(average: f64) -> Mention {
        if average >= 16.0 {
            Mention::TresBien
        } else if average >= 14.0 {
            Mention::Bien
        } else if average >= 12.0 {
            Mention::AssezBien
        } else if average >= 10.0 {
            Mention::Passable
        } else {
            Mention::Insuffisant
        }
    }

    /// Human-facing label printed on the bulletin.
    pub fn label(self) -> &'static str {
        match self {
            Mention::TresBien => "Très Bien",
            Mention::Bien => "Bien",
            Mention::AssezBien => "Assez Bien",
            Mention::Passable => "Passable",
            Mention::Insuffisant => "Insuffisant",
        }
    }
}

impl Display for Mention {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A student's full bulletin: identity, ordered grade rows and summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub student: Student,
    /// Grade rows ordered by year, then term, then subject name.
    pub lines: Vec<GradeLine>,
    /// `None` when the student has no grades.
    pub summary: Option<GradeSummary>,
}

impl Transcript {
    /// Rating for the results section; absent without grade data.
    pub fn mention(&self) -> Option<Mention> {
        self.summary
            .as_ref()
            .map(|summary| Mention::from_average(summary.overall_average))
    }

    /// Renders the printable plain-text bulletin.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("BULLETIN DE NOTES\n\n");
        let _ = writeln!(out, "Matricule: {}", self.student.registration_no);
        let _ = writeln!(out, "Nom: {}", self.student.last_name);
        let _ = writeln!(out, "Prénom: {}", self.student.first_name);
        out.push('\n');

        let summary = match &self.summary {
            Some(summary) => summary,
            None => {
                out.push_str("Aucune note saisie\n");
                return out;
            }
        };

        out.push_str("Détail des notes\n");
        let name_width = self
            .lines
            .iter()
            .map(|line| line.subject_name.chars().count())
            .chain(std::iter::once("Matière".chars().count()))
            .max()
            .unwrap_or(0);
        let _ = writeln!(
            out,
            "{:<name_width$}  Année  Semestre  Note   Crédits",
            "Matière"
        );
        for line in &self.lines {
            let _ = writeln!(
                out,
                "{:<name_width$}  {:<5}  {:<8}  {:<5.2}  {}",
                line.subject_name, line.year, line.term, line.score, line.credits
            );
        }

        out.push_str("\nRésultats\n");
        let _ = writeln!(
            out,
            "Moyenne générale: {:.2}/20",
            summary.overall_average
        );
        for term_average in &summary.per_term {
            let _ = writeln!(
                out,
                "Semestre {}: {:.2}/20 ({} matières)",
                term_average.term, term_average.average, term_average.subject_count
            );
        }
        let _ = writeln!(out, "Total crédits: {}", summary.total_credits);
        let _ = writeln!(
            out,
            "Appréciation: {}",
            Mention::from_average(summary.overall_average)
        );
        out
    }
}
