//! Record types shared by repositories, aggregation and reporting.
//!
//! # Responsibility
//! - Define the six persisted records and their draft (input) shapes.
//! - Validate field-level invariants before drafts reach SQL.
//!
//! # Invariants
//! - Required text fields are non-empty after trimming.
//! - `year_count`, `credits` and `year` are at least 1.
//! - Grade scores live on the 0–20 scale, inclusive.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identifier for department rows.
pub type DepartmentId = i64;
/// Storage-assigned identifier for program rows.
pub type ProgramId = i64;
/// Storage-assigned identifier for student rows.
pub type StudentId = i64;
/// Storage-assigned identifier for enrollment rows.
pub type EnrollmentId = i64;
/// Storage-assigned identifier for subject rows.
pub type SubjectId = i64;
/// Storage-assigned identifier for grade rows.
pub type GradeId = i64;

/// Half of an academic year. Every subject is taught in exactly one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    First,
    Second,
}

impl Term {
    /// Integer form persisted in the `term` columns (1 or 2).
    pub fn as_db(self) -> i64 {
        match self {
            Term::First => 1,
            Term::Second => 2,
        }
    }

    /// Parses the persisted integer form. Returns `None` for anything
    /// outside {1, 2} so read paths can reject corrupt rows.
    pub fn from_db(value: i64) -> Option<Term> {
        match value {
            1 => Some(Term::First),
            2 => Some(Term::Second),
            _ => None,
        }
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_db())
    }
}

/// Validation failure raised by draft `validate()` before persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValidationError {
    /// A required text field is empty or whitespace-only.
    EmptyField {
        record: &'static str,
        field: &'static str,
    },
    /// A count-like field is below its minimum of 1.
    BelowMinimum {
        record: &'static str,
        field: &'static str,
    },
    /// A grade score falls outside the 0–20 scale.
    ScoreOutOfRange(f64),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { record, field } => {
                write!(f, "{record}.{field} must not be empty")
            }
            Self::BelowMinimum { record, field } => {
                write!(f, "{record}.{field} must be at least 1")
            }
            Self::ScoreOutOfRange(score) => {
                write!(f, "score {score} is outside the 0-20 scale")
            }
        }
    }
}

impl Error for RecordValidationError {}

fn require_non_empty(
    record: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), RecordValidationError> {
    if value.trim().is_empty() {
        return Err(RecordValidationError::EmptyField { record, field });
    }
    Ok(())
}

fn require_at_least_one(
    record: &'static str,
    field: &'static str,
    value: i64,
) -> Result<(), RecordValidationError> {
    if value < 1 {
        return Err(RecordValidationError::BelowMinimum { record, field });
    }
    Ok(())
}

/// Validates a grade score against the 0–20 scale.
pub fn validate_score(score: f64) -> Result<(), RecordValidationError> {
    if !(0.0..=20.0).contains(&score) || score.is_nan() {
        return Err(RecordValidationError::ScoreOutOfRange(score));
    }
    Ok(())
}

/// An academic department. Department names are unique institution-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub description: Option<String>,
}

/// Input shape for department create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentDraft {
    pub name: String,
    pub description: Option<String>,
}

impl DepartmentDraft {
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_non_empty("department", "name", &self.name)
    }
}

/// A multi-year course of study, optionally attached to a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub year_count: i64,
    pub department_id: Option<DepartmentId>,
}

/// Input shape for program create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDraft {
    pub name: String,
    pub year_count: i64,
    pub department_id: Option<DepartmentId>,
}

impl ProgramDraft {
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_non_empty("program", "name", &self.name)?;
        require_at_least_one("program", "year_count", self.year_count)
    }
}

/// A student known to the institution. `registration_no` is the unique
/// human-facing matricule; contact fields are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub registration_no: String,
    pub last_name: String,
    pub first_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Input shape for student create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDraft {
    pub registration_no: String,
    pub last_name: String,
    pub first_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl StudentDraft {
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_non_empty("student", "registration_no", &self.registration_no)?;
        require_non_empty("student", "last_name", &self.last_name)?;
        require_non_empty("student", "first_name", &self.first_name)
    }
}

/// The link between a student and a program for a given year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub program_id: ProgramId,
    pub enrollment_year: i64,
}

/// Input shape for enrollment create/update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentDraft {
    pub student_id: StudentId,
    pub program_id: ProgramId,
    pub enrollment_year: i64,
}

/// A gradable course unit tied to one program year and one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub credits: i64,
    pub program_id: ProgramId,
    pub year: i64,
    pub term: Term,
}

/// Input shape for subject create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDraft {
    pub name: String,
    pub credits: i64,
    pub program_id: ProgramId,
    pub year: i64,
    pub term: Term,
}

impl SubjectDraft {
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_non_empty("subject", "name", &self.name)?;
        require_at_least_one("subject", "credits", self.credits)?;
        require_at_least_one("subject", "year", self.year)
    }
}

/// A 0–20 score for one student in one subject for one term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub score: f64,
    pub term: Term,
}

/// One graded subject joined with its subject metadata. This is the read
/// model consumed by the aggregation engine and the transcript renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeLine {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub score: f64,
    pub term: Term,
    pub credits: i64,
    pub year: i64,
}
