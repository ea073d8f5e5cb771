//! Transcript use-case service.
//!
//! # Responsibility
//! - Assemble bulletins and grade overviews from student + grade
//!   repositories.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence
//!   contracts.
//! - The service layer remains storage-agnostic: it only sees the
//!   repository traits.

use crate::model::records::{GradeLine, Student, StudentId};
use crate::repo::grade_repo::GradeRepository;
use crate::repo::student_repo::StudentRepository;
use crate::repo::RepoError;
use crate::service::aggregation::{summarize, GradeSummary};
use crate::service::transcript::Transcript;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for transcript use-cases.
#[derive(Debug)]
pub enum TranscriptServiceError {
    /// The requested student does not exist.
    StudentNotFound(StudentId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TranscriptServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TranscriptServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::StudentNotFound(_) => None,
        }
    }
}

impl From<RepoError> for TranscriptServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "student",
                id,
            } => Self::StudentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Grade grid plus summary, the view behind the grade management screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeOverview {
    /// Grade rows ordered by year, subject name, term.
    pub lines: Vec<GradeLine>,
    /// `None` when the student has no grades.
    pub summary: Option<GradeSummary>,
}

/// Use-case service assembling transcripts and grade overviews.
pub struct TranscriptService<S: StudentRepository, G: GradeRepository> {
    students: S,
    grades: G,
}

impl<S: StudentRepository, G: GradeRepository> TranscriptService<S, G> {
    /// Creates a service from repository implementations sharing one
    /// bootstrapped connection.
    pub fn new(students: S, grades: G) -> Self {
        Self { students, grades }
    }

    fn require_student(&self, student_id: StudentId) -> Result<Student, TranscriptServiceError> {
        self.students
            .get(student_id)?
            .ok_or(TranscriptServiceError::StudentNotFound(student_id))
    }

    /// Builds the full bulletin for one student.
    pub fn generate(&self, student_id: StudentId) -> Result<Transcript, TranscriptServiceError> {
        let student = self.require_student(student_id)?;
        let lines = self.grades.transcript_lines(student_id)?;
        let summary = summarize(&lines);
        Ok(Transcript {
            student,
            lines,
            summary,
        })
    }

    /// Builds the grade grid plus averages for one student.
    pub fn grade_overview(
        &self,
        student_id: StudentId,
    ) -> Result<GradeOverview, TranscriptServiceError> {
        self.require_student(student_id)?;
        let lines = self.grades.list_for_student(student_id)?;
        let summary = summarize(&lines);
        Ok(GradeOverview { lines, summary })
    }
}
