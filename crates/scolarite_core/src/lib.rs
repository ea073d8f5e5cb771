//! Core domain logic for the student-records desktop application.
//! This crate is the single source of truth for business invariants:
//! repositories over the six record types, grade aggregation, and the
//! bulletin (transcript) generator. The presentation host owns windows,
//! dialogs and interaction sequencing; it only ever calls the APIs
//! exported here.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::records::{
    Department, DepartmentDraft, DepartmentId, Enrollment, EnrollmentDraft, EnrollmentId, Grade,
    GradeId, GradeLine, Program, ProgramDraft, ProgramId, RecordValidationError, Student,
    StudentDraft, StudentId, Subject, SubjectDraft, SubjectId, Term,
};
pub use repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
pub use repo::enrollment_repo::{EnrollmentRepository, SqliteEnrollmentRepository};
pub use repo::grade_repo::{GradeRepository, SqliteGradeRepository};
pub use repo::program_repo::{ProgramOverview, ProgramRepository, SqliteProgramRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::subject_repo::{SqliteSubjectRepository, SubjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::aggregation::{round2, summarize, GradeSummary, TermAverage};
pub use service::transcript::{Mention, Transcript};
pub use service::transcript_service::{GradeOverview, TranscriptService, TranscriptServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
