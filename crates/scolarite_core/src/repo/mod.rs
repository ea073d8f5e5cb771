//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts, one per record type.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must run draft `validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateKey`,
//!   `DuplicateGrade`, `HasDependents`) in addition to DB transport errors.
//! - Every `Sqlite*Repository` is constructed via `try_new`, which rejects
//!   connections whose schema version is not current.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::db::{migrations, DbError};
use crate::model::records::{
    ProgramId, RecordValidationError, StudentId, SubjectId, Term,
};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod department_repo;
pub mod enrollment_repo;
pub mod grade_repo;
pub mod program_repo;
pub mod student_repo;
pub mod subject_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error taxonomy shared by all record repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Draft failed field-level validation; nothing was written.
    Validation(RecordValidationError),
    /// Storage transport failure.
    Db(DbError),
    /// The referenced row does not exist.
    NotFound { entity: &'static str, id: i64 },
    /// No grade row matches the (student, subject, term) triple.
    GradeNotFound {
        student_id: StudentId,
        subject_id: SubjectId,
        term: Term,
    },
    /// No enrollment row links this student to this program.
    EnrollmentNotFound {
        student_id: StudentId,
        program_id: ProgramId,
    },
    /// A uniqueness constraint (department name, student registration
    /// number) was violated on create or update.
    DuplicateKey {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
    /// A grade already exists for this (student, subject, term).
    DuplicateGrade {
        student_id: StudentId,
        subject_id: SubjectId,
        term: Term,
    },
    /// The student already has an enrollment row for this program.
    DuplicateEnrollment {
        student_id: StudentId,
        program_id: ProgramId,
    },
    /// Deletion was rejected because dependent rows still reference the
    /// target (the documented reject-on-dependents policy).
    HasDependents { entity: &'static str, id: i64 },
    /// The connection was not bootstrapped through `db::open_db`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// A persisted row failed decoding (corrupt term value, etc).
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::GradeNotFound {
                student_id,
                subject_id,
                term,
            } => write!(
                f,
                "no grade for student {student_id}, subject {subject_id}, term {term}"
            ),
            Self::EnrollmentNotFound {
                student_id,
                program_id,
            } => write!(
                f,
                "student {student_id} has no enrollment in program {program_id}"
            ),
            Self::DuplicateKey {
                entity,
                field,
                value,
            } => write!(f, "{entity}.{field} `{value}` is already in use"),
            Self::DuplicateGrade {
                student_id,
                subject_id,
                term,
            } => write!(
                f,
                "a grade already exists for student {student_id}, subject {subject_id}, term {term}"
            ),
            Self::DuplicateEnrollment {
                student_id,
                program_id,
            } => write!(
                f,
                "student {student_id} is already enrolled in program {program_id}"
            ),
            Self::HasDependents { entity, id } => write!(
                f,
                "{entity} {id} still has dependent records and cannot be deleted"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it via db::open_db"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejects connections that did not go through `db::open_db` bootstrap.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

/// True when the error is a SQLite UNIQUE (or primary key) constraint hit.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// True when the error is a SQLite FOREIGN KEY constraint hit, i.e. a
/// delete was attempted while dependent rows exist.
pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_TRIGGER
    )
}

/// Decodes a persisted `term` column, rejecting values outside {1, 2}.
pub(crate) fn decode_term(table: &'static str, value: i64) -> RepoResult<Term> {
    Term::from_db(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid term value `{value}` in {table}.term"))
    })
}
