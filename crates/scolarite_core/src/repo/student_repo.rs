//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `students` with the registration-number uniqueness
//!   guarantee.
//!
//! # Invariants
//! - Listing order is last name then first name; enrollment views inherit
//!   this ordering through their joins.
//! - Duplicate registration numbers surface as `DuplicateKey`.

use crate::model::records::{Student, StudentDraft, StudentId};
use crate::repo::{
    ensure_connection_ready, is_foreign_key_violation, is_unique_violation, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    registration_no,
    last_name,
    first_name,
    email,
    phone
FROM students";

/// Repository interface for student CRUD.
pub trait StudentRepository {
    fn create(&self, draft: &StudentDraft) -> RepoResult<StudentId>;
    fn get(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn list(&self) -> RepoResult<Vec<Student>>;
    fn update(&self, id: StudentId, draft: &StudentDraft) -> RepoResult<()>;
    fn delete(&self, id: StudentId) -> RepoResult<()>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create(&self, draft: &StudentDraft) -> RepoResult<StudentId> {
        draft.validate()?;

        self.conn
            .execute(
                "INSERT INTO students (registration_no, last_name, first_name, email, phone)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    draft.registration_no,
                    draft.last_name,
                    draft.first_name,
                    draft.email,
                    draft.phone,
                ],
            )
            .map_err(|err| map_registration_conflict(err, draft))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn list(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STUDENT_SELECT_SQL} ORDER BY last_name, first_name;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn update(&self, id: StudentId, draft: &StudentDraft) -> RepoResult<()> {
        draft.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE students
                 SET registration_no = ?1,
                     last_name = ?2,
                     first_name = ?3,
                     email = ?4,
                     phone = ?5
                 WHERE id = ?6;",
                params![
                    draft.registration_no,
                    draft.last_name,
                    draft.first_name,
                    draft.email,
                    draft.phone,
                    id,
                ],
            )
            .map_err(|err| map_registration_conflict(err, draft))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "student",
                id,
            });
        }
        Ok(())
    }

    fn delete(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", params![id])
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    RepoError::HasDependents {
                        entity: "student",
                        id,
                    }
                } else {
                    err.into()
                }
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "student",
                id,
            });
        }
        Ok(())
    }
}

fn map_registration_conflict(err: rusqlite::Error, draft: &StudentDraft) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::DuplicateKey {
            entity: "student",
            field: "registration_no",
            value: draft.registration_no.clone(),
        }
    } else {
        err.into()
    }
}

pub(crate) fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    Ok(Student {
        id: row.get("id")?,
        registration_no: row.get("registration_no")?,
        last_name: row.get("last_name")?,
        first_name: row.get("first_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
    })
}
