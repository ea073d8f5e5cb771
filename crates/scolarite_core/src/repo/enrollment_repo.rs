//! Enrollment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Link students to programs and answer the two enrollment views the
//!   host renders: students still available for a program, and students
//!   already enrolled in it.
//!
//! # Invariants
//! - One enrollment per (student, program) pair, enforced at write time
//!   rather than by a schema constraint.
//! - For any program, available and enrolled student sets are disjoint and
//!   together cover all students.

use crate::model::records::{
    Enrollment, EnrollmentDraft, EnrollmentId, ProgramId, Student, StudentId,
};
use crate::repo::student_repo::parse_student_row;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

/// Repository interface for enrollment CRUD and program rosters.
pub trait EnrollmentRepository {
    fn create(&self, draft: &EnrollmentDraft) -> RepoResult<EnrollmentId>;
    fn get(&self, id: EnrollmentId) -> RepoResult<Option<Enrollment>>;
    fn list(&self) -> RepoResult<Vec<Enrollment>>;
    fn update(&self, id: EnrollmentId, draft: &EnrollmentDraft) -> RepoResult<()>;
    fn delete(&self, id: EnrollmentId) -> RepoResult<()>;
    /// Withdraws one student from one program (the désinscription flow).
    /// `EnrollmentNotFound` reports the pair when no such row exists.
    fn delete_for_program(&self, student_id: StudentId, program_id: ProgramId) -> RepoResult<()>;
    /// Students with no enrollment row for the given program.
    fn list_available_students(&self, program_id: ProgramId) -> RepoResult<Vec<Student>>;
    /// Students enrolled in the given program, in student listing order.
    fn list_enrolled(&self, program_id: ProgramId) -> RepoResult<Vec<Student>>;
}

/// SQLite-backed enrollment repository.
pub struct SqliteEnrollmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEnrollmentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Write-time uniqueness check for the (student, program) pair.
    /// `exclude` skips one enrollment row so updates do not collide with
    /// themselves.
    fn pair_exists(
        &self,
        student_id: StudentId,
        program_id: ProgramId,
        exclude: Option<EnrollmentId>,
    ) -> RepoResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM enrollments
             WHERE student_id = ?1 AND program_id = ?2 AND id != ?3;",
            params![student_id, program_id, exclude.unwrap_or(-1)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl EnrollmentRepository for SqliteEnrollmentRepository<'_> {
    fn create(&self, draft: &EnrollmentDraft) -> RepoResult<EnrollmentId> {
        if self.pair_exists(draft.student_id, draft.program_id, None)? {
            return Err(RepoError::DuplicateEnrollment {
                student_id: draft.student_id,
                program_id: draft.program_id,
            });
        }

        self.conn.execute(
            "INSERT INTO enrollments (student_id, program_id, enrollment_year)
             VALUES (?1, ?2, ?3);",
            params![draft.student_id, draft.program_id, draft.enrollment_year],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, id: EnrollmentId) -> RepoResult<Option<Enrollment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, student_id, program_id, enrollment_year
             FROM enrollments WHERE id = ?1;",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_enrollment_row(row)?));
        }
        Ok(None)
    }

    fn list(&self) -> RepoResult<Vec<Enrollment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, student_id, program_id, enrollment_year
             FROM enrollments ORDER BY id;",
        )?;
        let mut rows = stmt.query([])?;
        let mut enrollments = Vec::new();
        while let Some(row) = rows.next()? {
            enrollments.push(parse_enrollment_row(row)?);
        }
        Ok(enrollments)
    }

    fn update(&self, id: EnrollmentId, draft: &EnrollmentDraft) -> RepoResult<()> {
        if self.pair_exists(draft.student_id, draft.program_id, Some(id))? {
            return Err(RepoError::DuplicateEnrollment {
                student_id: draft.student_id,
                program_id: draft.program_id,
            });
        }

        let changed = self.conn.execute(
            "UPDATE enrollments
             SET student_id = ?1, program_id = ?2, enrollment_year = ?3
             WHERE id = ?4;",
            params![draft.student_id, draft.program_id, draft.enrollment_year, id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "enrollment",
                id,
            });
        }
        Ok(())
    }

    fn delete(&self, id: EnrollmentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM enrollments WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "enrollment",
                id,
            });
        }
        Ok(())
    }

    fn delete_for_program(&self, student_id: StudentId, program_id: ProgramId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM enrollments WHERE student_id = ?1 AND program_id = ?2;",
            params![student_id, program_id],
        )?;

        if changed == 0 {
            return Err(RepoError::EnrollmentNotFound {
                student_id,
                program_id,
            });
        }
        Ok(())
    }

    fn list_available_students(&self, program_id: ProgramId) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.registration_no, s.last_name, s.first_name, s.email, s.phone
             FROM students s
             WHERE s.id NOT IN (
                 SELECT e.student_id FROM enrollments e WHERE e.program_id = ?1
             )
             ORDER BY s.last_name, s.first_name;",
        )?;
        let mut rows = stmt.query(params![program_id])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn list_enrolled(&self, program_id: ProgramId) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.registration_no, s.last_name, s.first_name, s.email, s.phone
             FROM students s
             JOIN enrollments e ON s.id = e.student_id
             WHERE e.program_id = ?1
             ORDER BY s.last_name, s.first_name;",
        )?;
        let mut rows = stmt.query(params![program_id])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }
}

fn parse_enrollment_row(row: &Row<'_>) -> RepoResult<Enrollment> {
    Ok(Enrollment {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        program_id: row.get("program_id")?,
        enrollment_year: row.get("enrollment_year")?,
    })
}
