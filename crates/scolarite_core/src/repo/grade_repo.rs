//! Grade repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Record 0–20 scores per (student, subject, term) and serve the joined
//!   read models for the grade grid and the transcript.
//!
//! # Invariants
//! - At most one grade per (student, subject, term); `add` pre-checks and
//!   the unique index backs the invariant under every write path.
//! - `add` derives the term from the subject row; callers never pick it.
//! - Update/delete are keyed by the durable (student, subject, term)
//!   triple, never by subject display name.

use crate::model::records::{
    validate_score, Grade, GradeId, GradeLine, StudentId, SubjectId, Term,
};
use crate::repo::{
    decode_term, ensure_connection_ready, is_unique_violation, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const GRADE_LINE_SELECT_SQL: &str = "SELECT
    m.id AS subject_id,
    m.name AS subject_name,
    g.score,
    g.term,
    m.credits,
    m.year
FROM grades g
JOIN subjects m ON g.subject_id = m.id
WHERE g.student_id = ?1";

/// Repository interface for grade writes and grade read models.
pub trait GradeRepository {
    /// Records a score for one student in one subject. The term is the
    /// subject's fixed term; a second grade for the same (student, subject,
    /// term) fails with `DuplicateGrade` and leaves the stored score
    /// untouched.
    fn add(&self, student_id: StudentId, subject_id: SubjectId, score: f64)
        -> RepoResult<GradeId>;
    fn get(&self, id: GradeId) -> RepoResult<Option<Grade>>;
    /// Grade grid for one student, ordered by year, subject name, term.
    fn list_for_student(&self, student_id: StudentId) -> RepoResult<Vec<GradeLine>>;
    /// Transcript rows for one student, ordered by year, term, subject
    /// name.
    fn transcript_lines(&self, student_id: StudentId) -> RepoResult<Vec<GradeLine>>;
    /// Rewrites the score (and possibly the term) of the grade identified
    /// by the (student, subject, term) triple. `GradeNotFound` reports the
    /// full triple when no such grade exists; moving onto an occupied term
    /// fails with `DuplicateGrade`.
    fn update(
        &self,
        student_id: StudentId,
        subject_id: SubjectId,
        term: Term,
        new_score: f64,
        new_term: Term,
    ) -> RepoResult<()>;
    /// Deletes the grade identified by the (student, subject, term)
    /// triple. `GradeNotFound` reports the full triple.
    fn delete(&self, student_id: StudentId, subject_id: SubjectId, term: Term) -> RepoResult<()>;
    fn delete_by_id(&self, id: GradeId) -> RepoResult<()>;
}

/// SQLite-backed grade repository.
pub struct SqliteGradeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGradeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn subject_term(&self, subject_id: SubjectId) -> RepoResult<Term> {
        let raw: Option<i64> = self
            .conn
            .query_row(
                "SELECT term FROM subjects WHERE id = ?1;",
                params![subject_id],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(value) => decode_term("subjects", value),
            None => Err(RepoError::NotFound {
                entity: "subject",
                id: subject_id,
            }),
        }
    }

    fn grade_exists(
        &self,
        student_id: StudentId,
        subject_id: SubjectId,
        term: Term,
    ) -> RepoResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM grades
             WHERE student_id = ?1 AND subject_id = ?2 AND term = ?3;",
            params![student_id, subject_id, term.as_db()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn query_grade_lines(&self, sql: &str, student_id: StudentId) -> RepoResult<Vec<GradeLine>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params![student_id])?;
        let mut lines = Vec::new();
        while let Some(row) = rows.next()? {
            lines.push(parse_grade_line(row)?);
        }
        Ok(lines)
    }
}

impl GradeRepository for SqliteGradeRepository<'_> {
    fn add(
        &self,
        student_id: StudentId,
        subject_id: SubjectId,
        score: f64,
    ) -> RepoResult<GradeId> {
        validate_score(score)?;

        let term = self.subject_term(subject_id)?;
        if self.grade_exists(student_id, subject_id, term)? {
            return Err(RepoError::DuplicateGrade {
                student_id,
                subject_id,
                term,
            });
        }

        self.conn
            .execute(
                "INSERT INTO grades (student_id, subject_id, score, term)
                 VALUES (?1, ?2, ?3, ?4);",
                params![student_id, subject_id, score, term.as_db()],
            )
            .map_err(|err| {
                // Backstop for racing writers; the pre-check handles the
                // ordinary path.
                if is_unique_violation(&err) {
                    RepoError::DuplicateGrade {
                        student_id,
                        subject_id,
                        term,
                    }
                } else {
                    err.into()
                }
            })?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, id: GradeId) -> RepoResult<Option<Grade>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, student_id, subject_id, score, term FROM grades WHERE id = ?1;",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            let term = decode_term("grades", row.get("term")?)?;
            return Ok(Some(Grade {
                id: row.get("id")?,
                student_id: row.get("student_id")?,
                subject_id: row.get("subject_id")?,
                score: row.get("score")?,
                term,
            }));
        }
        Ok(None)
    }

    fn list_for_student(&self, student_id: StudentId) -> RepoResult<Vec<GradeLine>> {
        self.query_grade_lines(
            &format!("{GRADE_LINE_SELECT_SQL} ORDER BY m.year, m.name, g.term;"),
            student_id,
        )
    }

    fn transcript_lines(&self, student_id: StudentId) -> RepoResult<Vec<GradeLine>> {
        self.query_grade_lines(
            &format!("{GRADE_LINE_SELECT_SQL} ORDER BY m.year, g.term, m.name;"),
            student_id,
        )
    }

    fn update(
        &self,
        student_id: StudentId,
        subject_id: SubjectId,
        term: Term,
        new_score: f64,
        new_term: Term,
    ) -> RepoResult<()> {
        validate_score(new_score)?;

        let changed = self
            .conn
            .execute(
                "UPDATE grades SET score = ?1, term = ?2
                 WHERE student_id = ?3 AND subject_id = ?4 AND term = ?5;",
                params![
                    new_score,
                    new_term.as_db(),
                    student_id,
                    subject_id,
                    term.as_db(),
                ],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RepoError::DuplicateGrade {
                        student_id,
                        subject_id,
                        term: new_term,
                    }
                } else {
                    err.into()
                }
            })?;

        if changed == 0 {
            return Err(RepoError::GradeNotFound {
                student_id,
                subject_id,
                term,
            });
        }
        Ok(())
    }

    fn delete(&self, student_id: StudentId, subject_id: SubjectId, term: Term) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM grades
             WHERE student_id = ?1 AND subject_id = ?2 AND term = ?3;",
            params![student_id, subject_id, term.as_db()],
        )?;

        if changed == 0 {
            return Err(RepoError::GradeNotFound {
                student_id,
                subject_id,
                term,
            });
        }
        Ok(())
    }

    fn delete_by_id(&self, id: GradeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM grades WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "grade", id });
        }
        Ok(())
    }
}

fn parse_grade_line(row: &Row<'_>) -> RepoResult<GradeLine> {
    let term = decode_term("grades", row.get("term")?)?;
    Ok(GradeLine {
        subject_id: row.get("subject_id")?,
        subject_name: row.get("subject_name")?,
        score: row.get("score")?,
        term,
        credits: row.get("credits")?,
        year: row.get("year")?,
    })
}
