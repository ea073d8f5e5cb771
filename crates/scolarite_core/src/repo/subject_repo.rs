//! Subject repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `subjects`, scoped listings per program.
//!
//! # Invariants
//! - Every subject belongs to exactly one program, year and term.
//! - Per-program listing order is year then subject name, matching the
//!   subjects management table.

use crate::model::records::{ProgramId, Subject, SubjectDraft, SubjectId};
use crate::repo::{
    decode_term, ensure_connection_ready, is_foreign_key_violation, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const SUBJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    credits,
    program_id,
    year,
    term
FROM subjects";

/// Repository interface for subject CRUD.
pub trait SubjectRepository {
    fn create(&self, draft: &SubjectDraft) -> RepoResult<SubjectId>;
    fn get(&self, id: SubjectId) -> RepoResult<Option<Subject>>;
    fn list(&self) -> RepoResult<Vec<Subject>>;
    /// Lists the subjects of one program ordered by year then name.
    fn list_for_program(&self, program_id: ProgramId) -> RepoResult<Vec<Subject>>;
    fn update(&self, id: SubjectId, draft: &SubjectDraft) -> RepoResult<()>;
    fn delete(&self, id: SubjectId) -> RepoResult<()>;
}

/// SQLite-backed subject repository.
pub struct SqliteSubjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubjectRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SubjectRepository for SqliteSubjectRepository<'_> {
    fn create(&self, draft: &SubjectDraft) -> RepoResult<SubjectId> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO subjects (name, credits, program_id, year, term)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                draft.name,
                draft.credits,
                draft.program_id,
                draft.year,
                draft.term.as_db(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, id: SubjectId) -> RepoResult<Option<Subject>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subject_row(row)?));
        }
        Ok(None)
    }

    fn list(&self) -> RepoResult<Vec<Subject>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUBJECT_SELECT_SQL} ORDER BY program_id, year, name;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            subjects.push(parse_subject_row(row)?);
        }
        Ok(subjects)
    }

    fn list_for_program(&self, program_id: ProgramId) -> RepoResult<Vec<Subject>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SUBJECT_SELECT_SQL} WHERE program_id = ?1 ORDER BY year, name;"
        ))?;
        let mut rows = stmt.query(params![program_id])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            subjects.push(parse_subject_row(row)?);
        }
        Ok(subjects)
    }

    fn update(&self, id: SubjectId, draft: &SubjectDraft) -> RepoResult<()> {
        draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE subjects
             SET name = ?1, credits = ?2, program_id = ?3, year = ?4, term = ?5
             WHERE id = ?6;",
            params![
                draft.name,
                draft.credits,
                draft.program_id,
                draft.year,
                draft.term.as_db(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "subject",
                id,
            });
        }
        Ok(())
    }

    fn delete(&self, id: SubjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM subjects WHERE id = ?1;", params![id])
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    RepoError::HasDependents {
                        entity: "subject",
                        id,
                    }
                } else {
                    err.into()
                }
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "subject",
                id,
            });
        }
        Ok(())
    }
}

fn parse_subject_row(row: &Row<'_>) -> RepoResult<Subject> {
    let term = decode_term("subjects", row.get("term")?)?;
    Ok(Subject {
        id: row.get("id")?,
        name: row.get("name")?,
        credits: row.get("credits")?,
        program_id: row.get("program_id")?,
        year: row.get("year")?,
        term,
    })
}
