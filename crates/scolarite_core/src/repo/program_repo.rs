//! Program repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `programs` plus the department-joined listing used by the
//!   programs overview table.
//!
//! # Invariants
//! - `department_id`, when set, must reference an existing department;
//!   SQLite enforces it through the declared foreign key.

use crate::model::records::{Program, ProgramDraft, ProgramId};
use crate::repo::{
    ensure_connection_ready, is_foreign_key_violation, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

/// One row of the programs overview: the program joined with its
/// department's display name (absent when the program is unattached).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramOverview {
    pub id: ProgramId,
    pub name: String,
    pub year_count: i64,
    pub department_name: Option<String>,
}

/// Repository interface for program CRUD.
pub trait ProgramRepository {
    fn create(&self, draft: &ProgramDraft) -> RepoResult<ProgramId>;
    fn get(&self, id: ProgramId) -> RepoResult<Option<Program>>;
    fn list(&self) -> RepoResult<Vec<Program>>;
    /// Lists all programs joined with their department name.
    fn list_with_department(&self) -> RepoResult<Vec<ProgramOverview>>;
    fn update(&self, id: ProgramId, draft: &ProgramDraft) -> RepoResult<()>;
    fn delete(&self, id: ProgramId) -> RepoResult<()>;
}

/// SQLite-backed program repository.
pub struct SqliteProgramRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProgramRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProgramRepository for SqliteProgramRepository<'_> {
    fn create(&self, draft: &ProgramDraft) -> RepoResult<ProgramId> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO programs (name, year_count, department_id) VALUES (?1, ?2, ?3);",
            params![draft.name, draft.year_count, draft.department_id],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, id: ProgramId) -> RepoResult<Option<Program>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, year_count, department_id FROM programs WHERE id = ?1;",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_program_row(row)?));
        }
        Ok(None)
    }

    fn list(&self) -> RepoResult<Vec<Program>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, year_count, department_id FROM programs ORDER BY id;",
        )?;
        let mut rows = stmt.query([])?;
        let mut programs = Vec::new();
        while let Some(row) = rows.next()? {
            programs.push(parse_program_row(row)?);
        }
        Ok(programs)
    }

    fn list_with_department(&self) -> RepoResult<Vec<ProgramOverview>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.name, p.year_count, d.name AS department_name
             FROM programs p
             LEFT JOIN departments d ON p.department_id = d.id
             ORDER BY p.id;",
        )?;
        let mut rows = stmt.query([])?;
        let mut overview = Vec::new();
        while let Some(row) = rows.next()? {
            overview.push(ProgramOverview {
                id: row.get("id")?,
                name: row.get("name")?,
                year_count: row.get("year_count")?,
                department_name: row.get("department_name")?,
            });
        }
        Ok(overview)
    }

    fn update(&self, id: ProgramId, draft: &ProgramDraft) -> RepoResult<()> {
        draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE programs SET name = ?1, year_count = ?2, department_id = ?3 WHERE id = ?4;",
            params![draft.name, draft.year_count, draft.department_id, id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "program",
                id,
            });
        }
        Ok(())
    }

    fn delete(&self, id: ProgramId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM programs WHERE id = ?1;", params![id])
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    RepoError::HasDependents {
                        entity: "program",
                        id,
                    }
                } else {
                    err.into()
                }
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "program",
                id,
            });
        }
        Ok(())
    }
}

fn parse_program_row(row: &Row<'_>) -> RepoResult<Program> {
    Ok(Program {
        id: row.get("id")?,
        name: row.get("name")?,
        year_count: row.get("year_count")?,
        department_id: row.get("department_id")?,
    })
}
