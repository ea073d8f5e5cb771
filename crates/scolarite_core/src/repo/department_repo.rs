//! Department repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `departments` with the name-uniqueness guarantee.
//!
//! # Invariants
//! - `create`/`update` validate the draft before SQL mutations.
//! - Department names are unique; violations surface as `DuplicateKey`.

use crate::model::records::{Department, DepartmentDraft, DepartmentId};
use crate::repo::{
    ensure_connection_ready, is_foreign_key_violation, is_unique_violation, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

/// Repository interface for department CRUD.
pub trait DepartmentRepository {
    fn create(&self, draft: &DepartmentDraft) -> RepoResult<DepartmentId>;
    fn get(&self, id: DepartmentId) -> RepoResult<Option<Department>>;
    fn list(&self) -> RepoResult<Vec<Department>>;
    fn update(&self, id: DepartmentId, draft: &DepartmentDraft) -> RepoResult<()>;
    fn delete(&self, id: DepartmentId) -> RepoResult<()>;
}

/// SQLite-backed department repository.
pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn create(&self, draft: &DepartmentDraft) -> RepoResult<DepartmentId> {
        draft.validate()?;

        self.conn
            .execute(
                "INSERT INTO departments (name, description) VALUES (?1, ?2);",
                params![draft.name, draft.description],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RepoError::DuplicateKey {
                        entity: "department",
                        field: "name",
                        value: draft.name.clone(),
                    }
                } else {
                    err.into()
                }
            })?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, id: DepartmentId) -> RepoResult<Option<Department>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description FROM departments WHERE id = ?1;",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_department_row(row)?));
        }
        Ok(None)
    }

    fn list(&self) -> RepoResult<Vec<Department>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description FROM departments ORDER BY id;",
        )?;
        let mut rows = stmt.query([])?;
        let mut departments = Vec::new();
        while let Some(row) = rows.next()? {
            departments.push(parse_department_row(row)?);
        }
        Ok(departments)
    }

    fn update(&self, id: DepartmentId, draft: &DepartmentDraft) -> RepoResult<()> {
        draft.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE departments SET name = ?1, description = ?2 WHERE id = ?3;",
                params![draft.name, draft.description, id],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RepoError::DuplicateKey {
                        entity: "department",
                        field: "name",
                        value: draft.name.clone(),
                    }
                } else {
                    err.into()
                }
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "department",
                id,
            });
        }
        Ok(())
    }

    fn delete(&self, id: DepartmentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM departments WHERE id = ?1;", params![id])
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    RepoError::HasDependents {
                        entity: "department",
                        id,
                    }
                } else {
                    err.into()
                }
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "department",
                id,
            });
        }
        Ok(())
    }
}

fn parse_department_row(row: &Row<'_>) -> RepoResult<Department> {
    Ok(Department {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
    })
}
