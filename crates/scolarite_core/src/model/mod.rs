//! Domain records for the student-records core.
//!
//! # Responsibility
//! - Define the canonical shapes for the six persisted record types.
//! - Own the field-level invariants enforced before every write.
//!
//! # Invariants
//! - Every persisted record is identified by a stable integer id assigned
//!   by storage, never by the caller.
//! - Deletion is hard delete; referential safety is guarded at the
//!   repository/storage layer, not by tombstones.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod records;
