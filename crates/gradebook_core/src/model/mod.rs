//! Gradebook domain model.
//!
//! # Responsibility
//! - Define the canonical Student/Subject/Score records exchanged with callers.
//! - Own field-level validation shared by services and the wire layer.
//!
//! # Invariants
//! - Primary keys (`msv`, `ma_mon`) never change after creation.
//! - Derived fields (`diem_tb`, `so_luong_dang_ky`) are read projections and
//!   are never persisted.

pub mod key;
pub mod score;
pub mod student;
pub mod subject;
pub mod validation;
