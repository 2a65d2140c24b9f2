//! File-backed snapshot persistence for Meridian sessions.
//!
//! A single JSON document holds the latest [`StoredSnapshot`]. Writes go to a
//! sibling temp file first and are renamed into place, so a crash mid-save
//! leaves the previous snapshot intact.

pub mod file_snapshot_repository;

pub use file_snapshot_repository::FileSnapshotRepository;
