//! Bulk advisor import and export.

pub mod advisor_reader;
pub mod advisor_writer;
