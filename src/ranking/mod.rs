//! Student ranking and qualitative profiling.
//!
//! This module pivots subject records into one row per student, computes the
//! mean, standard deviation and pass/fail counts of each row, scores it and
//! assigns a pedagogical profile.

pub mod aggregate;
pub mod profile;
pub mod types;
pub mod utility;

pub use aggregate::{generate_ranking, score};
pub use profile::{Profile, classify};
pub use types::{Ranking, RunSummary, StudentRanking, SubjectResult};
