//! Data types produced by the ranking stage.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Subject;
use crate::ranking::profile::Profile;

/// Final grade and outcome of one student in one subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubjectResult {
    pub(crate) grade: Option<f64>,
    pub(crate) result: Option<String>,
}

impl SubjectResult {
    pub fn new(grade: Option<f64>, result: Option<&str>) -> Self {
        Self {
            grade,
            result: result.map(str::to_string),
        }
    }

    pub fn grade(&self) -> Option<f64> {
        self.grade
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }
}

/// One student's consolidated row: per-subject results plus derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRanking {
    pub name: String,
    /// Aligned with [`Ranking::subjects`].
    pub subjects: Vec<SubjectResult>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub fail_count: usize,
    pub pass_count: usize,
    pub score: i64,
    pub profile: Profile,
}

/// Students sorted by ascending score, with the subject columns they share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub subjects: Vec<Subject>,
    pub students: Vec<StudentRanking>,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// The first `n` students, i.e. those most in need of intervention.
    pub fn head(&self, n: usize) -> &[StudentRanking] {
        &self.students[..n.min(self.students.len())]
    }
}

/// Summary of a pipeline run, printed to the console and optionally as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub anonymized: bool,
    pub total_students: usize,
    pub top: Vec<StudentRanking>,
}

impl RunSummary {
    pub const TOP_N: usize = 10;

    pub fn new(source: &str, anonymized: bool, ranking: &Ranking) -> Self {
        Self {
            generated_at: Utc::now(),
            source: source.to_string(),
            anonymized,
            total_students: ranking.len(),
            top: ranking.head(Self::TOP_N).to_vec(),
        }
    }
}
