use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::config::Subject;
use crate::error::{PipelineError, Result};
use crate::ranking::profile::classify;
use crate::ranking::types::{Ranking, StudentRanking, SubjectResult};
use crate::ranking::utility::{mean, round2, stddev};
use crate::records::{APPROVED, GradeRecord, RETAINED};

/// Points per passed subject.
pub const PASS_POINTS: i64 = 3;
/// Points per failed subject.
pub const FAIL_POINTS: i64 = -5;

/// Weighted score: 3 per pass, -5 per failure.
pub fn score(pass_count: usize, fail_count: usize) -> i64 {
    pass_count as i64 * PASS_POINTS + fail_count as i64 * FAIL_POINTS
}

/// Pivots subject records into one row per student, ordered by name.
///
/// Records for subjects outside `subjects` are ignored. A student with two
/// records for the same subject is rejected.
pub fn pivot(records: &[GradeRecord], subjects: &[Subject]) -> Result<Vec<(String, Vec<SubjectResult>)>> {
    let column: HashMap<&str, usize> = subjects
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name.as_str(), i))
        .collect();

    let mut rows: BTreeMap<&str, Vec<Option<SubjectResult>>> = BTreeMap::new();

    for record in records {
        let Some(&idx) = column.get(record.subject.as_str()) else {
            debug!(subject = %record.subject, "Record for unconfigured subject skipped");
            continue;
        };

        let row = rows
            .entry(record.name.as_str())
            .or_insert_with(|| vec![None; subjects.len()]);

        if row[idx].is_some() {
            return Err(PipelineError::DuplicateEntry {
                name: record.name.clone(),
                subject: record.subject.clone(),
            });
        }

        row[idx] = Some(SubjectResult::new(
            record.final_avg,
            record.final_result.as_deref(),
        ));
    }

    Ok(rows
        .into_iter()
        .map(|(name, row)| {
            (
                name.to_string(),
                row.into_iter().map(Option::unwrap_or_default).collect(),
            )
        })
        .collect())
}

/// Computes counts, statistics, score and profile for one pivoted row.
pub fn rank_student(name: String, subjects: Vec<SubjectResult>) -> StudentRanking {
    let count = |label: &str| subjects.iter().filter(|s| s.result() == Some(label)).count();
    let fail_count = count(RETAINED);
    let pass_count = count(APPROVED);

    let grades: Vec<f64> = subjects.iter().filter_map(SubjectResult::grade).collect();
    let avg = mean(&grades);
    let sd = avg.and_then(|m| stddev(&grades, m));

    let avg = avg.map(round2);
    let sd = sd.map(round2);

    StudentRanking {
        name,
        subjects,
        mean: avg,
        std_dev: sd,
        fail_count,
        pass_count,
        score: score(pass_count, fail_count),
        profile: classify(avg, sd, fail_count),
    }
}

/// Builds the ranking, sorted by ascending score so the students most in
/// need of intervention come first. Ties keep name order.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn generate_ranking(records: &[GradeRecord], subjects: &[Subject]) -> Result<Ranking> {
    let mut students: Vec<StudentRanking> = pivot(records, subjects)?
        .into_iter()
        .map(|(name, row)| rank_student(name, row))
        .collect();

    students.sort_by_key(|s| s.score);

    debug!(students = students.len(), "Ranking generated");

    Ok(Ranking {
        subjects: subjects.to_vec(),
        students,
    })
}
