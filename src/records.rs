use serde::{Deserialize, Serialize};

/// Outcome label for a passed subject.
pub const APPROVED: &str = "Aprovado";
/// Outcome label for a failed subject.
pub const RETAINED: &str = "Retido (Nota)";
/// Partial outcome label for students sent to the recovery exam.
pub const FINAL_EXAM: &str = "Exame Final";

/// One student's row from one subject sheet, after cleaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub name: String,
    pub subject: String,

    // grades
    pub third_term: Option<f64>,
    pub fourth_term: Option<f64>,
    pub semester_avg: Option<f64>,
    pub final_exam: Option<f64>,
    pub final_avg: Option<f64>,

    // outcomes
    pub partial_result: Option<String>,
    pub final_result: Option<String>,
}

/// Which outcome column a status chart reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    Partial,
    Final,
}

/// Which grade column a distribution chart reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeField {
    FinalExam,
    FinalAvg,
}

impl GradeRecord {
    pub fn new(name: &str, subject: &str) -> Self {
        GradeRecord {
            name: name.to_string(),
            subject: subject.to_string(),
            ..Default::default()
        }
    }

    pub fn status(&self, field: StatusField) -> Option<&str> {
        match field {
            StatusField::Partial => self.partial_result.as_deref(),
            StatusField::Final => self.final_result.as_deref(),
        }
    }

    pub fn grade(&self, field: GradeField) -> Option<f64> {
        match field {
            GradeField::FinalExam => self.final_exam,
            GradeField::FinalAvg => self.final_avg,
        }
    }

    pub fn in_recovery(&self) -> bool {
        self.partial_result.as_deref() == Some(FINAL_EXAM)
    }

    /// Set the final average and final outcome.
    pub fn with_final(mut self, final_avg: f64, final_result: &str) -> Self {
        self.final_avg = Some(final_avg);
        self.final_result = Some(final_result.to_string());
        self
    }
}
