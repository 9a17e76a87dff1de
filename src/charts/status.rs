use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{FONT, distinct_subjects, status_colour};
use crate::records::{APPROVED, FINAL_EXAM, GradeRecord, RETAINED, StatusField};

/// Outcome counts per subject, as drawn by [`plot_status`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatusCounts {
    pub subjects: Vec<String>,
    pub statuses: Vec<String>,
    /// `counts[subject][status]`
    pub counts: Vec<Vec<u32>>,
    /// Distinct students across all subjects, the percentage base.
    pub total_students: usize,
}

impl StatusCounts {
    pub fn from_records(records: &[GradeRecord], field: StatusField) -> Self {
        let subjects = distinct_subjects(records);

        let mut statuses: Vec<String> = Vec::new();
        for known in [APPROVED, FINAL_EXAM, RETAINED] {
            if records.iter().any(|r| r.status(field) == Some(known)) {
                statuses.push(known.to_string());
            }
        }
        for r in records {
            if let Some(s) = r.status(field) {
                if !statuses.iter().any(|k| k == s) {
                    statuses.push(s.to_string());
                }
            }
        }

        let mut counts = vec![vec![0u32; statuses.len()]; subjects.len()];
        for r in records {
            let Some(status) = r.status(field) else {
                continue;
            };
            let si = subjects.iter().position(|s| *s == r.subject);
            let ki = statuses.iter().position(|k| k == status);
            if let (Some(si), Some(ki)) = (si, ki) {
                counts[si][ki] += 1;
            }
        }

        let total_students = records
            .iter()
            .map(|r| r.name.as_str())
            .collect::<HashSet<_>>()
            .len();

        Self {
            subjects,
            statuses,
            counts,
            total_students,
        }
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Share of distinct students, in percent.
    pub fn percentage(&self, count: u32) -> f64 {
        if self.total_students == 0 {
            0.0
        } else {
            100.0 * count as f64 / self.total_students as f64
        }
    }
}

/// Draws a grouped bar chart of outcome counts per subject.
///
/// Each subject occupies one slot per status plus a spacer slot; every bar
/// is annotated with its count and its share of distinct students.
pub fn plot_status(
    records: &[GradeRecord],
    field: StatusField,
    title: &str,
    path: &Path,
) -> Result<()> {
    let data = StatusCounts::from_records(records, field);
    let group = data.statuses.len().max(1) as u32 + 1;
    let slots = data.subjects.len().max(1) as u32 * group;
    let y_max = (data.max_count() as f64 * 1.2).ceil() as u32 + 1;

    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 28).into_font().style(FontStyle::Bold))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..slots).into_segmented(), 0u32..y_max)?;

    let subjects = data.subjects.clone();
    let label_slot = (group - 1) / 2;
    let x_labels = move |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(j) if j % group == label_slot => subjects
            .get((j / group) as usize)
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots as usize)
        .x_label_formatter(&x_labels)
        .x_desc("Subject Area")
        .y_desc("Student Count")
        .draw()?;

    let annotation = TextStyle::from((FONT, 13).into_font().style(FontStyle::Bold))
        .pos(Pos::new(HPos::Center, VPos::Bottom));

    for (ki, status) in data.statuses.iter().enumerate() {
        let colour = status_colour(status);
        let bars = data.counts.iter().enumerate().map(|(si, row)| {
            let j = si as u32 * group + ki as u32;
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(j), 0),
                    (SegmentValue::Exact(j + 1), row[ki]),
                ],
                colour.filled(),
            );
            bar.set_margin(0, 0, 2, 2);
            bar
        });

        chart
            .draw_series(bars)?
            .label(status.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], colour.filled()));

        let labels = data
            .counts
            .iter()
            .enumerate()
            .filter(|(_, row)| row[ki] > 0)
            .map(|(si, row)| {
                let j = si as u32 * group + ki as u32;
                Text::new(
                    format!("{} ({:.1}%)", row[ki], data.percentage(row[ki])),
                    (SegmentValue::CenterOf(j), row[ki]),
                    annotation.clone(),
                )
            });
        chart.draw_series(labels)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
