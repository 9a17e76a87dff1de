use std::f64::consts::PI;
use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use super::{FONT, distinct_subjects};
use crate::ranking::utility::{mean, stddev};
use crate::records::{GradeField, GradeRecord};

/// Histogram range on the grade scale; bins are one point wide.
pub const BIN_LOW: f64 = 0.0;
pub const BIN_HIGH: f64 = 11.0;
pub const BIN_WIDTH: f64 = 1.0;

const KDE_STEP: f64 = 0.05;

/// Counts values into unit bins over `[0, 11]`. The last bin is closed;
/// values outside the range are dropped.
pub fn histogram(values: &[f64]) -> Vec<u32> {
    let bins = ((BIN_HIGH - BIN_LOW) / BIN_WIDTH) as usize;
    let mut counts = vec![0u32; bins];
    for &v in values {
        if !(BIN_LOW..=BIN_HIGH).contains(&v) {
            continue;
        }
        let idx = (((v - BIN_LOW) / BIN_WIDTH) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

/// Gaussian kernel density estimate with Scott's bandwidth, scaled to
/// histogram counts. `None` when the values cannot support a bandwidth.
pub fn kde_curve(values: &[f64]) -> Option<Vec<(f64, f64)>> {
    let n = values.len();
    let avg = mean(values)?;
    let sd = stddev(values, avg)?;
    if sd == 0.0 {
        return None;
    }

    let h = sd * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * h * (2.0 * PI).sqrt());
    let scale = n as f64 * BIN_WIDTH;

    let steps = ((BIN_HIGH - BIN_LOW) / KDE_STEP).round() as usize;
    let curve = (0..=steps)
        .map(|i| {
            let x = BIN_LOW + i as f64 * KDE_STEP;
            let density = norm
                * values
                    .iter()
                    .map(|xi| (-0.5 * ((x - xi) / h).powi(2)).exp())
                    .sum::<f64>();
            (x, density * scale)
        })
        .collect();
    Some(curve)
}

/// Draws one histogram panel per subject with a shared count axis.
pub fn plot_distributions(
    records: &[GradeRecord],
    field: GradeField,
    title: &str,
    path: &Path,
    colour: RGBColor,
) -> Result<()> {
    let subjects = distinct_subjects(records);
    let series: Vec<Vec<f64>> = subjects
        .iter()
        .map(|s| {
            records
                .iter()
                .filter(|r| &r.subject == s)
                .filter_map(|r| r.grade(field))
                .collect()
        })
        .collect();

    let hists: Vec<Vec<u32>> = series.iter().map(|v| histogram(v)).collect();
    let curves: Vec<Option<Vec<(f64, f64)>>> = series.iter().map(|v| kde_curve(v)).collect();

    let top_bar = hists.iter().flatten().copied().max().unwrap_or(0) as f64;
    let top_curve = curves
        .iter()
        .flatten()
        .flat_map(|c| c.iter().map(|(_, y)| *y))
        .fold(0.0, f64::max);
    let y_max = top_bar.max(top_curve) * 1.1 + 1.0;

    let root = BitMapBackend::new(path, (2000, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(title, (FONT, 32).into_font().style(FontStyle::Bold))?;

    let panels = root.split_evenly((1, subjects.len().max(1)));

    for (i, subject) in subjects.iter().enumerate() {
        let mut chart = ChartBuilder::on(&panels[i])
            .caption(subject, (FONT, 22).into_font().style(FontStyle::Bold))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(if i == 0 { 50 } else { 30 })
            .build_cartesian_2d(BIN_LOW..BIN_HIGH, 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(11)
            .x_label_formatter(&|x| format!("{x:.0}"))
            .x_desc("Final Grade")
            .y_desc("Count")
            .draw()?;

        chart.draw_series(hists[i].iter().enumerate().map(|(b, &count)| {
            let lo = BIN_LOW + b as f64 * BIN_WIDTH;
            Rectangle::new([(lo, 0.0), (lo + BIN_WIDTH, count as f64)], colour.mix(0.7).filled())
        }))?;
        chart.draw_series(hists[i].iter().enumerate().map(|(b, &count)| {
            let lo = BIN_LOW + b as f64 * BIN_WIDTH;
            Rectangle::new([(lo, 0.0), (lo + BIN_WIDTH, count as f64)], BLACK.stroke_width(1))
        }))?;

        if let Some(curve) = &curves[i] {
            chart.draw_series(LineSeries::new(curve.iter().copied(), colour.stroke_width(3)))?;
        }
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_unit_bins() {
        let counts = histogram(&[0.0, 0.5, 4.99, 5.0, 10.0, 11.0]);
        assert_eq!(counts.len(), 11);
        assert_eq!(counts[0], 2);
        assert_eq!(counts[4], 1);
        assert_eq!(counts[5], 1);
        // 10.0 and the closed upper edge share the last bin
        assert_eq!(counts[10], 2);
    }

    #[test]
    fn test_histogram_drops_out_of_range() {
        let counts = histogram(&[-1.0, 12.0, f64::NAN]);
        assert_eq!(counts.iter().sum::<u32>(), 0);
    }

    #[test]
    fn test_kde_needs_spread() {
        assert!(kde_curve(&[]).is_none());
        assert!(kde_curve(&[7.0]).is_none());
        assert!(kde_curve(&[7.0, 7.0, 7.0]).is_none());
    }

    #[test]
    fn test_kde_area_matches_count() {
        let values = [4.0, 5.0, 5.5, 6.0, 7.5];
        let curve = kde_curve(&values).unwrap();

        // Riemann sum over the grid approximates n * bin width
        let area: f64 = curve.iter().map(|(_, y)| y * KDE_STEP).sum();
        assert!((area - values.len() as f64).abs() < 0.25, "area = {area}");

        let peak = curve
            .iter()
            .cloned()
            .fold((0.0, 0.0), |a, b| if b.1 > a.1 { b } else { a });
        assert!(peak.0 > 4.5 && peak.0 < 6.5);
    }
}
