use serde::Serialize;

use crate::attendance::report::{ReportRow, ReportStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub total: usize,
    pub on_time_count: usize,
    pub late_count: usize,
    pub absent_count: usize,
    pub on_time_percent: f64,
    pub late_percent: f64,
    pub absent_percent: f64,
}

impl AttendanceSummary {
    pub fn from_rows(rows: &[ReportRow]) -> Self {
        let mut summary = Self {
            total: rows.len(),
            ..Self::default()
        };
        for row in rows {
            match row.status {
                ReportStatus::OnTime => summary.on_time_count += 1,
                ReportStatus::Late => summary.late_count += 1,
                ReportStatus::Absent => summary.absent_count += 1,
            }
        }
        summary.on_time_percent = percent(summary.on_time_count, summary.total);
        summary.late_percent = percent(summary.late_count, summary.total);
        summary.absent_percent = percent(summary.absent_count, summary.total);
        summary
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, status: ReportStatus) -> ReportRow {
        ReportRow {
            student_id: id.to_string(),
            student_name: id.to_uppercase(),
            student_image_url: None,
            status,
            checkin_time: None,
            verified_by_face: false,
        }
    }

    #[test]
    fn test_empty_report_has_zero_percentages() {
        let summary = AttendanceSummary::from_rows(&[]);
        assert_eq!(summary, AttendanceSummary::default());
        assert_eq!(summary.on_time_percent, 0.0);
        assert_eq!(summary.late_percent, 0.0);
        assert_eq!(summary.absent_percent, 0.0);
    }

    #[test]
    fn test_counts_add_up_to_total() {
        let rows = vec![
            row("a", ReportStatus::OnTime),
            row("b", ReportStatus::Late),
            row("c", ReportStatus::Absent),
            row("d", ReportStatus::OnTime),
        ];
        let summary = AttendanceSummary::from_rows(&rows);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.on_time_count, 2);
        assert_eq!(summary.late_count, 1);
        assert_eq!(summary.absent_count, 1);
        assert_eq!(
            summary.on_time_count + summary.late_count + summary.absent_count,
            summary.total
        );
        assert_eq!(summary.on_time_percent, 50.0);
        assert_eq!(summary.late_percent, 25.0);
        assert_eq!(summary.absent_percent, 25.0);
    }
}
