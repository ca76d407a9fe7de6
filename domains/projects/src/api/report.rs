//! Detailed metrics report writer
//!
//! Builds the CSV body for the downloadable report: title and
//! generation-date rows, a two-row header (per-date and per-page-path
//! column groups plus a trailing TOTAL group), then the data sections —
//! participants, followers, and non-participants (previous followers
//! followed by the unauthenticated aggregate).

use chrono::NaiveDate;

use peerhub_common::{Error, Result};
use peerhub_metrics::{DetailRow, MetricsAxes};

/// Per-user column group headers, one group per date plus TOTAL.
const PER_USER_HEADERS: [&str; 5] = [
    "Time on Course Pages",
    "Non-Zero Length Views",
    "Zero Length Views",
    "Comments",
    "Task Edits",
];

/// Per-page column group headers, one group per page path.
const PER_PAGE_HEADERS: [&str; 3] = ["Time on Page", "Non-Zero Length Views", "Zero Length Views"];

/// The four data sections of the report, in order.
#[derive(Debug, Clone, Default)]
pub struct ReportSections {
    pub participants: Vec<DetailRow>,
    pub followers: Vec<DetailRow>,
    pub previous_followers: Vec<DetailRow>,
    pub unauth: Vec<DetailRow>,
}

/// Build the CSV body of the detailed report.
pub fn build_detailed_csv(
    project_name: &str,
    generated_on: NaiveDate,
    axes: &MetricsAxes,
    sections: &ReportSections,
) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    let write = |writer: &mut csv::Writer<Vec<u8>>, record: &[String]| {
        writer
            .write_record(record)
            .map_err(|e| Error::Internal(format!("Failed to write report row: {}", e)))
    };

    write(&mut writer, &[format!("Course: {}", project_name)])?;
    write(
        &mut writer,
        &[format!(
            "Data generated: {}",
            generated_on.format("%b %d, %Y")
        )],
    )?;
    write(&mut writer, &[String::new()])?;

    write(&mut writer, &first_header_row(axes))?;
    write(&mut writer, &second_header_row(axes))?;

    write(&mut writer, &["Participants".to_string()])?;
    for row in &sections.participants {
        write(&mut writer, &data_row(row))?;
    }

    write(&mut writer, &["Followers".to_string()])?;
    for row in &sections.followers {
        write(&mut writer, &data_row(row))?;
    }

    write(&mut writer, &["Non-Participants".to_string()])?;
    for row in &sections.previous_followers {
        write(&mut writer, &data_row(row))?;
    }
    for row in &sections.unauth {
        write(&mut writer, &data_row(row))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Internal(format!("Failed to finish report: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Internal(format!("Report is not UTF-8: {}", e)))
}

/// First header row: `Users`, then per group the group label followed by
/// blanks under the per-user columns and each page path followed by
/// blanks under its per-page columns.
fn first_header_row(axes: &MetricsAxes) -> Vec<String> {
    let mut row = vec!["Users".to_string()];

    let mut labels: Vec<String> = axes
        .dates
        .iter()
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect();
    labels.push("TOTAL".to_string());

    for label in labels {
        row.push(label);
        row.extend(std::iter::repeat(String::new()).take(PER_USER_HEADERS.len() - 1));
        for path in &axes.page_paths {
            row.push(path.clone());
            row.extend(std::iter::repeat(String::new()).take(PER_PAGE_HEADERS.len() - 1));
        }
    }

    row
}

/// Second header row: the per-user and per-page column names, repeated
/// for every date group and for TOTAL.
fn second_header_row(axes: &MetricsAxes) -> Vec<String> {
    let mut row = vec![String::new()];

    for _ in 0..=axes.dates.len() {
        row.extend(PER_USER_HEADERS.iter().map(|h| h.to_string()));
        for _ in &axes.page_paths {
            row.extend(PER_PAGE_HEADERS.iter().map(|h| h.to_string()));
        }
    }

    row
}

fn data_row(row: &DetailRow) -> Vec<String> {
    let mut record = Vec::with_capacity(row.cells.len() + 1);
    record.push(row.username.clone());
    record.extend(row.cells.iter().cloned());
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes() -> MetricsAxes {
        MetricsAxes {
            dates: vec!["2026-08-01".parse().unwrap(), "2026-08-02".parse().unwrap()],
            page_paths: vec!["intro".to_string(), "week-1".to_string()],
        }
    }

    fn group_width(axes: &MetricsAxes) -> usize {
        PER_USER_HEADERS.len() + PER_PAGE_HEADERS.len() * axes.page_paths.len()
    }

    fn detail_row(username: &str, axes: &MetricsAxes) -> DetailRow {
        DetailRow {
            username: username.to_string(),
            cells: vec!["0".to_string(); (axes.dates.len() + 1) * group_width(axes)],
        }
    }

    #[test]
    fn test_header_rows_have_matching_width() {
        let axes = axes();
        let first = first_header_row(&axes);
        let second = second_header_row(&axes);

        // Users column + one group per date + the TOTAL group
        let expected = 1 + (axes.dates.len() + 1) * group_width(&axes);
        assert_eq!(first.len(), expected);
        assert_eq!(second.len(), expected);
    }

    #[test]
    fn test_first_header_row_group_labels() {
        let axes = axes();
        let row = first_header_row(&axes);

        assert_eq!(row[0], "Users");
        assert_eq!(row[1], "2026-08-01");
        // Page paths appear after the per-user blanks of each group
        assert_eq!(row[1 + PER_USER_HEADERS.len()], "intro");
        assert_eq!(
            row[1 + PER_USER_HEADERS.len() + PER_PAGE_HEADERS.len()],
            "week-1"
        );
        // Second group starts with the second date
        assert_eq!(row[1 + group_width(&axes)], "2026-08-02");
        // Final group is TOTAL
        assert_eq!(row[1 + 2 * group_width(&axes)], "TOTAL");
    }

    #[test]
    fn test_second_header_row_repeats_column_names() {
        let axes = axes();
        let row = second_header_row(&axes);

        assert_eq!(row[0], "");
        assert_eq!(row[1], "Time on Course Pages");
        assert_eq!(row[1 + PER_USER_HEADERS.len()], "Time on Page");
        // The TOTAL group repeats the same names
        assert_eq!(row[1 + 2 * group_width(&axes)], "Time on Course Pages");
    }

    #[test]
    fn test_report_sections_in_order() {
        let axes = axes();
        let sections = ReportSections {
            participants: vec![detail_row("maria", &axes)],
            followers: vec![detail_row("omar", &axes)],
            previous_followers: vec![detail_row("lena", &axes)],
            unauth: vec![detail_row("Anonymous", &axes)],
        };

        let csv = build_detailed_csv(
            "Intro to Testing",
            "2026-08-06".parse().unwrap(),
            &axes,
            &sections,
        )
        .unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Course: Intro to Testing");
        assert_eq!(lines[1], "Data generated: Aug 06, 2026");
        assert_eq!(lines[2], "\"\"");

        let participants_at = lines.iter().position(|l| *l == "Participants").unwrap();
        let followers_at = lines.iter().position(|l| *l == "Followers").unwrap();
        let non_participants_at = lines.iter().position(|l| *l == "Non-Participants").unwrap();
        assert!(participants_at < followers_at);
        assert!(followers_at < non_participants_at);

        assert!(lines[participants_at + 1].starts_with("maria,"));
        assert!(lines[non_participants_at + 1].starts_with("lena,"));
        assert!(lines[non_participants_at + 2].starts_with("Anonymous,"));
    }

    #[test]
    fn test_report_handles_empty_axes() {
        let axes = MetricsAxes::default();
        let csv = build_detailed_csv(
            "Quiet Course",
            "2026-08-06".parse().unwrap(),
            &axes,
            &ReportSections::default(),
        )
        .unwrap();

        // Header still carries the Users column and one TOTAL group
        let header_line = csv.lines().nth(3).unwrap();
        assert!(header_line.starts_with("Users,TOTAL"));
    }
}
