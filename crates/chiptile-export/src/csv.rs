//! CSV export serializer for summary tables.
//!
//! Flattens a [`SummaryTable`] into an RFC 4180 CSV string: a fixed
//! header row, one row per feature record, and, when the table carries a
//! series indexer, one trailing column named after it.
//!
//! Optional values (pinout id, metrics of unquantified features, the
//! series index of single-chip summaries) serialize as empty cells.
//! Fields containing commas, quotes, or line breaks are quoted, with
//! embedded quotes doubled.
//!
//! This is a pure function with no I/O; it returns a `String`.

use std::fmt::Write;

use chiptile_collections::SummaryTable;

/// Header columns common to every summary table, in output order.
const BASE_HEADER: [&str; 15] = [
    "setup",
    "device",
    "tile_column",
    "tile_row",
    "channel",
    "exposure_ms",
    "kind",
    "feature_column",
    "feature_row",
    "id",
    "center_x",
    "center_y",
    "mean",
    "median",
    "area_px",
];

/// Serialize a summary table into a CSV string.
///
/// # Examples
///
/// ```
/// use chiptile_collections::SummaryTable;
/// use chiptile_export::to_csv;
///
/// let csv = to_csv(&SummaryTable::new(Vec::new()));
/// assert!(csv.starts_with("setup,device,"));
/// ```
#[must_use]
pub fn to_csv(table: &SummaryTable) -> String {
    let mut out = String::new();

    // --- Header row ---
    let mut columns: Vec<&str> = BASE_HEADER.to_vec();
    if let Some(indexer) = table.indexer.as_deref() {
        columns.push(indexer);
    }
    write_row(&mut out, columns.iter().map(|c| (*c).to_owned()));

    // --- Data rows ---
    for record in &table.records {
        let mut fields = vec![
            record.setup.clone(),
            record.device.clone(),
            record.tile_column.to_string(),
            record.tile_row.to_string(),
            record.channel.clone(),
            record.exposure_ms.to_string(),
            record.kind.to_string(),
            record.feature_column.to_string(),
            record.feature_row.to_string(),
            record.id.clone().unwrap_or_default(),
            record.center_x.to_string(),
            record.center_y.to_string(),
            record.mean.map(|v| v.to_string()).unwrap_or_default(),
            record.median.map(|v| v.to_string()).unwrap_or_default(),
            record.area_px.map(|v| v.to_string()).unwrap_or_default(),
        ];
        if table.indexer.is_some() {
            fields.push(
                record
                    .series_index
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        write_row(&mut out, fields);
    }

    out
}

/// Write one CSV row with CRLF termination, quoting fields as needed.
fn write_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        if field.contains([',', '"', '\n', '\r']) {
            let _ = write!(out, "\"{}\"", field.replace('"', "\"\""));
        } else {
            out.push_str(&field);
        }
    }
    out.push_str("\r\n");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chiptile_collections::{FeatureKind, SummaryRecord};

    fn record() -> SummaryRecord {
        SummaryRecord {
            setup: "s1".to_owned(),
            device: "d1".to_owned(),
            tile_column: 1,
            tile_row: 0,
            channel: "egfp".to_owned(),
            exposure_ms: 500,
            kind: FeatureKind::Chamber,
            feature_column: 3,
            feature_row: 2,
            id: Some("MBP-WT".to_owned()),
            center_x: 712.0,
            center_y: 88.0,
            mean: Some(140.25),
            median: Some(139.0),
            area_px: Some(81),
            series_index: None,
        }
    }

    #[test]
    fn empty_table_is_just_the_header() {
        let csv = to_csv(&SummaryTable::new(Vec::new()));
        assert_eq!(
            csv,
            "setup,device,tile_column,tile_row,channel,exposure_ms,kind,feature_column,\
             feature_row,id,center_x,center_y,mean,median,area_px\r\n",
        );
    }

    #[test]
    fn record_serializes_in_header_order() {
        let csv = to_csv(&SummaryTable::new(vec![record()]));
        let mut lines = csv.lines();
        lines.next().unwrap();
        assert_eq!(
            lines.next().unwrap(),
            "s1,d1,1,0,egfp,500,chamber,3,2,MBP-WT,712,88,140.25,139,81",
        );
    }

    #[test]
    fn indexer_adds_a_trailing_column() {
        let mut with_index = record();
        with_index.series_index = Some(30.0);
        let table = SummaryTable {
            indexer: Some("time_s".to_owned()),
            records: vec![with_index],
        };
        let csv = to_csv(&table);
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().ends_with(",area_px,time_s"));
        assert!(lines.next().unwrap().ends_with(",81,30"));
    }

    #[test]
    fn missing_optionals_are_empty_cells() {
        let mut bare = record();
        bare.id = None;
        bare.mean = None;
        bare.median = None;
        bare.area_px = None;
        let csv = to_csv(&SummaryTable::new(vec![bare]));
        let data_line = csv.lines().nth(1).unwrap();
        assert!(data_line.ends_with(",2,,712,88,,,"));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let mut tricky = record();
        tricky.id = Some("MBP, truncated \"v2\"".to_owned());
        let csv = to_csv(&SummaryTable::new(vec![tricky]));
        assert!(csv.contains("\"MBP, truncated \"\"v2\"\"\""));
    }
}
