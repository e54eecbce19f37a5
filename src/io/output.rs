use std::io::Write;

use anyhow::{Context, Result};

use crate::models::ResolvedRecord;

/// UTF-8 byte-order mark, written ahead of CSV output for spreadsheet tools
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write records as CSV. The header row is always written, so an empty
/// corpus still yields a well-formed table. Absent values are empty fields.
pub fn write_csv<W: Write>(
    mut writer: W,
    records: &[ResolvedRecord],
    byte_order_mark: bool,
) -> Result<()> {
    if byte_order_mark {
        writer.write_all(UTF8_BOM).context("Failed to write byte-order mark")?;
    }

    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(ResolvedRecord::COLUMNS)
        .context("Failed to write CSV header")?;
    for record in records {
        csv.serialize(record).context("Failed to write CSV row")?;
    }
    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write records as JSON Lines, one object per record
pub fn write_json_lines<W: Write>(mut writer: W, records: &[ResolvedRecord]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record).context("Failed to write JSON record")?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ResolvedRecord {
        ResolvedRecord {
            speaker_id: Some("S1".into()),
            debate_title: Some("Budget, Debate".into()),
            text: "Hello \"house\"".into(),
            year: Some("2020".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[record()], false).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let mut lines = out.lines();

        assert_eq!(lines.next().unwrap(), ResolvedRecord::COLUMNS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            r#"S1,,"Budget, Debate","Hello ""house""",,2020,,,,,,"#
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_csv_bom_and_empty() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[], true).unwrap();

        assert!(buf.starts_with(UTF8_BOM));
        let out = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(out.trim_end(), ResolvedRecord::COLUMNS.join(","));
    }

    #[test]
    fn test_write_json_lines() {
        let mut buf = Vec::new();
        write_json_lines(&mut buf, &[record(), record()]).unwrap();
        let out = String::from_utf8(buf).unwrap();

        assert_eq!(out.lines().count(), 2);
        let first: serde_json::Value = serde_json::from_str(out.lines().next().unwrap()).unwrap();
        assert_eq!(first["speaker_id"], "S1");
        assert!(first["party_id"].is_null());
    }
}
