//! CSV tables: supplied sample points in, result tables out

use crate::error::{Error, Result};
use crate::vector::{AttributeValue, SamplePoint};
use std::path::Path;

/// Read sample points from a CSV file with a header row.
///
/// `x_column` and `y_column` name the coordinate columns; an `id` column is
/// used as point id when present, otherwise the 0-based row number. Every
/// other column becomes an attribute, parsed as a number when possible.
pub fn read_sample_points<P: AsRef<Path>>(
    path: P,
    x_column: &str,
    y_column: &str,
) -> Result<Vec<SamplePoint>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let headers = reader.headers()?.clone();

    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| Error::Vector(format!("column '{name}' not found in {}", path.as_ref().display())))
    };
    let x_idx = find(x_column)?;
    let y_idx = find(y_column)?;
    let id_idx = headers.iter().position(|h| h.trim() == "id");

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let coord = |idx: usize, name: &str| -> Result<f64> {
            let raw = record.get(idx).unwrap_or_default().trim();
            raw.parse::<f64>().map_err(|_| {
                Error::Vector(format!("row {row}: invalid {name} coordinate '{raw}'"))
            })
        };
        let x = coord(x_idx, x_column)?;
        let y = coord(y_idx, y_column)?;
        let id = id_idx
            .and_then(|i| record.get(i))
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| row.to_string());

        let mut point = SamplePoint::new(id, x, y);
        for (idx, (header, value)) in headers.iter().zip(record.iter()).enumerate() {
            if idx == x_idx || idx == y_idx || Some(idx) == id_idx {
                continue;
            }
            point.set_property(header.trim(), AttributeValue::parse(value));
        }
        points.push(point);
    }

    Ok(points)
}

/// Write a CSV table with a header row
pub fn write_table<P, I>(path: P, headers: &[&str], rows: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_points_with_attributes() {
        let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "id,x,y,Results Positive,species").unwrap();
        writeln!(file, "A1,391000.5,5061000,1,bovine").unwrap();
        writeln!(file, "A2,392000,5062000,0,ovine").unwrap();
        file.flush().unwrap();

        let points = read_sample_points(file.path(), "x", "y").unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id, "A1");
        assert_eq!(points[0].x, 391000.5);
        assert_eq!(points[0].get_property("Results Positive"), Some(&AttributeValue::Int(1)));
        assert_eq!(
            points[1].get_property("species"),
            Some(&AttributeValue::String("ovine".into()))
        );
        assert!(points[0].get_property("x").is_none());
    }

    #[test]
    fn test_missing_coordinate_column() {
        let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "lon,lat").unwrap();
        writeln!(file, "7.7,45.6").unwrap();
        file.flush().unwrap();

        assert!(matches!(read_sample_points(file.path(), "x", "y"), Err(Error::Vector(_))));
    }

    #[test]
    fn test_write_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.csv");
        write_table(&path, &["ANOMALY_ABS_C"], vec![vec!["1.5".to_string()], vec!["-0.25".to_string()]])
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "ANOMALY_ABS_C\n1.5\n-0.25\n");
    }
}
