use std::{fs::OpenOptions, path::Path};

use thiserror::Error;

use crate::domain::record::{ResultRecord, HEADER};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not open output file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not write output row: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Created,
    Appended,
}

/// Appends to an existing table, otherwise creates it with a header row.
/// Rows are written in the order given and never reconciled with earlier runs.
pub fn write_results(path: &Path, records: &[ResultRecord]) -> Result<WriteMode, StoreError> {
    let mode = match path.exists() {
        true => WriteMode::Appended,
        false => WriteMode::Created,
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if mode == WriteMode::Created {
        writer.write_record(HEADER)?;
    }
    for record in records {
        writer.write_record(record.row())?;
    }
    writer.flush()?;

    Ok(mode)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{write_results, WriteMode};
    use crate::domain::{
        record::{Field, Outcome, ResultRecord},
        reference::Reference,
    };

    fn records() -> Vec<ResultRecord> {
        vec![
            ResultRecord::new(
                Reference::parse("9872023VH5797S0001WX").unwrap(),
                Outcome::Found {
                    primary_use: Field::Value("Residencial".to_string()),
                    built_area: Field::Value("123.45 m²".to_string()),
                    construction_year: Field::Value("1975".to_string()),
                },
            ),
            ResultRecord::new(
                Reference::parse("0847106VK4704F0001SE").unwrap(),
                Outcome::Exhausted,
            ),
        ]
    }

    #[test]
    fn first_run_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cadastre_results.csv");

        let mode = write_results(&path, &records()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(mode, WriteMode::Created);
        assert_eq!(
            lines,
            vec![
                "Reference,Uso principal,Superficie construida,Año construcción",
                "9872023VH5797S0001WX,Residencial,123.45 m²,1975",
                "0847106VK4704F0001SE,Error,Error,Error",
            ]
        );
    }

    #[test]
    fn second_run_appends_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cadastre_results.csv");

        write_results(&path, &records()).unwrap();
        let mode = write_results(&path, &records()).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)
            .unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(mode, WriteMode::Appended);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|row| &row[0] != "Reference"));
        assert_eq!(&rows[2][0], "9872023VH5797S0001WX");
    }
}
