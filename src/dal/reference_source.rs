use std::{fs::File, path::Path};

use thiserror::Error;

use crate::domain::reference::Reference;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file '{path}' not found")]
    MissingSource {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not read input table: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads the header-less, single-column reference list, keeping row order.
pub fn load_references(path: &Path) -> Result<Vec<Reference>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::MissingSource {
        path: path.display().to_string(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut references = vec![];
    for row in reader.records() {
        let row = row?;
        if let Some(reference) = row.get(0).and_then(Reference::parse) {
            references.push(reference);
        }
    }

    Ok(references)
}
