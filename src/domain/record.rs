use super::reference::Reference;

pub const NOT_FOUND: &str = "Not found";
pub const ERROR: &str = "Error";
pub const ACCESS_ERROR: &str = "Access Error";
pub const VALIDATION_ERROR: &str = "Validation Error";

pub const HEADER: [&str; 4] = [
    "Reference",
    "Uso principal",
    "Superficie construida",
    "Año construcción",
];

/// One extracted attribute of the result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Value(String),
    NotFound,
}

impl Field {
    pub fn from_text(text: &str) -> Self {
        match text.trim() {
            "" => Field::NotFound,
            trimmed => Field::Value(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Field::Value(value) => value,
            Field::NotFound => NOT_FOUND,
        }
    }
}

impl From<Option<String>> for Field {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(value) => Field::from_text(&value),
            None => Field::NotFound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found {
        primary_use: Field,
        built_area: Field,
        construction_year: Field,
    },
    /// The portal answered with an access-denied or server-error page.
    AccessDenied,
    /// The portal rejected the reference; carries the portal's message.
    Rejected { message: String },
    /// Every attempt failed.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub reference: Reference,
    pub outcome: Outcome,
}

impl ResultRecord {
    pub fn new(reference: Reference, outcome: Outcome) -> Self {
        ResultRecord { reference, outcome }
    }

    pub fn is_found(&self) -> bool {
        matches!(self.outcome, Outcome::Found { .. })
    }

    /// Renders the record as an output row, sentinels included.
    pub fn row(&self) -> [String; 4] {
        let reference = self.reference.to_string();
        match &self.outcome {
            Outcome::Found {
                primary_use,
                built_area,
                construction_year,
            } => [
                reference,
                primary_use.as_str().to_string(),
                built_area.as_str().to_string(),
                construction_year.as_str().to_string(),
            ],
            Outcome::AccessDenied => [
                reference,
                ACCESS_ERROR.to_string(),
                ACCESS_ERROR.to_string(),
                ACCESS_ERROR.to_string(),
            ],
            Outcome::Rejected { message } => [
                reference,
                VALIDATION_ERROR.to_string(),
                message.clone(),
                VALIDATION_ERROR.to_string(),
            ],
            Outcome::Exhausted => [
                reference,
                ERROR.to_string(),
                ERROR.to_string(),
                ERROR.to_string(),
            ],
        }
    }
}
