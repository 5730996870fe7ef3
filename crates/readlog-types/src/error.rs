use garde::Report;

/// First violated constraint of a change request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Keeps only the first entry of the report, fields are checked in declaration order
    pub fn first_of(report: &Report) -> Option<Self> {
        report
            .iter()
            .next()
            .map(|(path, error)| {
                ValidationError::new(wire_name(&path.to_string()), error.message())
            })
    }
}

/// garde reports rust field names, requests use camelCase
fn wire_name(path: &str) -> String {
    let mut name = String::with_capacity(path.len());
    let mut upper = false;
    for c in path.chars() {
        match c {
            '_' if !name.is_empty() => upper = true,
            c if upper => {
                name.extend(c.to_uppercase());
                upper = false;
            }
            c => name.push(c),
        }
    }
    name
}

impl From<Report> for ValidationError {
    fn from(report: Report) -> Self {
        ValidationError::first_of(&report)
            .unwrap_or_else(|| ValidationError::new("", "invalid request"))
    }
}
