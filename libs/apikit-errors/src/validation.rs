//! Field-level validation failures and their problem-details rendering

use crate::problem::FieldErrors;

/// A single failed field check.
///
/// `path` holds the location segments, e.g. `["body", "title"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub path: Vec<String>,
    pub message: String,
}

impl FieldViolation {
    pub fn new<I, S>(path: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// Dotted field path used as the key in the `errors` map.
    #[must_use]
    pub fn field_path(&self) -> String {
        self.path.join(".")
    }
}

/// Ordered collection of violations for one request or one domain object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: FieldViolation) {
        self.0.push(violation);
    }

    /// Shorthand for a single-segment violation.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.push(FieldViolation::new([field], message));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldViolation> {
        self.0.iter()
    }

    /// Prepend `location` (e.g. `body`, `query`) to every violation path.
    #[must_use]
    pub fn with_location(mut self, location: &str) -> Self {
        for v in &mut self.0 {
            v.path.insert(0, location.to_owned());
        }
        self
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    /// Returns `self` when at least one violation is present.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Group messages by dotted field path, preserving message order per field.
    #[must_use]
    pub fn to_field_errors(&self) -> FieldErrors {
        let mut out = FieldErrors::new();
        for v in &self.0 {
            out.entry(v.field_path())
                .or_default()
                .push(v.message.clone());
        }
        out
    }
}

impl From<FieldViolation> for ValidationErrors {
    fn from(v: FieldViolation) -> Self {
        Self(vec![v])
    }
}

impl FromIterator<FieldViolation> for ValidationErrors {
    fn from_iter<T: IntoIterator<Item = FieldViolation>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldViolation;
    type IntoIter = std::slice::Iter<'a, FieldViolation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.field_path(), v.message)?;
        }
        Ok(())
    }
}
