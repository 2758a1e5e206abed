/// Input Marshaler - turns a test case's textual input into call arguments
///
/// Forgiving by construction: a malformed catalog entry degrades to "the raw
/// text passed as one string argument", it never aborts a grading run.
use serde_json::Value;
use verity_common::catalog::Catalog;

pub type ArgumentList = Vec<Value>;

/// Syntactic shape of a test-case input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    Empty,
    Scalar,
    Structured,
    /// Looks structured but does not parse; a fixture bug
    Malformed,
}

fn looks_structured(trimmed: &str) -> bool {
    trimmed.starts_with('[') || trimmed.starts_with('{')
}

/// Convert `raw` into positional arguments
///
/// - empty → no arguments (whitespace-only text is a scalar)
/// - JSON array → its elements, spread
/// - JSON object → that object as the only argument
/// - anything else, including unparseable `[`/`{` text → `raw` as one string
pub fn marshal(raw: &str) -> ArgumentList {
    if raw.is_empty() {
        return Vec::new();
    }

    let trimmed = raw.trim();

    if looks_structured(trimmed) {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Array(items)) => return items,
            Ok(other) => return vec![other],
            Err(e) => {
                tracing::debug!(error = %e, "Structured input did not parse; passing as string");
            }
        }
    }

    vec![Value::String(raw.to_string())]
}

pub fn classify(raw: &str) -> InputShape {
    let trimmed = raw.trim();
    if raw.is_empty() {
        InputShape::Empty
    } else if looks_structured(trimmed) {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(_) => InputShape::Structured,
            Err(_) => InputShape::Malformed,
        }
    } else {
        InputShape::Scalar
    }
}

/// A test-case input that does not match any accepted shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureIssue {
    pub slug: String,
    pub test_index: usize,
    pub input: String,
}

/// Report every malformed test-case input in the catalog
pub fn validate_fixtures(catalog: &Catalog) -> Vec<FixtureIssue> {
    catalog
        .iter()
        .flat_map(|challenge| {
            challenge
                .test_cases
                .iter()
                .enumerate()
                .filter(|(_, tc)| classify(&tc.input) == InputShape::Malformed)
                .map(|(idx, tc)| FixtureIssue {
                    slug: challenge.slug.clone(),
                    test_index: idx,
                    input: tc.input.clone(),
                })
        })
        .collect()
}
