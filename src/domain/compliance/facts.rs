//! Fact Record - the structured company profile extracted from the dialogue.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::tools::ToolDefinition;

/// Name of the function the extractor binds to the model.
pub const FACT_SCHEMA_TOOL: &str = "company_facts";

/// Errors raised when the model output does not satisfy the fact schema
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ExtractionError {
    #[error("Model answered with text instead of a structured call: {0}")]
    NoStructuredCall(String),

    #[error("Invalid call arguments: {0}")]
    InvalidArguments(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Company facts consumed by both analysers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRecord {
    pub company_name: Option<String>,
    pub country: String,
    pub industry: String,
    pub company_size: u32,
    pub data_types_collected: Option<Vec<String>>,
}

impl FactRecord {
    /// The schema bound to the model as its only callable function.
    pub fn schema_tool() -> ToolDefinition {
        ToolDefinition::new(
            FACT_SCHEMA_TOOL,
            "Records the company details stated in the input text",
            serde_json::json!({
                "type": "object",
                "required": ["country", "industry", "company_size"],
                "properties": {
                    "company_name": {
                        "type": "string",
                        "description": "The company's name in the input information"
                    },
                    "country": {
                        "type": "string",
                        "description": "The country in the input information"
                    },
                    "industry": {
                        "type": "string",
                        "description": "The sector or industry in the input information"
                    },
                    "company_size": {
                        "type": "integer",
                        "description": "The number of employees of the company in the input information"
                    },
                    "data_types_collected": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "The categories of data being collected or processed in the input information"
                    }
                }
            }),
        )
    }

    /// Builds a record from function-call arguments.
    ///
    /// Small local models often send numbers as strings ("50 employees") or
    /// a comma-separated string instead of a list; both are accepted. Missing
    /// required fields are reported, never defaulted.
    pub fn from_arguments(arguments: &Value) -> Result<Self, ExtractionError> {
        let fields = match arguments {
            Value::Object(map) => map.clone(),
            // Some providers double-encode the arguments as a JSON string.
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                _ => {
                    return Err(ExtractionError::InvalidArguments(
                        "arguments are not a JSON object".to_string(),
                    ))
                }
            },
            _ => {
                return Err(ExtractionError::InvalidArguments(
                    "arguments are not a JSON object".to_string(),
                ))
            }
        };

        Ok(Self {
            company_name: optional_string(&fields, "company_name"),
            country: required_string(&fields, "country")?,
            industry: required_string(&fields, "industry")?,
            company_size: required_size(&fields, "company_size")?,
            data_types_collected: optional_list(&fields, "data_types_collected"),
        })
    }

    /// Renders the record as the context message handed to the analysers.
    pub fn context_message(&self) -> String {
        let data_types = match &self.data_types_collected {
            Some(types) if !types.is_empty() => types.join(", "),
            _ => "not provided".to_string(),
        };

        format!(
            "Company information:\n\
- Company name: {}\n\
- Country: {}\n\
- Industry: {}\n\
- Company size: {} employees\n\
- Data collected or processed: {}",
            self.company_name.as_deref().unwrap_or("not provided"),
            self.country,
            self.industry,
            self.company_size,
            data_types
        )
    }
}

fn optional_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required_string(
    fields: &Map<String, Value>,
    key: &'static str,
) -> Result<String, ExtractionError> {
    optional_string(fields, key).ok_or(ExtractionError::MissingField(key))
}

fn required_size(fields: &Map<String, Value>, key: &'static str) -> Result<u32, ExtractionError> {
    let value = fields.get(key).ok_or(ExtractionError::MissingField(key))?;

    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).map_err(|_| ExtractionError::InvalidField {
                    field: key,
                    reason: format!("{} is too large", v),
                });
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
                _ => Err(ExtractionError::InvalidField {
                    field: key,
                    reason: format!("{} is not a non-negative integer", n),
                }),
            }
        }
        Value::String(s) => parse_size_text(s).map_err(|reason| ExtractionError::InvalidField {
            field: key,
            reason,
        }),
        Value::Null => Err(ExtractionError::MissingField(key)),
        other => Err(ExtractionError::InvalidField {
            field: key,
            reason: format!("unexpected value {}", other),
        }),
    }
}

/// Separators a model may put between digit groups ("1,200", "1 200", "1.200").
fn is_group_separator(c: char) -> bool {
    matches!(c, ',' | '_' | '.' | ' ' | '\u{00A0}' | '\u{2009}' | '\u{202F}')
}

/// Reads a head count out of free text. Grouped digits must come in blocks of
/// three after the first group, and only one number may appear; anything else
/// is reported instead of guessed.
fn parse_size_text(text: &str) -> Result<u32, String> {
    let chars: Vec<char> = text.chars().collect();
    let Some(start) = chars.iter().position(|c| c.is_ascii_digit()) else {
        return Err(format!("'{}' contains no number", text));
    };

    let mut groups = vec![String::new()];
    let mut end = start;
    while end < chars.len() {
        let c = chars[end];
        if c.is_ascii_digit() {
            if let Some(group) = groups.last_mut() {
                group.push(c);
            }
        } else if is_group_separator(c)
            && chars.get(end + 1).is_some_and(|next| next.is_ascii_digit())
        {
            groups.push(String::new());
        } else {
            break;
        }
        end += 1;
    }

    if groups.len() > 1 && groups[1..].iter().any(|g| g.len() != 3) {
        return Err(format!("'{}' is not a whole number of employees", text));
    }
    if chars[end..].iter().any(|c| c.is_ascii_digit()) {
        return Err(format!("'{}' contains more than one number", text));
    }

    groups
        .concat()
        .parse::<u32>()
        .map_err(|e| format!("'{}': {}", text, e))
}

fn optional_list(fields: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let items: Vec<String> = match fields.get(key)? {
        Value::Array(values) => values
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
