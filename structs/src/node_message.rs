//! Vehicle-to-vehicle message envelope. The payload is carried as a quoted
//! string so it can contain commas (seglist specs do).

use serde::{Deserialize, Serialize};

use crate::FormatError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeMessage {
    pub src_node: String,
    pub dest_node: String,
    pub var_name: String,
    pub string_val: String,
}

impl NodeMessage {
    pub fn to_spec(&self) -> String {
        format!(
            "src_node={},dest_node={},var_name={},string_val=\"{}\"",
            self.src_node, self.dest_node, self.var_name, self.string_val
        )
    }

    pub fn from_spec(spec: &str) -> Result<Self, FormatError> {
        let mut src_node = None;
        let mut dest_node = None;
        let mut var_name = None;
        let mut string_val = None;

        for field in split_unquoted(spec)? {
            let (key, value) = field
                .split_once('=')
                .ok_or_else(|| FormatError::Malformed(spec.to_string()))?;
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value)
                .to_string();
            match key.trim() {
                "src_node" => src_node = Some(value),
                "dest_node" => dest_node = Some(value),
                "var_name" => var_name = Some(value),
                "string_val" => string_val = Some(value),
                _ => {}
            }
        }

        let missing = |field| FormatError::MissingField {
            field,
            input: spec.to_string(),
        };
        Ok(NodeMessage {
            src_node: src_node.ok_or_else(|| missing("src_node"))?,
            dest_node: dest_node.ok_or_else(|| missing("dest_node"))?,
            var_name: var_name.ok_or_else(|| missing("var_name"))?,
            string_val: string_val.ok_or_else(|| missing("string_val"))?,
        })
    }
}

fn split_unquoted(spec: &str) -> Result<Vec<&str>, FormatError> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in spec.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(&spec[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err(FormatError::Malformed(spec.to_string()));
    }
    fields.push(&spec[start..]);
    Ok(fields.into_iter().filter(|f| !f.trim().is_empty()).collect())
}
