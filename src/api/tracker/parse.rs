use std::collections::{HashMap, HashSet};

use serde_json::Value;
use thiserror::Error;

use crate::{ArcSlice, FieldId, FieldValues, IssueId};

/// Errors produced while interpreting a tracker search response.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload has no \"issues\" array")]
    MissingIssues,
    #[error("issue entry has no usable \"id\": {0}")]
    BadIssueId(String),
}

/// Parses a search response into per-issue field values.
///
/// Every reported issue carries a value for every requested field; fields the
/// server omitted are filled with JSON `null` so downstream consumers always
/// see the complete field set.
pub fn parse_search_values(
    payload: &str,
    fields: &ArcSlice<FieldId>,
) -> Result<HashMap<IssueId, FieldValues>, ParseError> {
    let root: Value = serde_json::from_str(payload)?;
    let issues = root
        .get("issues")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingIssues)?;

    let mut values = HashMap::with_capacity(issues.len());
    for issue in issues {
        let id = issue_id(issue)?;
        let reported = issue.get("fields").and_then(Value::as_object);

        let mut issue_values = FieldValues::with_capacity(fields.len());
        for field in fields.iter() {
            let value = reported
                .and_then(|m| m.get(&**field))
                .cloned()
                .unwrap_or(Value::Null);
            issue_values.insert(field.clone(), value);
        }
        values.insert(id, issue_values);
    }
    Ok(values)
}

/// Parses a search response into the set of reported issue IDs.
pub fn parse_search_ids(payload: &str) -> Result<HashSet<IssueId>, ParseError> {
    let root: Value = serde_json::from_str(payload)?;
    let issues = root
        .get("issues")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingIssues)?;

    issues.iter().map(issue_id).collect()
}

/// Extracts an issue ID, accepting both JSON strings and numbers.
fn issue_id(issue: &Value) -> Result<IssueId, ParseError> {
    let id = issue
        .get("id")
        .ok_or_else(|| ParseError::BadIssueId(issue.to_string()))?;
    match id {
        Value::String(s) => s.parse().map_err(|_| ParseError::BadIssueId(s.clone())),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ParseError::BadIssueId(n.to_string())),
        other => Err(ParseError::BadIssueId(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArcStr;

    fn field_set() -> ArcSlice<FieldId> {
        ArcSlice::from(vec![ArcStr::from("key"), ArcStr::from("summary")])
    }

    #[test]
    fn test_parse_search_values() {
        let payload = r#"{
            "issues": [
                {"id": "1", "fields": {"key": "IH-1", "summary": "first"}},
                {"id": 2, "fields": {"key": "IH-2", "summary": "second"}}
            ]
        }"#;

        let values = parse_search_values(payload, &field_set()).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[&1][&ArcStr::from("key")], "IH-1");
        assert_eq!(values[&2][&ArcStr::from("summary")], "second");
    }

    #[test]
    fn test_missing_fields_become_null() {
        let payload = r#"{"issues": [{"id": "7", "fields": {"key": "IH-7"}}]}"#;

        let values = parse_search_values(payload, &field_set()).unwrap();
        let issue = &values[&7];
        assert_eq!(issue.len(), 2);
        assert_eq!(issue[&ArcStr::from("summary")], Value::Null);
    }

    #[test]
    fn test_parse_search_ids() {
        let payload = r#"{"issues": [{"id": "3"}, {"id": "5"}]}"#;
        let ids = parse_search_ids(payload).unwrap();
        assert_eq!(ids, HashSet::from([3, 5]));
    }

    #[test]
    fn test_rejects_payload_without_issues() {
        assert!(matches!(
            parse_search_ids(r#"{"total": 0}"#),
            Err(ParseError::MissingIssues)
        ));
    }

    #[test]
    fn test_rejects_bad_issue_id() {
        let payload = r#"{"issues": [{"id": "not-a-number"}]}"#;
        assert!(matches!(
            parse_search_ids(payload),
            Err(ParseError::BadIssueId(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_json() {
        assert!(matches!(parse_search_ids("{"), Err(ParseError::Json(_))));
    }
}
