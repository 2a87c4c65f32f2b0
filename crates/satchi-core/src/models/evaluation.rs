use serde::{Deserialize, Serialize};

use super::event::EventId;
use crate::validation::ValidationError;

pub type TeamId = i64;

/// A judge linked to a competition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judge {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct JudgesResponse {
    #[serde(default)]
    pub subsubevent_id: Option<EventId>,
    #[serde(default)]
    pub judges: Vec<Judge>,
}

/// A team registered for a competition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(alias = "project_topic", default)]
    pub project_topic: String,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>, project_topic: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            project_topic: project_topic.into(),
        }
    }
}

/// One judge's mark for a team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationMark {
    pub judge_name: String,
    pub mark: f64,
    pub comments: String,
    #[serde(rename = "subsubevent_judge_id", skip_serializing_if = "Option::is_none")]
    pub judge_ref_id: Option<i64>,
}

impl EvaluationMark {
    pub fn new(judge_name: impl Into<String>, mark: f64) -> Self {
        Self {
            judge_name: judge_name.into(),
            mark,
            comments: String::new(),
            judge_ref_id: None,
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.judge_name.trim().is_empty() {
            return Err(ValidationError::Required("Judge name"));
        }
        if !self.mark.is_finite() || self.mark < 0.0 {
            return Err(ValidationError::invalid("Mark", "must be a non-negative number"));
        }
        Ok(())
    }
}

/// Parse a mark typed into a form field
pub fn parse_mark(raw: &str) -> Result<f64, ValidationError> {
    let mark: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::invalid("Mark", format!("'{}' is not a number", raw.trim())))?;
    if !mark.is_finite() || mark < 0.0 {
        return Err(ValidationError::invalid("Mark", "must be a non-negative number"));
    }
    Ok(mark)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mark() {
        assert_eq!(parse_mark(" 78.5 "), Ok(78.5));
        assert_eq!(parse_mark("0"), Ok(0.0));
        assert!(parse_mark("-1").is_err());
        assert!(parse_mark("abc").is_err());
        assert!(parse_mark("NaN").is_err());
        assert!(parse_mark("inf").is_err());
    }

    #[test]
    fn test_mark_validation() {
        assert!(EvaluationMark::new("Dr. Rao", 9.0).validate().is_ok());
        assert!(EvaluationMark::new("  ", 9.0).validate().is_err());
        assert!(EvaluationMark::new("Dr. Rao", -0.5).validate().is_err());
    }

    #[test]
    fn test_mark_serializes_judge_reference() {
        let mut mark = EvaluationMark::new("Dr. Rao", 8.0).with_comments("Solid");
        let value = serde_json::to_value(&mark).unwrap();
        assert!(value.get("subsubevent_judge_id").is_none());

        mark.judge_ref_id = Some(3);
        let value = serde_json::to_value(&mark).unwrap();
        assert_eq!(value["subsubevent_judge_id"], 3);
        assert_eq!(value["comments"], "Solid");
    }

    #[test]
    fn test_parse_judges_response() {
        let json = r#"{"subsubevent_id": 100, "judges": [{"id": 1, "name": "A", "order": 1}, {"id": 2, "name": "B", "order": null}]}"#;
        let parsed: JudgesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.subsubevent_id, Some(100));
        assert_eq!(parsed.judges[1].order, None);
    }
}
