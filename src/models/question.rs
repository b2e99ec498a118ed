use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use uuid::Uuid;

/// The fixed question-type enumeration used across storage, prompts and
/// model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionType {
    /// Multiple choice, single correct option.
    Mcq,
    /// Multiple select, several correct options.
    Msq,
    /// Numerical answer type.
    Nat,
    /// Subjective answer.
    Sub,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Msq => "MSQ",
            QuestionType::Nat => "NAT",
            QuestionType::Sub => "SUB",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MCQ" => Some(QuestionType::Mcq),
            "MSQ" => Some(QuestionType::Msq),
            "NAT" => Some(QuestionType::Nat),
            "SUB" => Some(QuestionType::Sub),
            _ => None,
        }
    }
}

/// The identifier tuple that filters all reference reads and tags all
/// writes. Valid for generation only when all six required levels are set;
/// absent part/slot means "do not filter on this field".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub exam_id: Uuid,
    pub course_id: Uuid,
    pub subject_id: Uuid,
    pub unit_id: Uuid,
    pub chapter_id: Uuid,
    pub topic_id: Uuid,
    pub part_id: Option<Uuid>,
    pub slot_id: Option<Uuid>,
}

/// Human-readable names for the scope levels, used verbatim in the prompt.
#[derive(Debug, Clone)]
pub struct ScopeLabels {
    pub exam: String,
    pub course: String,
    pub subject: String,
    pub unit: String,
    pub chapter: String,
    pub topic: String,
    pub part: Option<String>,
    pub slot: Option<String>,
}

/// A previously known question read from storage to steer generation.
/// Both the historical table and the caller's own generated questions
/// produce this shape.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReferenceQuestion {
    pub question_statement: String,
    pub options: Option<Json<Vec<String>>>,
    pub question_type: String,
    pub answer: String,
    pub solution: Option<String>,
}

/// One element of the model's JSON-array output, before normalization.
/// `answer` stays a raw JSON value here: single-answer types return a
/// string, MSQ returns a list of strings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuestion {
    pub question_statement: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    pub question_type: QuestionType,
    pub answer: JsonValue,
    #[serde(default)]
    pub solution: Option<String>,
}

impl GeneratedQuestion {
    /// List-valued answers are persisted as a JSON-encoded string; scalar
    /// string answers pass through unchanged. Anything else is malformed.
    pub fn normalized_answer(&self) -> Option<String> {
        match &self.answer {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Array(items) if items.iter().all(|v| v.is_string()) => {
                serde_json::to_string(&self.answer).ok()
            }
            _ => None,
        }
    }
}

/// The unit of durable state: a generated question tagged with its full
/// scope and owner. Written once, never updated or deleted by this service.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredQuestion {
    pub user_id: Uuid,
    pub exam_id: Uuid,
    pub course_id: Uuid,
    pub subject_id: Uuid,
    pub unit_id: Uuid,
    pub chapter_id: Uuid,
    pub topic_id: Uuid,
    pub part_id: Option<Uuid>,
    pub slot_id: Option<Uuid>,
    pub question_statement: String,
    pub options: Option<Json<Vec<String>>>,
    pub question_type: String,
    pub answer: String,
    pub solution: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn question_type_round_trips_through_tags() {
        for tag in ["MCQ", "MSQ", "NAT", "SUB"] {
            let qt = QuestionType::parse(tag).unwrap();
            assert_eq!(qt.as_str(), tag);
        }
        assert!(QuestionType::parse("TRUE_FALSE").is_none());
    }

    #[test]
    fn scalar_answer_passes_through() {
        let q: GeneratedQuestion = serde_json::from_value(json!({
            "question_statement": "What is 2 + 2?",
            "options": ["3", "4", "5", "6"],
            "question_type": "MCQ",
            "answer": "4",
            "solution": "Basic addition."
        }))
        .unwrap();
        assert_eq!(q.normalized_answer().as_deref(), Some("4"));
    }

    #[test]
    fn list_answer_is_json_encoded() {
        let q: GeneratedQuestion = serde_json::from_value(json!({
            "question_statement": "Select all primes.",
            "options": ["2", "3", "4", "9"],
            "question_type": "MSQ",
            "answer": ["2", "3"]
        }))
        .unwrap();
        assert_eq!(q.normalized_answer().as_deref(), Some(r#"["2","3"]"#));
    }

    #[test]
    fn non_string_answer_is_rejected() {
        let q: GeneratedQuestion = serde_json::from_value(json!({
            "question_statement": "How many?",
            "question_type": "NAT",
            "answer": 42
        }))
        .unwrap();
        assert!(q.normalized_answer().is_none());
    }
}
