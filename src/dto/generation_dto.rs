use crate::error::{Error, Result};
use crate::models::question::{QuestionType, Scope, ScopeLabels};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for POST /api/questions/generate.
///
/// Everything is optional at the wire level so that missing fields surface
/// as one MissingParameters error from `into_request` (before any I/O)
/// rather than as a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateQuestionsPayload {
    pub exam_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub subject_id: Option<Uuid>,
    pub unit_id: Option<Uuid>,
    pub chapter_id: Option<Uuid>,
    pub topic_id: Option<Uuid>,
    pub part_id: Option<Uuid>,
    pub slot_id: Option<Uuid>,

    pub exam_name: Option<String>,
    pub course_name: Option<String>,
    pub subject_name: Option<String>,
    pub unit_name: Option<String>,
    pub chapter_name: Option<String>,
    pub topic_name: Option<String>,
    pub part_name: Option<String>,
    pub slot_name: Option<String>,

    pub question_type: Option<String>,
    #[validate(range(min = 1, message = "numberOfQuestions must be at least 1"))]
    pub number_of_questions: Option<u32>,
}

/// A fully validated generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub scope: Scope,
    pub labels: ScopeLabels,
    pub question_type: QuestionType,
    pub count: usize,
}

impl GenerateQuestionsPayload {
    /// Fail-fast validation: every required scope identifier, the question
    /// type and a positive count must be present. Collects all missing
    /// field names into a single error.
    pub fn into_request(self, max_count: usize) -> Result<GenerationRequest> {
        let mut missing: Vec<&str> = Vec::new();

        macro_rules! require {
            ($field:expr, $name:literal) => {
                match $field {
                    Some(v) => Some(v),
                    None => {
                        missing.push($name);
                        None
                    }
                }
            };
        }

        let exam_id = require!(self.exam_id, "examId");
        let course_id = require!(self.course_id, "courseId");
        let subject_id = require!(self.subject_id, "subjectId");
        let unit_id = require!(self.unit_id, "unitId");
        let chapter_id = require!(self.chapter_id, "chapterId");
        let topic_id = require!(self.topic_id, "topicId");

        let question_type = match self.question_type.as_deref() {
            Some(tag) => match QuestionType::parse(tag) {
                Some(qt) => Some(qt),
                None => {
                    missing.push("questionType");
                    None
                }
            },
            None => {
                missing.push("questionType");
                None
            }
        };

        let count = match self.number_of_questions {
            Some(n) if n >= 1 => Some(n as usize),
            _ => {
                missing.push("numberOfQuestions");
                None
            }
        };

        if !missing.is_empty() {
            return Err(Error::MissingParameters(missing.join(", ")));
        }

        let labels = ScopeLabels {
            exam: self.exam_name.unwrap_or_default(),
            course: self.course_name.unwrap_or_default(),
            subject: self.subject_name.unwrap_or_default(),
            unit: self.unit_name.unwrap_or_default(),
            chapter: self.chapter_name.unwrap_or_default(),
            topic: self.topic_name.unwrap_or_default(),
            part: self.part_name,
            slot: self.slot_name,
        };

        Ok(GenerationRequest {
            scope: Scope {
                exam_id: exam_id.unwrap(),
                course_id: course_id.unwrap(),
                subject_id: subject_id.unwrap(),
                unit_id: unit_id.unwrap(),
                chapter_id: chapter_id.unwrap(),
                topic_id: topic_id.unwrap(),
                part_id: self.part_id,
                slot_id: self.slot_id,
            },
            labels,
            question_type: question_type.unwrap(),
            count: count.unwrap().min(max_count),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateQuestionsResponse {
    pub message: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> GenerateQuestionsPayload {
        GenerateQuestionsPayload {
            exam_id: Some(Uuid::new_v4()),
            course_id: Some(Uuid::new_v4()),
            subject_id: Some(Uuid::new_v4()),
            unit_id: Some(Uuid::new_v4()),
            chapter_id: Some(Uuid::new_v4()),
            topic_id: Some(Uuid::new_v4()),
            exam_name: Some("GATE".into()),
            course_name: Some("CS".into()),
            subject_name: Some("Algorithms".into()),
            unit_name: Some("Graphs".into()),
            chapter_name: Some("Shortest Paths".into()),
            topic_name: Some("Dijkstra".into()),
            question_type: Some("MCQ".into()),
            number_of_questions: Some(5),
            ..Default::default()
        }
    }

    #[test]
    fn full_payload_validates() {
        let req = full_payload().into_request(30).unwrap();
        assert_eq!(req.question_type, QuestionType::Mcq);
        assert_eq!(req.count, 5);
        assert!(req.scope.part_id.is_none());
        assert!(req.labels.part.is_none());
    }

    #[test]
    fn missing_scope_field_is_reported_by_name() {
        let mut payload = full_payload();
        payload.topic_id = None;
        let err = payload.into_request(30).unwrap_err();
        match err {
            Error::MissingParameters(msg) => assert_eq!(msg, "topicId"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn all_missing_fields_are_collected() {
        let err = GenerateQuestionsPayload::default()
            .into_request(30)
            .unwrap_err();
        match err {
            Error::MissingParameters(msg) => {
                for name in [
                    "examId",
                    "courseId",
                    "subjectId",
                    "unitId",
                    "chapterId",
                    "topicId",
                    "questionType",
                    "numberOfQuestions",
                ] {
                    assert!(msg.contains(name), "missing {name} in {msg}");
                }
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_question_type_is_invalid() {
        let mut payload = full_payload();
        payload.question_type = Some("ESSAY".into());
        assert!(payload.into_request(30).is_err());
    }

    #[test]
    fn zero_count_is_invalid() {
        let mut payload = full_payload();
        payload.number_of_questions = Some(0);
        assert!(payload.into_request(30).is_err());
    }

    #[test]
    fn count_is_clamped_to_the_configured_maximum() {
        let mut payload = full_payload();
        payload.number_of_questions = Some(500);
        let req = payload.into_request(30).unwrap();
        assert_eq!(req.count, 30);
    }
}
