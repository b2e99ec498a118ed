use crate::dto::generation_dto::GenerationRequest;
use crate::error::{Error, Result};
use crate::models::question::{GeneratedQuestion, ReferenceQuestion, Scope, StoredQuestion};
use crate::services::context_service::ContextService;
use crate::services::model_service::ModelService;
use regex::Regex;
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::OnceLock;
use uuid::Uuid;

/// Orchestrates one generation request as a strictly linear pipeline:
/// fetch context, compose the prompt, invoke the model, parse, map,
/// persist. Any stage failure is terminal; there is no retry and no
/// partial persistence.
#[derive(Clone)]
pub struct GenerationService {
    pool: PgPool,
    context: ContextService,
    model: ModelService,
}

impl GenerationService {
    pub fn new(pool: PgPool, context: ContextService, model: ModelService) -> Self {
        Self {
            pool,
            context,
            model,
        }
    }

    /// Runs the pipeline for an already-validated request and returns the
    /// number of questions actually stored (never more than requested).
    pub async fn generate(&self, owner: Uuid, request: &GenerationRequest) -> Result<usize> {
        let historical = self.context.historical(&request.scope).await?;
        let own_generated = self.context.own_generated(&request.scope, owner).await?;

        tracing::info!(
            historical = historical.len(),
            own_generated = own_generated.len(),
            requested = request.count,
            "Generating questions"
        );

        let prompt = compose_prompt(request, &historical, &own_generated);
        let raw = self.model.complete(&prompt).await?;

        let elements = parse_question_array(&raw)?;
        let rows = map_to_stored(&elements, &request.scope, owner, request.count);

        self.insert_batch(&rows).await?;
        Ok(rows.len())
    }

    /// Persists the whole batch as a single multi-row insert. An empty
    /// batch is a successful no-op; a failed insert fails the request with
    /// no row-by-row fallback.
    async fn insert_batch(&self, rows: &[StoredQuestion]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO generated_questions (\
             user_id, exam_id, course_id, subject_id, unit_id, chapter_id, topic_id, \
             part_id, slot_id, question_statement, options, question_type, answer, solution) ",
        );
        qb.push_values(rows, |mut b, q| {
            b.push_bind(q.user_id)
                .push_bind(q.exam_id)
                .push_bind(q.course_id)
                .push_bind(q.subject_id)
                .push_bind(q.unit_id)
                .push_bind(q.chapter_id)
                .push_bind(q.topic_id)
                .push_bind(q.part_id)
                .push_bind(q.slot_id)
                .push_bind(q.question_statement.clone())
                .push_bind(q.options.clone())
                .push_bind(q.question_type.clone())
                .push_bind(q.answer.clone())
                .push_bind(q.solution.clone());
        });

        qb.build()
            .execute(&self.pool)
            .await
            .map_err(Error::PersistenceFailed)?;
        Ok(())
    }
}

/// Builds the full prompt text deterministically from the request and the
/// two reference sets. Empty reference sets are called out explicitly so
/// the model can rely on their absence.
pub fn compose_prompt(
    request: &GenerationRequest,
    historical: &[ReferenceQuestion],
    own_generated: &[ReferenceQuestion],
) -> String {
    let labels = &request.labels;
    let question_type = request.question_type.as_str();

    let mut prompt = format!(
        "You are an expert question generator for competitive exams. Your task is to create \
         high-quality, challenging questions that are highly likely to appear in exams, similar \
         to or more difficult than the provided historical questions.\n\n\
         **Context:**\n\
         - Exam: {}\n\
         - Course: {}\n\
         - Subject: {}\n\
         - Unit: {}\n\
         - Chapter: {}\n\
         - Topic: {}\n\
         - Question Type: {}\n\
         - Number of Questions to Generate: {}",
        labels.exam,
        labels.course,
        labels.subject,
        labels.unit,
        labels.chapter,
        labels.topic,
        question_type,
        request.count,
    );

    if let Some(part) = &labels.part {
        prompt.push_str(&format!("\n- Part: {}", part));
    }
    if let Some(slot) = &labels.slot {
        prompt.push_str(&format!("\n- Slot: {}", slot));
    }

    prompt.push_str(
        "\n\n**Historical Questions for this Topic (Reference for style, difficulty, and \
         important concepts):**\n",
    );
    if historical.is_empty() {
        prompt.push_str(
            "No historical questions found for this topic. Generate questions based on general \
             importance for the given context.\n",
        );
    } else {
        for (index, q) in historical.iter().enumerate() {
            prompt.push_str(&format!("\n{}. Question: {}\n", index + 1, q.question_statement));
            if let Some(options) = &q.options {
                prompt.push_str(&format!(
                    "   Options: {}\n",
                    serde_json::to_string(&options.0).unwrap_or_default()
                ));
            }
            prompt.push_str(&format!("   Answer: {}\n", q.answer));
            if let Some(solution) = &q.solution {
                prompt.push_str(&format!("   Solution: {}\n", solution));
            }
        }
    }

    prompt.push_str(
        "\n**Already Generated Questions for this Topic (DO NOT repeat similar questions or \
         concepts):**\n",
    );
    if own_generated.is_empty() {
        prompt.push_str("No previously generated questions found for this topic.\n");
    } else {
        for (index, q) in own_generated.iter().enumerate() {
            prompt.push_str(&format!("\n{}. Question: {}\n", index + 1, q.question_statement));
            if let Some(options) = &q.options {
                prompt.push_str(&format!(
                    "   Options: {}\n",
                    serde_json::to_string(&options.0).unwrap_or_default()
                ));
            }
            prompt.push_str(&format!("   Answer: {}\n", q.answer));
        }
    }

    prompt.push_str(&format!(
        "\n**Instructions:**\n\
         1.  Generate {count} new, unique questions of type {qtype}.\n\
         2.  The questions should be at the same or higher difficulty level than the provided \
         historical questions.\n\
         3.  Focus on concepts and problem-solving patterns that have a high probability of \
         repeating in the exam.\n\
         4.  Ensure the questions are clear, unambiguous, and well-formed.\n\
         5.  For MCQ/MSQ, provide 4-5 distinct options. For MSQ, clearly indicate multiple \
         correct options.\n\
         6.  For NAT, specify the expected numerical answer format (e.g., \"answer to two \
         decimal places\").\n\
         7.  For SUB, provide a clear question statement.\n\
         8.  Provide a detailed solution for each question, explaining the steps and reasoning.\n\
         9.  The output MUST be a JSON array of objects, where each object represents a question \
         and has the following structure:\n\
         ```json\n\
         [\n\
           {{\n\
             \"question_statement\": \"...\",\n\
             \"options\": [\"Option A\", \"Option B\", \"Option C\", \"Option D\"],\n\
             \"question_type\": \"{qtype}\",\n\
             \"answer\": \"Option B\",\n\
             \"solution\": \"...\"\n\
           }}\n\
         ]\n\
         ```\n\
         Ensure `options` is an array of strings for MCQ/MSQ and is omitted for NAT/SUB, and \
         `answer` is a string for MCQ/NAT/SUB, or an array of strings for MSQ.\n\
         If you cannot generate the requested number of questions, generate as many as possible \
         following the format.\n\
         Double check the JSON format for correctness.\n",
        count = request.count,
        qtype = question_type,
    ));

    prompt
}

fn fenced_json_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json\n(.*?)\n```").expect("valid regex"))
}

/// Best-effort extraction of candidate JSON from uncontracted model text:
/// the interior of a ```json fenced block when one exists, otherwise the
/// raw text verbatim.
pub fn extract_json_payload(raw: &str) -> &str {
    match fenced_json_re().captures(raw).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => raw,
    }
}

/// Parses the model's raw output into the elements of a JSON array. Either
/// the whole output yields a usable array or the request fails; malformed
/// output is never partially salvaged.
pub fn parse_question_array(raw: &str) -> Result<Vec<JsonValue>> {
    let candidate = extract_json_payload(raw);
    let value: JsonValue =
        serde_json::from_str(candidate).map_err(|e| Error::ModelParseFailed {
            message: e.to_string(),
            raw_output: raw.to_string(),
        })?;

    match value {
        JsonValue::Array(items) => Ok(items),
        _ => Err(Error::ModelParseFailed {
            message: "model response is not a JSON array".to_string(),
            raw_output: raw.to_string(),
        }),
    }
}

/// Maps parsed elements to storable records, tagging each with the scope
/// and owner. Elements that do not match the expected shape are dropped
/// with a warning; at most `count` records survive.
pub fn map_to_stored(
    elements: &[JsonValue],
    scope: &Scope,
    owner: Uuid,
    count: usize,
) -> Vec<StoredQuestion> {
    let mut rows = Vec::new();

    for (index, element) in elements.iter().enumerate() {
        if rows.len() == count {
            break;
        }

        let parsed: GeneratedQuestion = match serde_json::from_value(element.clone()) {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!(index, error = %e, "Dropping malformed generated question");
                continue;
            }
        };

        let Some(answer) = parsed.normalized_answer() else {
            tracing::warn!(index, "Dropping generated question with unusable answer");
            continue;
        };

        rows.push(StoredQuestion {
            user_id: owner,
            exam_id: scope.exam_id,
            course_id: scope.course_id,
            subject_id: scope.subject_id,
            unit_id: scope.unit_id,
            chapter_id: scope.chapter_id,
            topic_id: scope.topic_id,
            part_id: scope.part_id,
            slot_id: scope.slot_id,
            question_statement: parsed.question_statement,
            options: parsed.options.map(Json),
            question_type: parsed.question_type.as_str().to_string(),
            answer,
            solution: parsed.solution,
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{QuestionType, ScopeLabels};
    use serde_json::json;

    fn scope() -> Scope {
        Scope {
            exam_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            unit_id: Uuid::new_v4(),
            chapter_id: Uuid::new_v4(),
            topic_id: Uuid::new_v4(),
            part_id: None,
            slot_id: None,
        }
    }

    fn request(count: usize) -> GenerationRequest {
        GenerationRequest {
            scope: scope(),
            labels: ScopeLabels {
                exam: "E1".into(),
                course: "C1".into(),
                subject: "S1".into(),
                unit: "U1".into(),
                chapter: "Ch1".into(),
                topic: "T1".into(),
                part: None,
                slot: None,
            },
            question_type: QuestionType::Mcq,
            count,
        }
    }

    fn reference(statement: &str, solution: Option<&str>) -> ReferenceQuestion {
        ReferenceQuestion {
            question_statement: statement.to_string(),
            options: Some(Json(vec!["A".into(), "B".into(), "C".into(), "D".into()])),
            question_type: "MCQ".to_string(),
            answer: "B".to_string(),
            solution: solution.map(str::to_string),
        }
    }

    fn mcq_element(statement: &str) -> JsonValue {
        json!({
            "question_statement": statement,
            "options": ["A", "B", "C", "D"],
            "question_type": "MCQ",
            "answer": "B",
            "solution": "Because B."
        })
    }

    #[test]
    fn empty_reference_sets_are_stated_explicitly() {
        let prompt = compose_prompt(&request(5), &[], &[]);
        assert!(prompt.contains("No historical questions found for this topic."));
        assert!(prompt.contains("No previously generated questions found for this topic."));
        assert!(!prompt.contains("1. Question:"));
    }

    #[test]
    fn references_are_enumerated_with_their_fields() {
        let historical = vec![
            reference("What is X?", Some("X is X.")),
            reference("What is Y?", None),
        ];
        let own = vec![reference("What is Z?", Some("Z is Z."))];
        let prompt = compose_prompt(&request(5), &historical, &own);

        assert!(prompt.contains("1. Question: What is X?"));
        assert!(prompt.contains("2. Question: What is Y?"));
        assert!(prompt.contains(r#"Options: ["A","B","C","D"]"#));
        assert!(prompt.contains("Solution: X is X."));
        assert!(!prompt.contains("No historical questions found"));

        // The avoid-duplicates section never includes solutions.
        let own_section = prompt
            .split("**Already Generated Questions")
            .nth(1)
            .unwrap();
        let own_section = own_section.split("**Instructions:**").next().unwrap();
        assert!(own_section.contains("1. Question: What is Z?"));
        assert!(!own_section.contains("Solution:"));
    }

    #[test]
    fn prompt_carries_scope_labels_and_optional_qualifiers() {
        let mut req = request(5);
        req.labels.part = Some("Part A".into());
        req.labels.slot = Some("Slot 2".into());
        let prompt = compose_prompt(&req, &[], &[]);
        assert!(prompt.contains("- Exam: E1"));
        assert!(prompt.contains("- Topic: T1"));
        assert!(prompt.contains("- Part: Part A"));
        assert!(prompt.contains("- Slot: Slot 2"));
        assert!(prompt.contains("- Number of Questions to Generate: 5"));
    }

    #[test]
    fn fenced_block_interior_is_extracted() {
        let raw = "Here you go:\n```json\n[{\"a\": 1}]\n```\nEnjoy!";
        assert_eq!(extract_json_payload(raw), "[{\"a\": 1}]");
    }

    #[test]
    fn unfenced_text_passes_through_verbatim() {
        let raw = "[{\"a\": 1}]";
        assert_eq!(extract_json_payload(raw), raw);
    }

    #[test]
    fn fenced_empty_array_parses_to_zero_elements() {
        let raw = "Here you go:\n```json\n[]\n```";
        let elements = parse_question_array(raw).unwrap();
        assert!(elements.is_empty());
    }

    #[test]
    fn prose_output_fails_with_parse_error() {
        let err = parse_question_array("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, Error::ModelParseFailed { .. }));
    }

    #[test]
    fn non_array_json_fails_with_parse_error() {
        let err = parse_question_array(r#"{"questions": []}"#).unwrap_err();
        match err {
            Error::ModelParseFailed { message, raw_output } => {
                assert!(message.contains("not a JSON array"));
                assert!(raw_output.contains("questions"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn well_formed_elements_all_survive_mapping() {
        let elements = vec![mcq_element("Q1"), mcq_element("Q2"), mcq_element("Q3")];
        let rows = map_to_stored(&elements, &scope(), Uuid::new_v4(), 5);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].question_statement, "Q1");
        assert_eq!(rows[0].question_type, "MCQ");
        assert_eq!(rows[0].answer, "B");
    }

    #[test]
    fn mapping_never_exceeds_the_requested_count() {
        let elements: Vec<JsonValue> = (0..10).map(|i| mcq_element(&format!("Q{i}"))).collect();
        let rows = map_to_stored(&elements, &scope(), Uuid::new_v4(), 4);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn malformed_elements_are_dropped_not_fatal() {
        let elements = vec![
            mcq_element("Q1"),
            json!({"question_type": "MCQ", "answer": "B"}),
            json!({
                "question_statement": "Numeric answer",
                "question_type": "NAT",
                "answer": 42
            }),
            mcq_element("Q2"),
        ];
        let rows = map_to_stored(&elements, &scope(), Uuid::new_v4(), 10);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].question_statement, "Q2");
    }

    #[test]
    fn multi_answer_elements_store_a_json_encoded_list() {
        let elements = vec![json!({
            "question_statement": "Pick all even numbers.",
            "options": ["1", "2", "3", "4"],
            "question_type": "MSQ",
            "answer": ["2", "4"]
        })];
        let rows = map_to_stored(&elements, &scope(), Uuid::new_v4(), 10);
        assert_eq!(rows[0].answer, r#"["2","4"]"#);
    }

    #[test]
    fn absent_options_and_solution_stay_absent() {
        let elements = vec![json!({
            "question_statement": "Compute the limit.",
            "question_type": "NAT",
            "answer": "2.50"
        })];
        let rows = map_to_stored(&elements, &scope(), Uuid::new_v4(), 10);
        assert!(rows[0].options.is_none());
        assert!(rows[0].solution.is_none());
    }

    #[test]
    fn scope_and_owner_tag_every_row() {
        let scope = scope();
        let owner = Uuid::new_v4();
        let rows = map_to_stored(&[mcq_element("Q1")], &scope, owner, 1);
        assert_eq!(rows[0].user_id, owner);
        assert_eq!(rows[0].exam_id, scope.exam_id);
        assert_eq!(rows[0].topic_id, scope.topic_id);
        assert!(rows[0].part_id.is_none());
    }
}
