use crate::error::{Error, Result};
use crate::models::question::{ReferenceQuestion, Scope};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Read-only access to the two reference collections that ground a
/// generation request. Either read failing aborts the whole request; no
/// partial context ever reaches the orchestrator.
#[derive(Clone)]
pub struct ContextService {
    pool: PgPool,
}

impl ContextService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Historical exam questions matching exam, course and topic exactly.
    /// Part/slot filters apply only when the scope carries them.
    pub async fn historical(&self, scope: &Scope) -> Result<Vec<ReferenceQuestion>> {
        let mut qb = scoped_query("historical_questions", scope);
        qb.push(" ORDER BY created_at");

        qb.build_query_as::<ReferenceQuestion>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::ContextFetchFailed {
                source_name: "historical questions",
                source: e,
            })
    }

    /// Questions this owner has already generated for the same scope.
    pub async fn own_generated(
        &self,
        scope: &Scope,
        owner: Uuid,
    ) -> Result<Vec<ReferenceQuestion>> {
        let mut qb = scoped_query("generated_questions", scope);
        qb.push(" AND user_id = ").push_bind(owner);
        qb.push(" ORDER BY created_at");

        qb.build_query_as::<ReferenceQuestion>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::ContextFetchFailed {
                source_name: "previously generated questions",
                source: e,
            })
    }
}

fn scoped_query(table: &str, scope: &Scope) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT question_statement, options, question_type, answer, solution FROM {} WHERE exam_id = ",
        table
    ));
    qb.push_bind(scope.exam_id);
    qb.push(" AND course_id = ").push_bind(scope.course_id);
    qb.push(" AND topic_id = ").push_bind(scope.topic_id);
    if let Some(part_id) = scope.part_id {
        qb.push(" AND part_id = ").push_bind(part_id);
    }
    if let Some(slot_id) = scope.slot_id {
        qb.push(" AND slot_id = ").push_bind(slot_id);
    }
    qb
}
