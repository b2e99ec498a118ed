use crate::error::Result;
use crate::models::taxonomy::TaxonomyItem;
use sqlx::PgPool;
use uuid::Uuid;

/// Lookup reads feeding the cascading selector, one per hierarchy level.
#[derive(Clone)]
pub struct TaxonomyService {
    pool: PgPool,
}

impl TaxonomyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exams(&self) -> Result<Vec<TaxonomyItem>> {
        let rows = sqlx::query_as::<_, TaxonomyItem>("SELECT id, name FROM exams ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn courses(&self, exam_id: Uuid) -> Result<Vec<TaxonomyItem>> {
        self.children("SELECT id, name FROM courses WHERE exam_id = $1 ORDER BY name", exam_id)
            .await
    }

    pub async fn subjects(&self, course_id: Uuid) -> Result<Vec<TaxonomyItem>> {
        self.children(
            "SELECT id, name FROM subjects WHERE course_id = $1 ORDER BY name",
            course_id,
        )
        .await
    }

    pub async fn units(&self, subject_id: Uuid) -> Result<Vec<TaxonomyItem>> {
        self.children(
            "SELECT id, name FROM units WHERE subject_id = $1 ORDER BY name",
            subject_id,
        )
        .await
    }

    pub async fn chapters(&self, unit_id: Uuid) -> Result<Vec<TaxonomyItem>> {
        self.children(
            "SELECT id, name FROM chapters WHERE unit_id = $1 ORDER BY name",
            unit_id,
        )
        .await
    }

    pub async fn topics(&self, chapter_id: Uuid) -> Result<Vec<TaxonomyItem>> {
        self.children(
            "SELECT id, name FROM topics WHERE chapter_id = $1 ORDER BY name",
            chapter_id,
        )
        .await
    }

    pub async fn parts(&self, course_id: Uuid) -> Result<Vec<TaxonomyItem>> {
        self.children(
            "SELECT id, name FROM parts WHERE course_id = $1 ORDER BY name",
            course_id,
        )
        .await
    }

    pub async fn slots(&self, course_id: Uuid) -> Result<Vec<TaxonomyItem>> {
        self.children(
            "SELECT id, name FROM slots WHERE course_id = $1 ORDER BY name",
            course_id,
        )
        .await
    }

    async fn children(&self, sql: &str, parent_id: Uuid) -> Result<Vec<TaxonomyItem>> {
        let rows = sqlx::query_as::<_, TaxonomyItem>(sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
