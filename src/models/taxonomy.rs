use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of a taxonomy lookup table, as served to the selector UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaxonomyItem {
    pub id: Uuid,
    pub name: String,
}
