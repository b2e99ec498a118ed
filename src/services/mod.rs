pub mod context_service;
pub mod generation_service;
pub mod model_service;
pub mod taxonomy_service;
