pub mod question;
pub mod selection;
pub mod taxonomy;
