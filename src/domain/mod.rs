pub mod color;
pub mod messages;
pub mod models;
pub mod pivot;
pub mod submission;
