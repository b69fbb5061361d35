pub mod middleware;
pub mod rest;
pub mod state;

// Re-export the REST handlers to make them easily accessible to the binary
// that builds the web server router.
pub use middleware::authenticate;
pub use rest::{create_study_handler, export_handler, generate_handler, transcript_handler};
