pub mod middleware;
pub mod rest;
pub mod state;

// Re-export the pieces the binary needs to build the web server router.
pub use middleware::{require_reviewer, require_student};
pub use rest::ApiDoc;
