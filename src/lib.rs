pub mod config;
pub mod handlers;
pub mod llm;
pub mod utils;
pub mod vibes;

pub use handlers::router;
