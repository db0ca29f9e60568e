pub mod builders;

// Re-export commonly used test utilities
pub use builders::{character, mention_span, place, ChapterBuilder, OutlineBuilder, TEST_COLLECTION};

/// Route test logs to stderr; filter with RUST_LOG when chasing a failure.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
