//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunPhase`: where a crawl run is in its lifecycle
//! - `PageFacts`: metadata extracted from one page
//! - `CrawlState`: everything one run accumulates (frontier, facts, failures)

mod crawl_state;
mod page_facts;
mod run_phase;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_facts::PageFacts;
pub use run_phase::RunPhase;
