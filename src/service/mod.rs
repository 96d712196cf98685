pub mod classifier;
pub mod comparison;
pub mod engine;
pub mod export;
pub mod extractor;
pub mod landed_cost;
pub mod matcher;
pub mod procurement;
pub mod quote_parser;
pub mod rfq_mail;
pub mod segmenter;

pub use classifier::classify;
pub use comparison::{build_comparison, default_selections, summarize};
pub use engine::{HeuristicEngine, QuoteEngine};
pub use extractor::{extract_attributes, normalize_item};
pub use landed_cost::landed_cost;
pub use matcher::{assign_matches, best_match, match_score};
pub use procurement::ProcurementService;
pub use quote_parser::parse_quote_text;
pub use rfq_mail::{LoggingOutbox, MemoryOutbox, Outbox};
pub use segmenter::segment;
