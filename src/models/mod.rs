pub mod comparison;
pub mod indent;
pub mod quote;

pub use comparison::{
    ComparisonRow, ComparisonSummary, Recommendation, VendorOffer, VendorSummary,
};
pub use indent::{Category, Extraction, IndentLine, IndentLineDraft, NormalizedItem, RawLine};
pub use quote::{QuoteIngestStats, QuoteLine, VendorQuotes, DEFAULT_GST_PERCENT};
