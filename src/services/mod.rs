pub mod cover_letter;
pub mod discovery_export;
pub mod fit_scorer;
pub mod job_search;
pub mod ledger;
pub mod reachability;
pub mod taxonomy;
pub mod text;

pub use discovery_export::export_postings;
pub use fit_scorer::FitScorer;
pub use job_search::{HttpJobSearch, JobSearch, SearchQuery};
pub use ledger::{ApplicationLedger, LedgerStats};
pub use reachability::{HttpProbe, ReachabilityProbe};
pub use text::{TextSimilarity, TfIdfCosine};
