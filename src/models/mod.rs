pub mod candidate;
pub mod loaders;
pub mod posting;
pub mod profile;
pub mod record;

pub use candidate::{ExperienceLevel, JobRequirements, ScoredCandidate, SkillMatch};
pub use loaders::load_profile;
pub use posting::{canonical_url, Posting};
pub use profile::{CandidateProfile, StandardAnswers};
pub use record::{ApplicationStatus, LedgerRecord, YesNo, LEDGER_COLUMNS};
