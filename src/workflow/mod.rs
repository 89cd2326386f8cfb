pub mod form_filler;
pub mod login_flow;
pub mod submission_ctx;
pub mod submission_flow;

pub use form_filler::{FillReport, FormFiller};
pub use login_flow::LoginFlow;
pub use submission_ctx::SubmissionCtx;
pub use submission_flow::{AbandonReason, SubmissionFlow, SubmissionOutcome, SubmissionState};
