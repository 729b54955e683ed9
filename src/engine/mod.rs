pub mod diff;
pub mod feedback;
pub mod metrics;
pub mod tokenizer;

pub use diff::{CharStatus, CharacterHighlight, Diff, Mark, align};
pub use feedback::{Feedback, FeedbackBands, FeedbackGenerator};
pub use metrics::{
    GrossSpeedFormula, MetricsCalculator, MetricsInput, MetricsSnapshot, QualificationPolicy,
    WordOutcome,
};
pub use tokenizer::TokenizedPassage;
