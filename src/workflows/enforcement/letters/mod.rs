//! Correspondence generation: template catalog, bureau directory, and the
//! composer that binds dispute data into finished letters.

mod bureaus;
mod composer;
mod templates;

pub use bureaus::{BureauDirectory, BureauInfo};
pub use composer::{ComposeError, ComposedLetter, LetterComposer};
pub use templates::{LetterTemplate, RecipientClass, TemplateLibrary};

use super::domain::{DisputeType, EnforcementStage, LetterId, LetterKind};

/// A requested correspondence key does not exist. Never silently substituted
/// with an arbitrary template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("no letter template registered for dispute type '{}' at {:?}", dispute_type.label(), kind)]
    TemplateNotFound {
        dispute_type: DisputeType,
        kind: LetterKind,
    },
    #[error("stage '{}' does not produce correspondence", .0.label())]
    StageWithoutLetter(EnforcementStage),
    #[error("letter {0} does not belong to this dispute")]
    LetterNotFound(LetterId),
}
