//! Mastery phase state machine.

use crate::types::{Grade, LearningPhase};

/// A phase change produced by one completed review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: LearningPhase,
    pub to: LearningPhase,
}

impl PhaseTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

impl LearningPhase {
    /// Phase after one completed review.
    ///
    /// The first review is a guided pass and always moves a beginner on.
    /// Leaving `Learning` needs a passing grade. `Mastered` is terminal.
    pub fn advance(self, grade: Grade) -> PhaseTransition {
        let to = match self {
            Self::Beginner => Self::Learning,
            Self::Learning if grade.is_passing() => Self::Mastered,
            Self::Learning => Self::Learning,
            Self::Mastered => Self::Mastered,
        };
        PhaseTransition { from: self, to }
    }

    /// Grade to record without asking the learner, if any.
    pub fn auto_grade(self) -> Option<Grade> {
        match self {
            Self::Beginner => Some(Grade::Good),
            Self::Learning | Self::Mastered => None,
        }
    }
}
