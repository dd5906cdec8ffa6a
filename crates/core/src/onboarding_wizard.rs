//! Onboarding wizard step schema and progress model.
//!
//! [`STEP_ORDER`] is the single source of truth for step sequencing. The
//! orchestrator asks a step for its [`next`](OnboardingStep::next) or
//! [`previous`](OnboardingStep::previous) neighbour instead of wiring
//! successors by hand.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Onboarding steps
// ---------------------------------------------------------------------------

/// The steps of the onboarding wizard, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Welcome,
    Company,
    Personalization,
    Digital,
    Materials,
    Review,
    Success,
}

/// Canonical forward order of the wizard.
pub const STEP_ORDER: [OnboardingStep; 7] = [
    OnboardingStep::Welcome,
    OnboardingStep::Company,
    OnboardingStep::Personalization,
    OnboardingStep::Digital,
    OnboardingStep::Materials,
    OnboardingStep::Review,
    OnboardingStep::Success,
];

/// Steps the review screen can send the user back to for editing.
pub const EDITABLE_FROM_REVIEW: [OnboardingStep; 4] = [
    OnboardingStep::Company,
    OnboardingStep::Personalization,
    OnboardingStep::Digital,
    OnboardingStep::Materials,
];

impl OnboardingStep {
    /// The first step of a new session.
    pub const INITIAL: Self = Self::Welcome;

    /// Parse a step identifier as stored in a draft.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        STEP_ORDER
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid onboarding step '{s}'. Must be one of: welcome, company, \
                     personalization, digital, materials, review, success"
                ))
            })
    }

    /// Convert to the stored identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Company => "company",
            Self::Personalization => "personalization",
            Self::Digital => "digital",
            Self::Materials => "materials",
            Self::Review => "review",
            Self::Success => "success",
        }
    }

    /// Position in [`STEP_ORDER`] (0-based).
    pub fn index(self) -> usize {
        match self {
            Self::Welcome => 0,
            Self::Company => 1,
            Self::Personalization => 2,
            Self::Digital => 3,
            Self::Materials => 4,
            Self::Review => 5,
            Self::Success => 6,
        }
    }

    /// The step after this one, or `None` at the end of the flow.
    pub fn next(self) -> Option<Self> {
        STEP_ORDER.get(self.index() + 1).copied()
    }

    /// The step before this one, or `None` at the start of the flow.
    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| STEP_ORDER[i])
    }

    /// Progress percentage shown in the progress bar.
    pub fn progress(self) -> u8 {
        match self {
            Self::Welcome => 0,
            Self::Company => 25,
            Self::Personalization => 50,
            Self::Digital => 75,
            Self::Materials => 90,
            Self::Review | Self::Success => 100,
        }
    }

    /// Progress bar label. Empty for steps that hide the bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Company => "Bloco 1 de 4 - Informações da Empresa e Acordo Comercial",
            Self::Personalization => "Bloco 2 de 4 - Personalização da IA",
            Self::Digital => "Bloco 3 de 4 - Presença Digital",
            Self::Materials => "Bloco 4 de 4 - Materiais e Informações",
            Self::Review => "Revisão Final",
            Self::Welcome | Self::Success => "",
        }
    }

    /// Whether the step collects form data (and therefore has a validator).
    pub fn is_data_entry(self) -> bool {
        EDITABLE_FROM_REVIEW.contains(&self)
    }

    /// Whether the session has reached its terminal state.
    pub fn is_terminal(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_from_str_roundtrip() {
        for step in STEP_ORDER {
            assert_eq!(OnboardingStep::from_str_db(step.as_str()).unwrap(), step);
        }
    }

    #[test]
    fn step_from_str_invalid() {
        assert!(OnboardingStep::from_str_db("integration").is_err());
        assert!(OnboardingStep::from_str_db("").is_err());
    }

    #[test]
    fn index_matches_order() {
        for (i, step) in STEP_ORDER.iter().enumerate() {
            assert_eq!(step.index(), i);
        }
    }

    #[test]
    fn next_and_previous_follow_order() {
        assert_eq!(OnboardingStep::Welcome.next(), Some(OnboardingStep::Company));
        assert_eq!(OnboardingStep::Materials.next(), Some(OnboardingStep::Review));
        assert_eq!(OnboardingStep::Review.next(), Some(OnboardingStep::Success));
        assert_eq!(OnboardingStep::Success.next(), None);

        assert_eq!(OnboardingStep::Welcome.previous(), None);
        assert_eq!(
            OnboardingStep::Company.previous(),
            Some(OnboardingStep::Welcome)
        );
        assert_eq!(
            OnboardingStep::Review.previous(),
            Some(OnboardingStep::Materials)
        );
    }

    #[test]
    fn progress_is_non_decreasing() {
        let progress: Vec<u8> = STEP_ORDER.iter().map(|s| s.progress()).collect();
        assert!(progress.windows(2).all(|w| w[0] <= w[1]), "{progress:?}");
        assert_eq!(progress.first(), Some(&0));
        assert_eq!(progress.last(), Some(&100));
    }

    #[test]
    fn data_entry_steps_have_labels() {
        for step in EDITABLE_FROM_REVIEW {
            assert!(step.is_data_entry());
            assert!(!step.label().is_empty());
        }
        assert!(!OnboardingStep::Welcome.is_data_entry());
        assert!(!OnboardingStep::Review.is_data_entry());
    }

    #[test]
    fn only_success_is_terminal() {
        for step in STEP_ORDER {
            assert_eq!(step.is_terminal(), step == OnboardingStep::Success);
        }
    }
}
