use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stages of the guided listing conversation, in their fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Start,
    Category,
    Title,
    Condition,
    SubmissionType,
    Price,
    Description,
    Images,
    Review,
}

/// Phrases that mark a donation or free giveaway at the submission-type step.
const DONATION_MARKERS: &[&str] = &[
    "donat",
    "free",
    "give away",
    "giveaway",
    "no charge",
    "for charity",
];

impl WizardStep {
    pub const ORDER: [WizardStep; 9] = [
        WizardStep::Start,
        WizardStep::Category,
        WizardStep::Title,
        WizardStep::Condition,
        WizardStep::SubmissionType,
        WizardStep::Price,
        WizardStep::Description,
        WizardStep::Images,
        WizardStep::Review,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::Start => "start",
            WizardStep::Category => "category",
            WizardStep::Title => "title",
            WizardStep::Condition => "condition",
            WizardStep::SubmissionType => "submission_type",
            WizardStep::Price => "price",
            WizardStep::Description => "description",
            WizardStep::Images => "images",
            WizardStep::Review => "review",
        }
    }

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|step| *step == self)
            .unwrap_or(Self::ORDER.len() - 1)
    }

    /// The following step in order; `Review` stays put.
    pub fn successor(self) -> WizardStep {
        Self::ORDER
            .get(self.position() + 1)
            .copied()
            .unwrap_or(WizardStep::Review)
    }

    pub fn is_terminal(self) -> bool {
        self == WizardStep::Review
    }

    /// What the assistant should collect while the conversation sits on this step.
    pub fn prompt_hint(self) -> &'static str {
        match self {
            WizardStep::Start => "Greet the user and ask what item they would like to list.",
            WizardStep::Category => {
                "Ask which category fits the item best (clothing, toys, books, home, electronics, other)."
            }
            WizardStep::Title => "Help the user write a short, specific title for the listing.",
            WizardStep::Condition => {
                "Ask about the item's condition: new, like new, good, or fair."
            }
            WizardStep::SubmissionType => {
                "Ask whether the user wants to sell the item for the charity or donate it for free."
            }
            WizardStep::Price => {
                "Ask for an asking price and mention that proceeds support the charity."
            }
            WizardStep::Description => {
                "Help the user describe the item honestly, including size, material, and flaws."
            }
            WizardStep::Images => "Ask the user to upload clear photos of the item.",
            WizardStep::Review => {
                "Summarize the collected listing and ask the user to confirm or change details."
            }
        }
    }

    /// Quick replies offered to the user on this step.
    pub fn suggestions(self) -> &'static [&'static str] {
        match self {
            WizardStep::Start => &["I want to list an item", "How does donating work?"],
            WizardStep::Category => &["Clothing", "Toys", "Books", "Home", "Electronics", "Other"],
            WizardStep::Title => &["Suggest a title for me"],
            WizardStep::Condition => &["New", "Like new", "Good", "Fair"],
            WizardStep::SubmissionType => &["I want to sell it", "I want to donate it"],
            WizardStep::Price => &["Suggest a price", "$5", "$10", "$20"],
            WizardStep::Description => &["Write a description for me"],
            WizardStep::Images => &["I've uploaded photos", "Skip photos for now"],
            WizardStep::Review => &["Looks good, submit it", "I want to change something"],
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown wizard step '{0}'")]
pub struct UnknownStep(pub String);

impl FromStr for WizardStep {
    type Err = UnknownStep;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ORDER
            .iter()
            .copied()
            .find(|step| step.as_str() == normalized)
            .ok_or_else(|| UnknownStep(value.to_string()))
    }
}

pub fn signals_donation(message: &str) -> bool {
    let folded = message.to_lowercase();
    DONATION_MARKERS.iter().any(|marker| folded.contains(marker))
}

/// Next wizard step for a user message; callers persist the result.
pub fn next_step(current: WizardStep, user_message: &str) -> WizardStep {
    if current == WizardStep::SubmissionType && signals_donation(user_message) {
        return WizardStep::Description;
    }
    current.successor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_advances_to_category() {
        assert_eq!(next_step(WizardStep::Start, "hello"), WizardStep::Category);
        assert_eq!(next_step(WizardStep::Start, ""), WizardStep::Category);
    }

    #[test]
    fn review_is_terminal() {
        assert_eq!(next_step(WizardStep::Review, "submit"), WizardStep::Review);
        assert_eq!(next_step(WizardStep::Review, "free"), WizardStep::Review);
        assert!(WizardStep::Review.is_terminal());
    }

    #[test]
    fn donation_intent_skips_price() {
        assert_eq!(
            next_step(WizardStep::SubmissionType, "I want to donate this"),
            WizardStep::Description
        );
        assert_eq!(
            next_step(WizardStep::SubmissionType, "Happy to GIVE AWAY for free"),
            WizardStep::Description
        );
        assert_eq!(
            next_step(WizardStep::SubmissionType, "I'll sell it"),
            WizardStep::Price
        );
    }

    #[test]
    fn donation_markers_only_branch_at_submission_type() {
        assert_eq!(
            next_step(WizardStep::Condition, "free to a good home"),
            WizardStep::SubmissionType
        );
        assert_eq!(
            next_step(WizardStep::Price, "donate"),
            WizardStep::Description
        );
    }

    #[test]
    fn every_step_moves_forward_by_one() {
        for pair in WizardStep::ORDER.windows(2) {
            assert_eq!(next_step(pair[0], "ok"), pair[1]);
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        assert_eq!(
            "submission_type".parse::<WizardStep>(),
            Ok(WizardStep::SubmissionType)
        );
        assert_eq!(" Review ".parse::<WizardStep>(), Ok(WizardStep::Review));
        assert_eq!(
            "checkout".parse::<WizardStep>(),
            Err(UnknownStep("checkout".to_string()))
        );
        assert_eq!(
            serde_json::to_value(WizardStep::SubmissionType).expect("serializes"),
            "submission_type"
        );
    }
}
