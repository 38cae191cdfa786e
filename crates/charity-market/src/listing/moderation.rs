use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Prohibited-item terms screened before a listing reaches pricing.
pub const DEFAULT_DENYLIST: &[&str] = &[
    // weapons
    "gun",
    "rifle",
    "pistol",
    "firearm",
    "ammunition",
    "ammo",
    "explosive",
    "grenade",
    "weapon",
    // drugs
    "drug",
    "cocaine",
    "heroin",
    "marijuana",
    "cannabis",
    "meth",
    "narcotic",
    "prescription",
    // alcohol
    "alcohol",
    "beer",
    "wine",
    "vodka",
    "whiskey",
    "liquor",
    // tobacco
    "tobacco",
    "cigarette",
    "cigar",
    "vape",
    "nicotine",
    // counterfeit
    "counterfeit",
    "replica",
    "fake",
    "knockoff",
];

/// Outcome of screening one submission's free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub approved: bool,
    pub requires_manual_review: bool,
    pub flagged_keywords: BTreeSet<String>,
}

impl ModerationVerdict {
    fn from_matches(flagged_keywords: BTreeSet<String>) -> Self {
        let approved = flagged_keywords.is_empty();
        Self {
            approved,
            requires_manual_review: !approved,
            flagged_keywords,
        }
    }

    pub fn reason(&self) -> Option<String> {
        if self.approved {
            return None;
        }
        let terms: Vec<&str> = self.flagged_keywords.iter().map(String::as_str).collect();
        Some(format!(
            "Content contains prohibited keywords: {}",
            terms.join(", ")
        ))
    }
}

/// Keyword denylist gate.
///
/// Matching is a raw substring scan over case-folded text: no stemming and no
/// word boundaries, so "beerbottle" is flagged for "beer" and "begun" for
/// "gun". Those false positives are accepted behavior.
#[derive(Debug, Clone)]
pub struct ModerationGate {
    denylist: Vec<String>,
}

impl Default for ModerationGate {
    fn default() -> Self {
        Self::new(DEFAULT_DENYLIST.iter().copied())
    }
}

impl ModerationGate {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut denylist: Vec<String> = terms
            .into_iter()
            .map(|term| term.as_ref().trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        denylist.sort();
        denylist.dedup();
        Self { denylist }
    }

    pub fn denylist(&self) -> &[String] {
        &self.denylist
    }

    pub fn evaluate(&self, text: &str) -> ModerationVerdict {
        let folded = text.to_lowercase();
        let matches = self
            .denylist
            .iter()
            .filter(|term| folded.contains(term.as_str()))
            .cloned()
            .collect();
        ModerationVerdict::from_matches(matches)
    }

    /// Screens the fields a submission exposes to buyers.
    pub fn screen(&self, title: &str, description: &str, category: &str) -> ModerationVerdict {
        self.evaluate(&format!("{title} {description} {category}"))
    }
}
