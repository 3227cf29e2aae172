//! # Keyword Rules
//!
//! File: cli/src/core/rules.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A `KeywordRule` ties a handful of lowercase trigger substrings to a fixed
//! answer. The rule table is an ordered `Vec<KeywordRule>` loaded once at
//! startup and never mutated; order matters because the router returns the
//! first rule that matches.
//!
//! When no `[[rules]]` are configured, `builtin_rules()` supplies the default
//! table.
//!
use serde::{Deserialize, Serialize};

/// A static association between trigger substrings and a fixed reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordRule {
    /// Lowercase substrings; any one of them triggers the rule.
    pub keywords: Vec<String>,
    /// Reply returned verbatim when the rule fires.
    pub answer: String,
}

impl KeywordRule {
    /// Builds a rule, normalizing keywords to trimmed lowercase.
    pub fn new<K, S>(keywords: K, answer: impl Into<String>) -> Self
    where
        K: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .collect(),
            answer: answer.into(),
        }
    }

    /// Returns true when any keyword occurs in `lowered`.
    ///
    /// `lowered` must already be lowercase; the router lowercases once per
    /// message instead of once per rule.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    /// Trims and lowercases keywords read from a config file.
    pub(crate) fn normalize(&mut self) {
        for keyword in &mut self.keywords {
            *keyword = keyword.trim().to_lowercase();
        }
    }

    /// Checks the rule is usable: at least one keyword, no blank keyword,
    /// a non-blank answer. Returns a human-readable reason on failure.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if self.keywords.is_empty() {
            return Err("rule has no keywords".into());
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err("rule contains an empty keyword".into());
        }
        if self.answer.trim().is_empty() {
            return Err(format!(
                "rule for keywords {:?} has an empty answer",
                self.keywords
            ));
        }
        Ok(())
    }
}

/// The built-in rule table, in match order.
pub fn builtin_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(
            ["life story", "about your life", "your story"],
            "I'm a passionate developer who has always been fascinated by the intersection of technology and human interaction. My journey in tech has been driven by a desire to create meaningful solutions that make a real impact. I've worked on various projects that combine AI with practical applications, always focusing on user-centric design and innovation.",
        ),
        KeywordRule::new(
            ["superpower", "#1 superpower", "your superpower"],
            "My #1 superpower is my ability to rapidly learn and adapt to new technologies while maintaining a strong focus on practical implementation. I can quickly grasp complex concepts and translate them into working solutions, which has been crucial in my work with AI and voice technologies.",
        ),
        KeywordRule::new(
            ["areas you'd like to grow", "areas to grow", "grow in", "improve"],
            "The top 3 areas I'm focusing on growing in are: Advanced AI/ML implementation and optimization; Leadership and team management skills; Strategic product development and scaling.",
        ),
        KeywordRule::new(
            ["misconception", "misconceptions", "coworkers have about you"],
            "A common misconception my coworkers have about me is that I'm purely technical. While I do have strong technical skills, I'm equally passionate about understanding user needs and creating solutions that solve real problems. I believe in the importance of balancing technical excellence with practical business value.",
        ),
        KeywordRule::new(
            ["push your boundaries", "push boundaries", "limits", "step out of comfort zone"],
            "I push my boundaries by constantly taking on challenging projects that force me to learn new skills. I actively seek out opportunities to work on cutting-edge technologies and complex problems. I believe in setting ambitious goals and working systematically to achieve them, even if it means stepping out of my comfort zone.",
        ),
    ]
}
