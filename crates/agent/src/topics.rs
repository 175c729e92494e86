//! Topic & concern extraction for turns that fell out of the window.
//!
//! Older requester turns are lower-cased and matched against a fixed
//! taxonomy of trigger substrings. The result is a compact annotation that
//! rides along at the end of the system prompt instead of the turns
//! themselves.

use std::collections::BTreeSet;

use cyclemate_core::message::Turn;
use serde::Serialize;

/// Canonical topic label and the substrings that trigger it.
pub type Trigger = (&'static str, &'static [&'static str]);

/// Topic taxonomy. Matching is case-insensitive substring search.
pub const TOPICS: &[Trigger] = &[
    (
        "cycle tracking",
        &["track", "calendar", "cycle length", "predict", "next period", "period app"],
    ),
    (
        "symptoms",
        &["symptom", "bloat", "headache", "nausea", "tender", "fatigue", "tired", "acne"],
    ),
    ("pain management", &["cramp", "pain", "ache", "discomfort"]),
    ("irregular cycles", &["irregular", "late", "missed", "early"]),
    ("flow", &["flow", "heavy", "spotting", "clot", "bleeding"]),
    (
        "mood & emotions",
        &["mood", "emotion", "anxious", "anxiety", "sad", "irritable", "depress", "stress", "cry"],
    ),
    (
        "lifestyle",
        &["exercise", "workout", "diet", "food", "sleep", "nutrition", "caffeine"],
    ),
    (
        "products",
        &["pad", "tampon", "menstrual cup", "period underwear", "product"],
    ),
    (
        "hormones",
        &["hormone", "estrogen", "progesterone", "pcos", "thyroid", "birth control"],
    ),
    ("ovulation", &["ovulat", "fertile", "fertility", "conceive"]),
];

/// Concern taxonomy, tracked separately from topics.
pub const CONCERNS: &[Trigger] = &[
    ("expressed concerns", &["worried", "concerned"]),
    ("discussed medical consultation", &["doctor", "medical"]),
];

/// Labels derived from turns outside the window. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicAnnotation {
    pub topics: BTreeSet<&'static str>,
    pub concerns: BTreeSet<&'static str>,
}

impl TopicAnnotation {
    /// Scan `older` for topics and concerns.
    ///
    /// Only requester turns are considered. Returns `None` when nothing
    /// matched, so callers have nothing to append.
    pub fn extract(older: &[Turn]) -> Option<Self> {
        let mut topics = BTreeSet::new();
        let mut concerns = BTreeSet::new();

        for turn in older.iter().filter(|t| t.is_requester()) {
            let text = turn.content.to_lowercase();
            collect_matches(&text, TOPICS, &mut topics);
            collect_matches(&text, CONCERNS, &mut concerns);
        }

        if topics.is_empty() && concerns.is_empty() {
            None
        } else {
            Some(Self { topics, concerns })
        }
    }

    /// All labels, topics first.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.topics.iter().chain(self.concerns.iter()).copied()
    }

    /// One natural-language sentence for the system prompt suffix.
    pub fn render(&self) -> String {
        let labels: Vec<&str> = self.labels().collect();
        format!(
            "Earlier in this conversation, before the recent messages, the user touched on: {}.",
            labels.join(", ")
        )
    }
}

fn collect_matches(text: &str, taxonomy: &[Trigger], into: &mut BTreeSet<&'static str>) {
    for (label, triggers) in taxonomy {
        if into.contains(label) {
            continue;
        }
        if triggers.iter().any(|t| text.contains(t)) {
            into.insert(*label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cramps_mean_pain_management() {
        let older = vec![Turn::requester("I've been having really bad cramps")];
        let annotation = TopicAnnotation::extract(&older).unwrap();
        assert!(annotation.topics.contains("pain management"));
    }

    #[test]
    fn no_matches_is_no_annotation() {
        let older = vec![
            Turn::requester("hello there"),
            Turn::assistant("Hi! How can I help?"),
        ];
        assert!(TopicAnnotation::extract(&older).is_none());
        assert!(TopicAnnotation::extract(&[]).is_none());
    }

    #[test]
    fn assistant_turns_are_ignored() {
        let older = vec![
            Turn::requester("hi"),
            Turn::assistant("Cramps and irregular cycles are common. See a doctor if worried."),
        ];
        assert!(TopicAnnotation::extract(&older).is_none());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let older = vec![Turn::requester("My period is IRREGULAR lately")];
        let annotation = TopicAnnotation::extract(&older).unwrap();
        assert!(annotation.topics.contains("irregular cycles"));
    }

    #[test]
    fn labels_appear_once() {
        let older = vec![
            Turn::requester("cramps again"),
            Turn::requester("the pain is worse, I'm worried"),
            Turn::requester("still worried about the ache"),
        ];
        let annotation = TopicAnnotation::extract(&older).unwrap();
        assert_eq!(
            annotation.labels().filter(|l| *l == "pain management").count(),
            1
        );
        assert_eq!(annotation.concerns.len(), 1);
        assert!(annotation.concerns.contains("expressed concerns"));
    }

    #[test]
    fn concerns_alone_still_annotate() {
        let older = vec![Turn::requester("Should I ask my doctor?")];
        let annotation = TopicAnnotation::extract(&older).unwrap();
        assert!(annotation.topics.is_empty());
        assert!(annotation.concerns.contains("discussed medical consultation"));
        assert!(annotation.render().contains("discussed medical consultation"));
    }

    #[test]
    fn render_joins_all_labels() {
        let older = vec![
            Turn::requester("my cycle is irregular and I get cramps"),
            Turn::requester("I'm concerned"),
        ];
        let text = TopicAnnotation::extract(&older).unwrap().render();
        assert!(text.contains("irregular cycles"));
        assert!(text.contains("pain management"));
        assert!(text.contains("expressed concerns"));
        assert!(text.ends_with('.'));
    }

    #[test]
    fn extraction_is_deterministic() {
        let older = vec![
            Turn::requester("mood swings and bloating"),
            Turn::requester("which tampon is best?"),
        ];
        let a = TopicAnnotation::extract(&older).unwrap().render();
        let b = TopicAnnotation::extract(&older).unwrap().render();
        assert_eq!(a, b);
    }

    #[test]
    fn taxonomy_labels_are_unique() {
        let mut seen = BTreeSet::new();
        for (label, triggers) in TOPICS.iter().chain(CONCERNS) {
            assert!(seen.insert(*label), "duplicate label {label}");
            assert!(!triggers.is_empty());
            assert!(triggers.iter().all(|t| *t == t.to_lowercase()));
        }
    }
}
