use serde::{Deserialize, Serialize};

pub const MAX_SUMMARY_CHARS: usize = 500;
pub const MAX_FACT_CHARS: usize = 200;
pub const MAX_COOL_FACTS: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReadmeAnalysis {
    pub summary: String,
    #[serde(default)]
    pub cool_facts: Vec<String>,
}

impl ReadmeAnalysis {
    /// Bring model output within bounds: summary up to 500 chars, 1-4 facts of
    /// up to 200 chars each. Returns `None` when nothing usable remains.
    pub fn normalized(self) -> Option<Self> {
        let summary = truncate_chars(self.summary.trim(), MAX_SUMMARY_CHARS);
        if summary.is_empty() {
            return None;
        }

        let cool_facts: Vec<String> = self
            .cool_facts
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .take(MAX_COOL_FACTS)
            .map(|f| truncate_chars(f, MAX_FACT_CHARS))
            .collect();
        if cool_facts.is_empty() {
            return None;
        }

        Some(Self { summary, cool_facts })
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps_lengths() {
        let analysis = ReadmeAnalysis {
            summary: "x".repeat(700),
            cool_facts: vec![
                "  ".to_string(),
                "a".repeat(250),
                "b".to_string(),
                "c".to_string(),
                "d".to_string(),
                "e".to_string(),
            ],
        };

        let normalized = analysis.normalized().unwrap();
        assert_eq!(normalized.summary.chars().count(), MAX_SUMMARY_CHARS);
        assert_eq!(normalized.cool_facts.len(), MAX_COOL_FACTS);
        assert_eq!(normalized.cool_facts[0].len(), MAX_FACT_CHARS);
        assert_eq!(normalized.cool_facts[3], "d");
    }

    #[test]
    fn test_normalized_rejects_empty() {
        let no_facts = ReadmeAnalysis {
            summary: "A tool".to_string(),
            cool_facts: vec![],
        };
        assert!(no_facts.normalized().is_none());

        let no_summary = ReadmeAnalysis {
            summary: "   ".to_string(),
            cool_facts: vec!["fact".to_string()],
        };
        assert!(no_summary.normalized().is_none());
    }
}
