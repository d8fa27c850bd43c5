use std::fmt::Write;

use triage_vector::types::ScoredHit;

/// The grounding context handed to the generator: a case-tagged text
/// block and a parallel reference list, one line per hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledContext {
    pub context: String,
    pub references: String,
}

/// Convert ranked hits into the context and reference blocks.
///
/// Case text is included in full — trimming for the generator's token
/// budget is the generator's tuning concern, not this component's.
pub fn assemble(hits: &[ScoredHit]) -> AssembledContext {
    let mut context = String::new();
    let mut references = String::new();

    for hit in hits {
        let _ = write!(context, "\n[Case {}]\n{}\n", hit.id, hit.text);
        let _ = writeln!(
            references,
            "- {} (similarity: {:.2})",
            hit.id,
            hit.similarity()
        );
    }

    AssembledContext {
        context,
        references,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn hit(id: &str, text: &str, distance: f64) -> ScoredHit {
        ScoredHit {
            id: id.to_string(),
            text: text.to_string(),
            metadata: HashMap::new(),
            distance,
        }
    }

    #[test]
    fn empty_hits_produce_empty_blocks() {
        let assembled = assemble(&[]);
        assert_eq!(assembled, AssembledContext::default());
    }

    #[test]
    fn context_tags_each_case_and_keeps_full_text() {
        let hits = vec![
            hit("A1", "boot loop after firmware update", 0.1),
            hit("A2", "wifi drops every few minutes", 0.4),
        ];
        let assembled = assemble(&hits);
        assert!(assembled.context.contains("[Case A1]\nboot loop after firmware update"));
        assert!(assembled.context.contains("[Case A2]\nwifi drops every few minutes"));
    }

    #[test]
    fn one_reference_line_per_hit_with_two_decimal_similarity() {
        let hits = vec![hit("A1", "t1", 0.1), hit("A2", "t2", 0.25)];
        let assembled = assemble(&hits);
        let lines: Vec<&str> = assembled.references.lines().collect();
        assert_eq!(lines, vec![
            "- A1 (similarity: 0.90)",
            "- A2 (similarity: 0.75)",
        ]);
    }

    #[test]
    fn long_case_text_is_not_truncated() {
        let long_text = "x".repeat(20_000);
        let assembled = assemble(&[hit("A1", &long_text, 0.0)]);
        assert!(assembled.context.contains(&long_text));
    }
}
