// Core chunking logic: sentence-aware greedy packing with a force-split fallback.

use std::sync::OnceLock;

use regex::Regex;

use crate::pipeline::error::PipelineError;

// a sentence with its terminators and trailing whitespace, or a terminator-less tail
fn unit_re() -> &'static Regex {
    static UNIT_RE: OnceLock<Regex> = OnceLock::new();
    UNIT_RE.get_or_init(|| Regex::new(r"[^.!?]*[.!?]+\s*|[^.!?]+").expect("sentence regex is valid"))
}

/// Length in characters, the unit every budget is expressed in.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Sentence-like units in input order. Concatenating them yields `text` exactly.
pub fn sentence_units(text: &str) -> impl Iterator<Item = &str> {
    unit_re().find_iter(text).map(|m| m.as_str())
}

/// Split `text` into chunks of at most `max_chars` characters, preferring sentence
/// boundaries. Accumulated chunks are trimmed when flushed; a single unit longer
/// than the budget is cut into fixed-size slices which are kept verbatim.
pub fn chunk_text(text: &str, max_chars: usize) -> Result<Vec<String>, PipelineError> {
    if max_chars == 0 {
        return Err(PipelineError::InvalidBudget { budget: max_chars });
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for unit in sentence_units(text) {
        let unit_len = char_len(unit);
        if current_len + unit_len <= max_chars {
            current.push_str(unit);
            current_len += unit_len;
            continue;
        }

        flush(&mut out, &mut current);
        current_len = 0;

        if unit_len > max_chars {
            out.extend(force_split(unit, max_chars));
        } else {
            current.push_str(unit);
            current_len = unit_len;
        }
    }
    flush(&mut out, &mut current);

    Ok(out)
}

fn flush(out: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
    current.clear();
}

fn force_split(unit: &str, max_chars: usize) -> Vec<String> {
    let mut slices = Vec::new();
    let mut start = 0usize;
    let mut count = 0usize;
    for (idx, _) in unit.char_indices() {
        if count == max_chars {
            slices.push(unit[start..idx].to_string());
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < unit.len() {
        slices.push(unit[start..].to_string());
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;

    // Walks `text` chunk by chunk; only whitespace dropped by a trim may sit between chunks.
    fn assert_covers(text: &str, chunks: &[String]) {
        let mut rest = text;
        for c in chunks {
            if !rest.starts_with(c.as_str()) {
                rest = rest.trim_start();
            }
            assert!(rest.starts_with(c.as_str()), "chunk {c:?} not found at {rest:?}");
            rest = &rest[c.len()..];
        }
        assert!(rest.trim().is_empty(), "uncovered tail {rest:?}");
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 10).unwrap().is_empty());
    }

    #[test]
    fn zero_budget_is_rejected() {
        let err = chunk_text("Hello.", 0).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidBudget { budget: 0 }));
    }

    #[test]
    fn units_reconstruct_text() {
        let text = "...leading dots. Mid? Yes!! trailing tail";
        let units: Vec<&str> = sentence_units(text).collect();
        assert_eq!(units, vec!["...", "leading dots. ", "Mid? ", "Yes!! ", "trailing tail"]);
        assert_eq!(units.concat(), text);
    }

    #[test]
    fn oversized_sentence_is_force_split() {
        let chunks = chunk_text("One. Two. Three.", 5).unwrap();
        assert_eq!(chunks, vec!["One.", "Two.", "Three", "."]);
    }

    #[test]
    fn packs_sentences_up_to_budget() {
        let chunks = chunk_text("First sentence. Second one here. Third.", 20).unwrap();
        assert_eq!(chunks, vec!["First sentence.", "Second one here.", "Third."]);

        let chunks = chunk_text("A b. C d. E f.", 10).unwrap();
        assert_eq!(chunks, vec!["A b. C d.", "E f."]);
    }

    #[test]
    fn tail_without_terminator_is_kept() {
        let chunks = chunk_text("Done. and then some", 100).unwrap();
        assert_eq!(chunks, vec!["Done. and then some"]);
    }

    #[test]
    fn force_split_slices_are_not_trimmed() {
        let chunks = chunk_text("ab cd ef", 3).unwrap();
        assert_eq!(chunks, vec!["ab ", "cd ", "ef"]);
    }

    #[test]
    fn slices_count_chars_not_bytes() {
        let chunks = chunk_text("ééééé", 2).unwrap();
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn chunks_respect_budget_and_cover_input() {
        let texts = [
            "The quick brown fox jumps. Over the lazy dog! Did it? Yes.",
            "no terminators at all in this fairly long run of words",
            "  Leading space. Émigré café, naïve résumé? Ünïcödé text!  ",
            "Short. A much much longer sentence that will not fit in small budgets. End",
        ];
        for text in texts {
            for budget in 1..=40 {
                let chunks = chunk_text(text, budget).unwrap();
                assert!(!chunks.is_empty(), "no chunks for budget {budget}");
                for c in &chunks {
                    assert!(char_len(c) <= budget, "{c:?} exceeds {budget}");
                }
                assert_covers(text, &chunks);
            }
        }
    }
}
