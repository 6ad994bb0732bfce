//! Automatic essay scoring on a 0..=5 scale.
//!
//! Three tiers, tried in order: numeric comparison when the model answer
//! is essentially a number, keyword overlap otherwise, and a plain
//! containment check when the model answer has no usable keywords.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(\.\d+)?").expect("literal pattern"));

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has",
        "had", "do", "does", "did", "will", "would", "could", "should", "may", "might",
        "shall", "can", "to", "of", "in", "on", "at", "by", "for", "with", "and", "or",
        "but", "if", "this", "that", "it", "its", "as", "from", "into",
    ]
    .into_iter()
    .collect()
});

/// Relative tolerance for numeric answers.
const NUMERIC_TOLERANCE: f32 = 0.02;
/// A model answer whose non-numeric residue is shorter than this is
/// treated as numeric.
const NUMERIC_RESIDUE_MAX: usize = 16;

/// Score a free-text answer against the model answer.
pub fn grade(user_text: &str, model_text: &str) -> u8 {
    let user = normalize(user_text);
    let model = normalize(model_text);
    if user.is_empty() {
        return 0;
    }
    if model.is_empty() {
        return 0;
    }

    let model_numbers: Vec<f32> = numbers_in(&model);
    if !model_numbers.is_empty() && numeric_residue(&model) < NUMERIC_RESIDUE_MAX {
        return grade_numeric(&user, &model_numbers);
    }

    let keywords: Vec<&str> = model
        .split_whitespace()
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(w))
        .collect();

    if keywords.is_empty() {
        return if user.contains(&model) || model.contains(&user) {
            5
        } else {
            0
        };
    }

    let hits = keywords.iter().filter(|kw| user.contains(*kw)).count();
    match hits as f32 / keywords.len() as f32 {
        r if r >= 0.8 => 5,
        r if r >= 0.6 => 4,
        r if r >= 0.4 => 3,
        r if r >= 0.2 => 2,
        r if r > 0.0 => 1,
        _ => 0,
    }
}

fn grade_numeric(user: &str, model_numbers: &[f32]) -> u8 {
    let user_numbers = numbers_in(user);
    if user_numbers.is_empty() {
        return 0;
    }
    let all_matched = model_numbers.iter().all(|m| {
        user_numbers
            .iter()
            .any(|u| (u - m).abs() / m.abs().max(1.0) < NUMERIC_TOLERANCE)
    });
    if all_matched {
        5
    } else {
        1
    }
}

fn numbers_in(text: &str) -> Vec<f32> {
    NUMBER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Length of the model answer with every number and all whitespace
/// removed. Short residue means the answer is "the number, plus filler".
fn numeric_residue(model: &str) -> usize {
    NUMBER
        .replace_all(model, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .count()
}

/// Lowercase, strip punctuation to spaces, collapse runs of whitespace.
fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .map(|c| {
            if matches!(
                c,
                '.' | ',' | ';' | ':' | '!' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '"'
                    | '\'' | '/' | '\\'
            ) {
                ' '
            } else {
                c
            }
        })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_numeric_answer_scores_full() {
        assert_eq!(grade("42", "42"), 5);
        assert_eq!(grade("42", "The answer is 42."), 5);
    }

    #[test]
    fn numeric_within_two_percent_scores_full() {
        assert_eq!(grade("99", "100"), 5);
        assert_eq!(grade("199", "200"), 5);
    }

    #[test]
    fn decimal_point_splits_into_integer_comparisons() {
        // Normalization strips '.', so "41.6" yields the numbers 41 and 6;
        // 41 falls outside the tolerance band around 42.
        assert_eq!(grade("41.6", "42"), 1);
        assert_eq!(grade("3.14", "3.14159"), 1);
    }

    #[test]
    fn numeric_outside_tolerance_scores_one() {
        assert_eq!(grade("50", "42"), 1);
        assert_eq!(grade("100", "42"), 1);
    }

    #[test]
    fn numeric_expected_but_absent_scores_zero() {
        assert_eq!(grade("no idea", "42"), 0);
    }

    #[test]
    fn keyword_overlap_breakpoints() {
        let model = "tcp provides reliable ordered delivery between hosts";
        // Keywords: tcp, provides, reliable, ordered, delivery, between, hosts (7).
        assert_eq!(
            grade("tcp provides reliable ordered delivery between hosts", model),
            5
        );
        // 5/7 ~ 0.71 -> 4.
        assert_eq!(grade("tcp provides reliable ordered delivery", model), 4);
        // 3/7 ~ 0.43 -> 3.
        assert_eq!(grade("tcp reliable delivery", model), 3);
        // 2/7 ~ 0.29 -> 2.
        assert_eq!(grade("tcp delivery", model), 2);
        // 1/7 -> 1.
        assert_eq!(grade("tcp", model), 1);
        assert_eq!(grade("unrelated words entirely", model), 0);
    }

    #[test]
    fn stopwords_and_short_words_ignored() {
        // "is", "a", "of" drop out; "ox" is too short. Only "river" counts.
        assert_eq!(grade("the river", "it is a river of ox"), 5);
    }

    #[test]
    fn no_keyword_model_falls_back_to_containment() {
        assert_eq!(grade("it is", "it"), 5);
        assert_eq!(grade("no", "it"), 0);
    }

    #[test]
    fn empty_answer_scores_zero() {
        assert_eq!(grade("", "anything"), 0);
        assert_eq!(grade("   ", "anything"), 0);
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        assert_eq!(
            grade("OSMOSIS, through a membrane!", "osmosis through membrane"),
            5
        );
    }
}
