//! Greedy section-to-page packing.
//!
//! Sections arrive in display order with exact heights; the grouper packs
//! them against the content window with a moving cursor. Two rules beyond
//! plain packing: a question header never starts in the last sliver of a
//! page, and an oversized section is placed alone rather than dropped, so
//! the output always contains every section exactly once, in order.

use crate::section::Section;
use crate::theme;

/// Vertical window sections are packed into.
#[derive(Debug, Clone, Copy)]
pub struct PageMetrics {
    pub content_top: f32,
    pub content_bottom: f32,
    /// Minimum room a question header needs to start on the current page.
    pub min_question_space: f32,
}

impl Default for PageMetrics {
    fn default() -> Self {
        PageMetrics {
            content_top: theme::CONTENT_TOP,
            content_bottom: theme::CONTENT_BOTTOM,
            min_question_space: theme::MIN_QUESTION_SPACE,
        }
    }
}

/// Pack sections into per-page groups. `start_y` is the cursor on the first
/// page only (the results score block pushes it below `content_top`);
/// subsequent pages start at `content_top`.
pub fn group_sections(
    sections: Vec<Section>,
    start_y: f32,
    metrics: &PageMetrics,
) -> Vec<Vec<Section>> {
    let mut pages: Vec<Vec<Section>> = Vec::new();
    let mut page: Vec<Section> = Vec::new();
    let mut cursor = start_y;

    for section in sections {
        let remaining = metrics.content_bottom - cursor;
        let needs_break = if section.starts_question {
            remaining < metrics.min_question_space || section.height > remaining
        } else {
            section.height > remaining
        };
        // A fresh page still too short for the section: place it anyway
        // rather than loop forever.
        if needs_break && !page.is_empty() {
            pages.push(std::mem::take(&mut page));
            cursor = metrics.content_top;
        }
        cursor += section.height;
        page.push(section);
    }
    if !page.is_empty() {
        pages.push(page);
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> PageMetrics {
        PageMetrics {
            content_top: 0.0,
            content_bottom: 100.0,
            min_question_space: 30.0,
        }
    }

    fn heights(pages: &[Vec<Section>]) -> Vec<Vec<f32>> {
        pages
            .iter()
            .map(|p| p.iter().map(|s| s.height).collect())
            .collect()
    }

    #[test]
    fn sections_that_fit_share_a_page() {
        let sections = vec![
            Section::test_section(40.0, true),
            Section::test_section(30.0, false),
            Section::test_section(30.0, false),
        ];
        let pages = group_sections(sections, 0.0, &metrics());
        assert_eq!(heights(&pages), vec![vec![40.0, 30.0, 30.0]]);
    }

    #[test]
    fn overflow_moves_to_next_page_in_order() {
        let sections = vec![
            Section::test_section(60.0, true),
            Section::test_section(60.0, false),
            Section::test_section(20.0, false),
        ];
        let pages = group_sections(sections, 0.0, &metrics());
        assert_eq!(heights(&pages), vec![vec![60.0], vec![60.0, 20.0]]);
    }

    #[test]
    fn question_never_starts_in_the_last_sliver() {
        // 80 used, 20 left: under min_question_space, so the next header
        // breaks even though its own 15pt would fit.
        let sections = vec![
            Section::test_section(80.0, true),
            Section::test_section(15.0, true),
        ];
        let pages = group_sections(sections, 0.0, &metrics());
        assert_eq!(heights(&pages), vec![vec![80.0], vec![15.0]]);
    }

    #[test]
    fn oversized_section_gets_its_own_page_not_dropped() {
        let sections = vec![
            Section::test_section(10.0, true),
            Section::test_section(250.0, false),
            Section::test_section(10.0, false),
        ];
        let pages = group_sections(sections, 0.0, &metrics());
        assert_eq!(
            heights(&pages),
            vec![vec![10.0], vec![250.0], vec![10.0]]
        );
    }

    #[test]
    fn no_page_is_empty_and_concatenation_is_identity() {
        let input: Vec<f32> = vec![35.0, 90.0, 10.0, 150.0, 5.0, 5.0, 99.0];
        let sections: Vec<Section> = input
            .iter()
            .enumerate()
            .map(|(i, &h)| Section::test_section(h, i % 3 == 0))
            .collect();
        let pages = group_sections(sections, 0.0, &metrics());
        assert!(pages.iter().all(|p| !p.is_empty()));
        let flat: Vec<f32> = pages.iter().flatten().map(|s| s.height).collect();
        assert_eq!(flat, input);
    }

    #[test]
    fn first_page_start_offset_is_honored() {
        // With the cursor pushed to 70, a 40pt section cannot fit on page
        // one even though it would from the top.
        let sections = vec![Section::test_section(40.0, false)];
        let pages = group_sections(sections, 70.0, &metrics());
        assert_eq!(heights(&pages), vec![vec![40.0]]);

        let sections = vec![
            Section::test_section(20.0, false),
            Section::test_section(40.0, false),
        ];
        let pages = group_sections(sections, 70.0, &metrics());
        assert_eq!(heights(&pages), vec![vec![20.0], vec![40.0]]);
    }
}
