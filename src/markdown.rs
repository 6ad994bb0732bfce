//! Markdown-lite parser.
//!
//! The quiz dialect has exactly three constructs: fenced code blocks
//! (` ``` `), inline code (single backticks), and hard line breaks. Fenced
//! blocks are extracted first so the inline-code pass cannot misfire inside
//! them; the remaining text is split per line so every line wraps
//! independently. An unterminated fence stays literal text.

/// One markdown-parsed unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Fenced code block content, fence delimiters stripped, outer
    /// whitespace trimmed.
    Code(String),
    /// One source line as an ordered run list. Blank lines become empty
    /// paragraphs so vertical whitespace survives layout.
    Paragraph(Vec<InlineRun>),
}

/// A fragment within a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineRun {
    Text(String),
    InlineCode(String),
}

impl InlineRun {
    pub fn content(&self) -> &str {
        match self {
            InlineRun::Text(s) | InlineRun::InlineCode(s) => s,
        }
    }
}

const FENCE: &str = "```";

/// Parse markdown-lite text into ordered blocks. Never fails and never
/// returns an empty list: empty input yields one empty paragraph.
pub fn parse(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut rest = text;

    // Fence extraction first. A fence without a closing delimiter is left
    // in the text and falls through to the literal path below.
    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let Some(close) = after_open.find(FENCE) else {
            break;
        };
        push_paragraphs(&mut blocks, &rest[..open]);
        blocks.push(Block::Code(after_open[..close].trim().to_string()));
        rest = &after_open[close + FENCE.len()..];
        // A code block swallows the line break that follows its fence so it
        // does not manufacture a stray blank paragraph.
        rest = rest.strip_prefix('\n').unwrap_or(rest);
    }
    push_paragraphs(&mut blocks, rest);

    if blocks.is_empty() {
        blocks.push(Block::Paragraph(Vec::new()));
    }
    blocks
}

/// Split plain text into one paragraph per line, with no inline-code pass.
/// Used where the original renders raw text (user essay answers).
pub fn parse_plain(text: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = text
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                Block::Paragraph(Vec::new())
            } else {
                Block::Paragraph(vec![InlineRun::Text(line.to_string())])
            }
        })
        .collect();
    if blocks.is_empty() {
        blocks.push(Block::Paragraph(Vec::new()));
    }
    blocks
}

fn push_paragraphs(blocks: &mut Vec<Block>, text: &str) {
    if text.is_empty() {
        return;
    }
    // Trailing text right before a code block often ends with the newline
    // that separated them; splitting would add a phantom blank paragraph.
    let text = text.strip_suffix('\n').unwrap_or(text);
    if text.is_empty() {
        return;
    }
    for line in text.split('\n') {
        blocks.push(Block::Paragraph(parse_inline(line)));
    }
}

/// Split a single line into text and inline-code runs, preserving order.
/// A code span is a backtick pair on one line with non-empty content.
fn parse_inline(line: &str) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    let mut rest = line;
    while let Some(open) = rest.find('`') {
        let after_open = &rest[open + 1..];
        match after_open.find('`') {
            Some(close) if close > 0 => {
                if open > 0 {
                    runs.push(InlineRun::Text(rest[..open].to_string()));
                }
                runs.push(InlineRun::InlineCode(after_open[..close].to_string()));
                rest = &after_open[close + 1..];
            }
            _ => {
                // Lone or doubled backtick: everything from here is literal.
                break;
            }
        }
    }
    if !rest.is_empty() {
        runs.push(InlineRun::Text(rest.to_string()));
    }
    if runs.iter().all(|r| r.content().trim().is_empty())
        && !runs.iter().any(|r| matches!(r, InlineRun::InlineCode(_)))
    {
        return Vec::new();
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_one_empty_paragraph() {
        assert_eq!(parse(""), vec![Block::Paragraph(Vec::new())]);
    }

    #[test]
    fn lines_become_independent_paragraphs() {
        let blocks = parse("first\n\nsecond");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![InlineRun::Text("first".into())]),
                Block::Paragraph(Vec::new()),
                Block::Paragraph(vec![InlineRun::Text("second".into())]),
            ]
        );
    }

    #[test]
    fn inline_code_splits_into_ordered_runs() {
        let blocks = parse("use `malloc` then `free` carefully");
        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![
                InlineRun::Text("use ".into()),
                InlineRun::InlineCode("malloc".into()),
                InlineRun::Text(" then ".into()),
                InlineRun::InlineCode("free".into()),
                InlineRun::Text(" carefully".into()),
            ])]
        );
    }

    #[test]
    fn fenced_block_extracted_before_inline_pass() {
        let blocks = parse("before\n```\nlet `x` = 1;\n```\nafter");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![InlineRun::Text("before".into())]),
                Block::Code("let `x` = 1;".into()),
                Block::Paragraph(vec![InlineRun::Text("after".into())]),
            ]
        );
    }

    #[test]
    fn blank_code_lines_survive_trim_only_at_edges() {
        let blocks = parse("```\nfn a() {}\n\nfn b() {}\n```");
        assert_eq!(blocks, vec![Block::Code("fn a() {}\n\nfn b() {}".into())]);
    }

    #[test]
    fn unterminated_fence_stays_literal() {
        // Pinned behavior: a fence that never closes degrades to literal
        // text instead of swallowing the rest of the input.
        let blocks = parse("text\n```\nint main();");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![InlineRun::Text("text".into())]),
                Block::Paragraph(vec![InlineRun::Text("```".into())]),
                Block::Paragraph(vec![InlineRun::Text("int main();".into())]),
            ]
        );
    }

    #[test]
    fn lone_backtick_is_literal() {
        let blocks = parse("a ` b");
        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![InlineRun::Text("a ` b".into())])]
        );
    }

    #[test]
    fn parse_plain_skips_inline_code() {
        let blocks = parse_plain("my `answer`");
        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![InlineRun::Text("my `answer`".into())])]
        );
    }
}
