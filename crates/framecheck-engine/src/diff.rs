//! Grouped actual/expected diff rendering
//!
//! Lines are matched with longest-matching-block sequence matching, turned
//! into edit opcodes and clustered into hunks separated by unchanged context.
//! Each hunk renders as an actual block followed by an expected block:
//!
//! ```text
//! *** actual ***
//!   Row(1, 'A')
//! ! Row(2, 'B')
//!
//! *** expected ***
//!   Row(1, 'A')
//! ! Row(2, 'X')
//! ```

use colored::Colorize;
use std::collections::HashMap;
use std::io::IsTerminal;
use std::ops::Range;

/// Header of the actual block of a hunk
pub const ACTUAL_HEADER: &str = "*** actual ***";

/// Header of the expected block of a hunk
pub const EXPECTED_HEADER: &str = "*** expected ***";

/// Edit operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Equal,
    Replace,
    Delete,
    Insert,
}

impl Tag {
    /// Line prefix used when rendering
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Equal => "  ",
            Self::Replace => "! ",
            Self::Delete => "- ",
            Self::Insert => "+ ",
        }
    }
}

/// One edit operation: `actual[actual]` becomes `expected[expected]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opcode {
    pub tag: Tag,
    pub actual: Range<usize>,
    pub expected: Range<usize>,
}

impl Opcode {
    fn new(tag: Tag, actual: Range<usize>, expected: Range<usize>) -> Self {
        Self { tag, actual, expected }
    }
}

/// A run of `len` equal lines starting at `actual` / `expected`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Block {
    actual: usize,
    expected: usize,
    len: usize,
}

struct SequenceMatcher<'a> {
    actual: &'a [String],
    expected: &'a [String],
    positions: HashMap<&'a str, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(actual: &'a [String], expected: &'a [String]) -> Self {
        let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
        for (j, line) in expected.iter().enumerate() {
            positions.entry(line.as_str()).or_default().push(j);
        }
        Self {
            actual,
            expected,
            positions,
        }
    }

    /// Longest block of equal lines inside the given windows; earliest wins ties
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Block {
        let mut best = Block {
            actual: alo,
            expected: blo,
            len: 0,
        };
        // run length of matches ending at expected[j], for the previous actual line
        let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(indices) = self.positions.get(self.actual[i].as_str()) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let previous = if j > 0 {
                        run_ending_at.get(&(j - 1)).copied().unwrap_or(0)
                    } else {
                        0
                    };
                    let len = previous + 1;
                    next.insert(j, len);
                    if len > best.len {
                        best = Block {
                            actual: i + 1 - len,
                            expected: j + 1 - len,
                            len,
                        };
                    }
                }
            }
            run_ending_at = next;
        }

        best
    }

    /// Non-overlapping matching blocks in order, ending with a zero-length sentinel
    fn matching_blocks(&self) -> Vec<Block> {
        let (la, lb) = (self.actual.len(), self.expected.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.longest_match(alo, ahi, blo, bhi);
            if m.len == 0 {
                continue;
            }
            blocks.push(m);
            if alo < m.actual && blo < m.expected {
                queue.push((alo, m.actual, blo, m.expected));
            }
            if m.actual + m.len < ahi && m.expected + m.len < bhi {
                queue.push((m.actual + m.len, ahi, m.expected + m.len, bhi));
            }
        }
        blocks.sort();

        // Merge adjacent blocks
        let mut merged: Vec<Block> = Vec::with_capacity(blocks.len() + 1);
        for block in blocks {
            match merged.last_mut() {
                Some(last)
                    if last.actual + last.len == block.actual
                        && last.expected + last.len == block.expected =>
                {
                    last.len += block.len;
                }
                _ => merged.push(block),
            }
        }
        merged.push(Block {
            actual: la,
            expected: lb,
            len: 0,
        });
        merged
    }

    fn opcodes(&self) -> Vec<Opcode> {
        let (mut i, mut j) = (0, 0);
        let mut codes = Vec::new();

        for block in self.matching_blocks() {
            let tag = match (i < block.actual, j < block.expected) {
                (true, true) => Some(Tag::Replace),
                (true, false) => Some(Tag::Delete),
                (false, true) => Some(Tag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                codes.push(Opcode::new(tag, i..block.actual, j..block.expected));
            }
            i = block.actual + block.len;
            j = block.expected + block.len;
            if block.len > 0 {
                codes.push(Opcode::new(Tag::Equal, block.actual..i, block.expected..j));
            }
        }

        codes
    }
}

/// Edit opcodes turning `actual` into `expected`
pub fn opcodes(actual: &[String], expected: &[String]) -> Vec<Opcode> {
    SequenceMatcher::new(actual, expected).opcodes()
}

/// Cluster opcodes into hunks with up to `context` lines of unchanged context
///
/// Hunks made only of equal lines are dropped, so identical inputs yield
/// no hunks at all.
pub fn grouped_opcodes(actual: &[String], expected: &[String], context: usize) -> Vec<Vec<Opcode>> {
    let mut codes = opcodes(actual, expected);
    if codes.is_empty() {
        codes.push(Opcode::new(Tag::Equal, 0..1, 0..1));
    }

    // Trim leading and trailing unchanged runs to the context size
    if let Some(first) = codes.first_mut() {
        if first.tag == Tag::Equal {
            first.actual.start = first.actual.start.max(first.actual.end.saturating_sub(context));
            first.expected.start = first.expected.start.max(first.expected.end.saturating_sub(context));
        }
    }
    if let Some(last) = codes.last_mut() {
        if last.tag == Tag::Equal {
            last.actual.end = last.actual.end.min(last.actual.start + context);
            last.expected.end = last.expected.end.min(last.expected.start + context);
        }
    }

    let mut groups = Vec::new();
    let mut group = Vec::new();
    for mut code in codes {
        // A long unchanged run closes the current hunk and opens the next
        if code.tag == Tag::Equal && code.actual.len() > context * 2 {
            group.push(Opcode::new(
                Tag::Equal,
                code.actual.start..code.actual.end.min(code.actual.start + context),
                code.expected.start..code.expected.end.min(code.expected.start + context),
            ));
            groups.push(std::mem::take(&mut group));
            code.actual.start = code.actual.start.max(code.actual.end.saturating_sub(context));
            code.expected.start = code.expected.start.max(code.expected.end.saturating_sub(context));
        }
        group.push(code);
    }
    if !(group.is_empty() || (group.len() == 1 && group[0].tag == Tag::Equal)) {
        groups.push(group);
    }

    groups
}

/// Capability to highlight changed lines
///
/// Implementations must never fail; when highlighting is unavailable they
/// return the line unchanged.
pub trait ColorSink {
    fn paint(&self, line: &str) -> String;
}

/// Plain text output
#[derive(Debug, Clone, Copy, Default)]
pub struct NoColor;

impl ColorSink for NoColor {
    fn paint(&self, line: &str) -> String {
        line.to_string()
    }
}

/// Red highlighting when stderr is a color-capable terminal
#[derive(Debug, Clone, Copy)]
pub struct TerminalColor {
    enabled: bool,
}

impl TerminalColor {
    /// Probe the environment once; any doubt means plain output
    pub fn detect() -> Self {
        let enabled = std::io::stderr().is_terminal()
            && colored::control::SHOULD_COLORIZE.should_colorize();
        if !enabled {
            tracing::debug!("color output unavailable, rendering plain diff");
        }
        Self { enabled }
    }

    /// Skip probing and force plain output
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl ColorSink for TerminalColor {
    fn paint(&self, line: &str) -> String {
        if self.enabled {
            line.red().to_string()
        } else {
            line.to_string()
        }
    }
}

/// Renders actual/expected line sequences as grouped diffs
pub struct DiffReporter {
    sink: Box<dyn ColorSink>,
}

impl Default for DiffReporter {
    fn default() -> Self {
        Self::new(NoColor)
    }
}

impl std::fmt::Debug for DiffReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffReporter").finish_non_exhaustive()
    }
}

impl DiffReporter {
    /// Create a reporter highlighting through `sink`
    pub fn new(sink: impl ColorSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
        }
    }

    /// Reporter that colors when the terminal allows it
    pub fn for_terminal() -> Self {
        Self::new(TerminalColor::detect())
    }

    /// Lazily render the diff, one output line per item
    ///
    /// Nothing is computed until the iterator is first advanced; call again
    /// to render from the start.
    pub fn render<'a>(
        &'a self,
        actual: &'a [String],
        expected: &'a [String],
        context: usize,
    ) -> impl Iterator<Item = String> + 'a {
        std::iter::once_with(move || grouped_opcodes(actual, expected, context))
            .flatten()
            .flat_map(move |group| self.render_hunk(actual, expected, &group))
    }

    /// Render the whole diff as newline-separated text
    pub fn render_to_string(&self, actual: &[String], expected: &[String], context: usize) -> String {
        self.render(actual, expected, context)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_hunk(&self, actual: &[String], expected: &[String], group: &[Opcode]) -> Vec<String> {
        let mut lines = vec![ACTUAL_HEADER.to_string()];
        if group.iter().any(|op| matches!(op.tag, Tag::Replace | Tag::Delete)) {
            for op in group {
                for line in actual.get(op.actual.clone()).unwrap_or_default() {
                    lines.push(self.decorate(op.tag, line));
                }
            }
        }

        lines.push(String::new());

        lines.push(EXPECTED_HEADER.to_string());
        if group.iter().any(|op| matches!(op.tag, Tag::Replace | Tag::Insert)) {
            for op in group {
                for line in expected.get(op.expected.clone()).unwrap_or_default() {
                    lines.push(self.decorate(op.tag, line));
                }
            }
        }

        lines
    }

    fn decorate(&self, tag: Tag, line: &str) -> String {
        let text = format!("{}{}", tag.prefix(), line);
        match tag {
            Tag::Equal => text,
            _ => self.sink.paint(&text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn opcodes_cover_both_sides() {
        let a = lines(&["a", "b", "c", "d"]);
        let b = lines(&["a", "c", "d", "e"]);

        assert_eq!(
            opcodes(&a, &b),
            vec![
                Opcode::new(Tag::Equal, 0..1, 0..1),
                Opcode::new(Tag::Delete, 1..2, 1..1),
                Opcode::new(Tag::Equal, 2..4, 1..3),
                Opcode::new(Tag::Insert, 4..4, 3..4),
            ]
        );
    }

    #[test]
    fn identical_inputs_render_nothing() {
        let reporter = DiffReporter::default();
        let a = lines(&["x", "y"]);
        assert_eq!(reporter.render(&a, &a, 3).count(), 0);
        assert_eq!(reporter.render(&[], &[], 3).count(), 0);
    }

    #[test]
    fn replaced_line_with_context() {
        let reporter = DiffReporter::default();
        let out: Vec<String> = reporter
            .render(&lines(&["a", "b", "c"]), &lines(&["a", "x", "c"]), 3)
            .collect();

        assert_eq!(
            out,
            lines(&[
                "*** actual ***",
                "  a",
                "! b",
                "  c",
                "",
                "*** expected ***",
                "  a",
                "! x",
                "  c",
            ])
        );
    }

    #[test]
    fn insert_only_leaves_actual_block_empty() {
        let reporter = DiffReporter::default();
        let out: Vec<String> = reporter
            .render(&lines(&["a"]), &lines(&["a", "b"]), 3)
            .collect();

        assert_eq!(
            out,
            lines(&["*** actual ***", "", "*** expected ***", "  a", "+ b"])
        );
    }

    #[test]
    fn delete_only_leaves_expected_block_empty() {
        let reporter = DiffReporter::default();
        let out = reporter.render_to_string(&lines(&["a", "b"]), &lines(&["a"]), 3);

        assert_eq!(out, "*** actual ***\n  a\n- b\n\n*** expected ***");
    }

    #[test]
    fn distant_changes_form_separate_hunks() {
        let reporter = DiffReporter::default();
        let a = lines(&["a", "1", "2", "3", "4", "5", "b"]);
        let b = lines(&["A", "1", "2", "3", "4", "5", "B"]);

        let groups = grouped_opcodes(&a, &b, 1);
        assert_eq!(groups.len(), 2);

        let out: Vec<String> = reporter.render(&a, &b, 1).collect();
        assert_eq!(
            out,
            lines(&[
                "*** actual ***",
                "! a",
                "  1",
                "",
                "*** expected ***",
                "! A",
                "  1",
                "*** actual ***",
                "  5",
                "! b",
                "",
                "*** expected ***",
                "  5",
                "! B",
            ])
        );
    }

    #[test]
    fn render_is_restartable() {
        let reporter = DiffReporter::default();
        let a = lines(&["a"]);
        let b = lines(&["b"]);

        let first: Vec<String> = reporter.render(&a, &b, 0).collect();
        let second: Vec<String> = reporter.render(&a, &b, 0).collect();
        assert_eq!(first, second);
    }

    struct Brackets;

    impl ColorSink for Brackets {
        fn paint(&self, line: &str) -> String {
            format!("[{}]", line)
        }
    }

    #[test]
    fn only_changed_lines_are_painted() {
        let reporter = DiffReporter::new(Brackets);
        let out: Vec<String> = reporter
            .render(&lines(&["same", "old"]), &lines(&["same", "new"]), 3)
            .collect();

        assert_eq!(out[1], "  same");
        assert_eq!(out[2], "[! old]");
        assert_eq!(out[6], "[! new]");
    }

    #[test]
    fn disabled_terminal_color_is_plain() {
        let sink = TerminalColor::disabled();
        assert!(!sink.is_enabled());
        assert_eq!(sink.paint("! row"), "! row");
    }
}
