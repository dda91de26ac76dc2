use crate::analysis::language::indent_width;
use regex::Regex;

/// Line-scanning state machine that measures the body length of blocks
/// started by an opener line.
///
/// A block whose opener contains `{` ends when the braces balance again
/// (Allman style, a `{` on the next line, is accepted). Any other block ends at
/// the first non-blank line indented no deeper than the opener. Only one block
/// is tracked at a time; openers nested inside an open block count as body.
/// Every line is visited once, so cost is linear in file size.
pub struct BlockTracker<'r> {
    opener: &'r Regex,
    min_lines: usize,
    current: Option<OpenBlock>,
    found: Vec<usize>,
}

#[derive(Debug)]
struct OpenBlock {
    start: usize,
    indent: usize,
    mode: BlockMode,
    body_lines: usize,
    pending_blank: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockMode {
    /// Opener had no `{` and did not end in `:`; the next line decides.
    Undecided,
    Braced(i32),
    Indented,
}

impl<'r> BlockTracker<'r> {
    pub fn new(opener: &'r Regex, min_lines: usize) -> Self {
        Self {
            opener,
            min_lines,
            current: None,
            found: Vec::new(),
        }
    }

    pub fn feed(&mut self, index: usize, line: &str) {
        if let Some(mut block) = self.current.take() {
            if block.advance(line) {
                self.current = Some(block);
                return;
            }
            self.close(block);
        }

        if self.opener.is_match(line) {
            self.current = Some(OpenBlock::start(index, line));
        }
    }

    /// Closes any block still open at end of input and returns the 0-based
    /// opener line indices of blocks that reached `min_lines`.
    pub fn finish(mut self) -> Vec<usize> {
        if let Some(block) = self.current.take() {
            self.close(block);
        }
        self.found
    }

    fn close(&mut self, block: OpenBlock) {
        if block.body_lines >= self.min_lines {
            self.found.push(block.start);
        }
    }
}

impl OpenBlock {
    fn start(index: usize, line: &str) -> Self {
        let trimmed = line.trim_end();
        let mode = if trimmed.ends_with(':') {
            BlockMode::Indented
        } else if trimmed.contains('{') {
            BlockMode::Braced(brace_delta(line))
        } else {
            BlockMode::Undecided
        };

        let mut block = Self {
            start: index,
            indent: indent_width(line),
            mode,
            body_lines: 0,
            pending_blank: 0,
        };
        // One-liners such as `fn f() { 1 }` are finished on their own line.
        if matches!(block.mode, BlockMode::Braced(depth) if depth <= 0) {
            block.mode = BlockMode::Braced(0);
        }
        block
    }

    /// Consumes the next line. Returns false once the block has ended; the
    /// line that ended an indented block is not part of it.
    fn advance(&mut self, line: &str) -> bool {
        if self.mode == BlockMode::Braced(0) {
            return false;
        }

        let trimmed = line.trim();
        if self.mode == BlockMode::Undecided && !trimmed.is_empty() {
            self.mode = if trimmed.starts_with('{') {
                BlockMode::Braced(0)
            } else {
                BlockMode::Indented
            };
            if let BlockMode::Braced(_) = self.mode {
                self.mode = BlockMode::Braced(brace_delta(line));
                return self.mode != BlockMode::Braced(0);
            }
        }

        match self.mode {
            BlockMode::Braced(depth) => {
                let depth = depth + brace_delta(line);
                self.mode = BlockMode::Braced(depth);
                if depth <= 0 {
                    return false;
                }
                self.body_lines += 1;
                true
            }
            _ => {
                if trimmed.is_empty() {
                    self.pending_blank += 1;
                    return true;
                }
                if indent_width(line) <= self.indent {
                    return false;
                }
                self.body_lines += 1 + self.pending_blank;
                self.pending_blank = 0;
                true
            }
        }
    }
}

fn brace_delta(line: &str) -> i32 {
    let opens = line.matches('{').count() as i32;
    let closes = line.matches('}').count() as i32;
    opens - closes
}
