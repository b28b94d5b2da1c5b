//! Comment blocks handed to the annotation layer.

use super::lexer::CommentLine;

/// A run of comment lines on consecutive source lines.
///
/// Only blocks made of head comments (nothing but the comment on the line)
/// can carry annotations; a trailing comment after code is its own block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBlock {
    pub lines: Vec<CommentLine>,
    pub head: bool,
}

impl CommentBlock {
    pub fn first_line(&self) -> usize {
        self.lines.first().map_or(0, |l| l.line)
    }

    /// Blocks are keyed by their last line: the code they describe is on the next one.
    pub fn last_line(&self) -> usize {
        self.lines.last().map_or(0, |l| l.line)
    }
}

/// Group comment lines into blocks.
pub fn group_comments(lines: Vec<CommentLine>) -> Vec<CommentBlock> {
    let mut blocks: Vec<CommentBlock> = Vec::new();
    for line in lines {
        if let Some(last) = blocks.last_mut() {
            if line.head && last.head && last.last_line() + 1 == line.line {
                last.lines.push(line);
                continue;
            }
        }
        let head = line.head;
        blocks.push(CommentBlock {
            lines: vec![line],
            head,
        });
    }
    blocks
}
