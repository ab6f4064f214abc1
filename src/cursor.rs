//! Character cursor over a borrowed source buffer.
//!
//! Offsets are byte offsets into the UTF-8 source and always sit on a char
//! boundary. The line counter is 0-based and counts `\n` characters already
//! passed.

#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    src: &'src str,
    pos: usize,
    line: u32,
    c0: Option<char>,
}

impl<'src> Cursor<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            pos: 0,
            line: 0,
            c0: src.chars().next(),
        }
    }

    /// The character under the cursor, `None` at end of input.
    #[inline]
    pub fn c0(&self) -> Option<char> {
        self.c0
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.c0.is_none()
    }

    pub fn src(&self) -> &'src str {
        self.src
    }

    /// Text from the cursor to the end of input.
    pub fn rest(&self) -> &'src str {
        &self.src[self.pos..]
    }

    pub fn slice(&self, begin: usize, end: usize) -> &'src str {
        &self.src[begin..end]
    }

    /// The character `n` positions past `c0` (`peek_nth(0) == c0`).
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    pub fn advance(&mut self) {
        if let Some(c) = self.c0 {
            if c == '\n' {
                self.line += 1;
            }
            self.pos += c.len_utf8();
            self.c0 = self.src[self.pos..].chars().next();
        }
    }

    pub fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Consumes `c0` if it equals `c`.
    pub fn eat(&mut self, c: char) -> bool {
        if self.c0 == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Repositions to `pos`, keeping the line counter consistent.
    ///
    /// Moving backward re-derives the line from the crossed span instead of
    /// stepping one character at a time. Returns `false` when `pos` is past
    /// the end of input or not on a char boundary.
    pub fn seek(&mut self, pos: usize) -> bool {
        if pos > self.src.len() || !self.src.is_char_boundary(pos) {
            return false;
        }
        if pos >= self.pos {
            self.line += count_newlines(&self.src[self.pos..pos]);
        } else {
            self.line -= count_newlines(&self.src[pos..self.pos]);
        }
        self.pos = pos;
        self.c0 = self.src[pos..].chars().next();
        true
    }
}

fn count_newlines(s: &str) -> u32 {
    s.bytes().filter(|&b| b == b'\n').count() as u32
}
