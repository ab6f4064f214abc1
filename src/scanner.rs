//! Context-sensitive scanner for the extended JavaScript dialect.
//!
//! The scanner keeps a double-buffered `current`/`next` token pair: the parser
//! reads `current` while `next` has already been scanned in default JS mode.
//! The three re-entrant modes (XML content, regexp body, template body)
//! reposition the cursor and overwrite `next`, so the same source range can be
//! re-lexed once the parser knows what it is looking at.
//!
//! Scanning never fails. Malformed input yields an `Illegal` token carrying an
//! error message, and the parser raises only if it actually consumes it: a
//! lookahead token scanned in the wrong mode is routinely discarded.

use crate::cursor::Cursor;
use crate::token::{keyword_or_identifier, Token, TokenKind};

// ═══════════════════════════════════════════════════════════════════════════════
// CHARACTER CLASSES
// ═══════════════════════════════════════════════════════════════════════════════

#[inline]
fn is_line_terminator(c: char) -> bool {
    c == '\n' || c == '\r'
}

#[inline]
pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (!c.is_ascii() && c.is_alphabetic())
}

#[inline]
pub(crate) fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c)
        || c.is_ascii_digit()
        || (!c.is_ascii() && c.is_alphanumeric())
        || c == '\u{200c}'
        || c == '\u{200d}'
}

#[inline]
fn is_xml_element_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

const REGEXP_FLAGS: &str = "dgimsuvy";

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Scanner<'src> {
    cursor: Cursor<'src>,
    current: Token,
    next: Token,
    /// Kind of the token consumed before `current`; `None` at start of input.
    prev: Option<TokenKind>,
    started: bool,
    strip_comments: bool,
}

impl<'src> Scanner<'src> {
    pub fn new(src: &'src str, strip_comments: bool) -> Self {
        let mut scanner = Self {
            cursor: Cursor::new(src),
            current: Token::default(),
            next: Token::default(),
            prev: None,
            started: false,
            strip_comments,
        };
        if matches!(scanner.cursor.c0(), Some('\u{feff}') | Some('\u{fffe}')) {
            scanner.cursor.advance();
        }
        if scanner.cursor.starts_with("#!") {
            scanner.scan_shell_header();
        } else {
            scanner.scan();
        }
        scanner
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Token access
    // ─────────────────────────────────────────────────────────────────────────

    /// Commits the lookahead and scans a new one in default mode.
    pub fn next(&mut self) -> TokenKind {
        self.prev = if self.started {
            Some(self.current.kind)
        } else {
            None
        };
        self.started = true;
        std::mem::swap(&mut self.current, &mut self.next);
        self.scan();
        self.current.kind
    }

    #[inline]
    pub fn peek(&self) -> TokenKind {
        self.next.kind
    }

    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.current.kind
    }

    #[inline]
    pub fn prev(&self) -> Option<TokenKind> {
        self.prev
    }

    #[inline]
    pub fn token(&self) -> &Token {
        &self.current
    }

    #[inline]
    pub fn next_token(&self) -> &Token {
        &self.next
    }

    /// Reclassifies the current token once the parser knows its role, so the
    /// literal-position checks on the following token see that role.
    pub fn retag(&mut self, kind: TokenKind) {
        self.current.kind = kind;
    }

    /// Moves the current token's trivia out so it is emitted exactly once.
    pub fn take_trivia(&mut self) -> String {
        std::mem::take(&mut self.current.trivia)
    }

    pub fn source(&self) -> &'src str {
        self.cursor.src()
    }

    pub fn strips_comments(&self) -> bool {
        self.strip_comments
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Re-entrant modes
    // ─────────────────────────────────────────────────────────────────────────

    /// Re-lexes the lookahead in default mode starting at `pos`.
    pub fn rescan_from(&mut self, pos: usize) -> TokenKind {
        if !self.cursor.seek(pos) {
            return self.illegal_at_cursor("Unexpected end of input");
        }
        self.scan();
        self.next.kind
    }

    /// Scans one token of element content starting at `pos`.
    ///
    /// `ignore_space` collapses whitespace runs to a single space; a backtick
    /// in the content toggles it.
    pub fn scan_xml_content(&mut self, pos: usize, ignore_space: &mut bool) -> TokenKind {
        if !self.cursor.seek(pos) {
            return self.illegal_at_cursor("Unexpected end of input");
        }
        self.next.reset(pos, self.cursor.line());

        let kind = match self.cursor.c0() {
            None => TokenKind::Eos,
            Some('<') if self.at_xml_markup() => self.scan_lt_and_xml_element(),
            Some('{') => {
                self.cursor.advance();
                TokenKind::LBrace
            }
            Some(_) => self.scan_xml_text(ignore_space),
        };
        self.finish(kind)
    }

    /// Scans `/body/flags` starting at the `/` at `pos`.
    pub fn scan_regexp_body(&mut self, pos: usize) -> TokenKind {
        if !self.cursor.seek(pos) || self.cursor.c0() != Some('/') {
            return self.illegal_at_cursor("Invalid regular expression");
        }
        self.next.reset(pos, self.cursor.line());
        self.cursor.advance();

        if matches!(self.cursor.c0(), Some('/') | Some('*')) {
            return self.illegal("Invalid regular expression: empty body");
        }

        let mut in_class = false;
        loop {
            match self.cursor.c0() {
                None => return self.illegal("Invalid regular expression: missing /"),
                Some(c) if is_line_terminator(c) => {
                    return self.illegal("Invalid regular expression: missing /")
                }
                Some('\\') => {
                    self.cursor.advance();
                    match self.cursor.c0() {
                        Some(c) if !is_line_terminator(c) => self.cursor.advance(),
                        _ => return self.illegal("Invalid regular expression: missing /"),
                    }
                }
                Some('[') => {
                    in_class = true;
                    self.cursor.advance();
                }
                Some(']') => {
                    in_class = false;
                    self.cursor.advance();
                }
                Some('/') if !in_class => {
                    self.cursor.advance();
                    break;
                }
                Some(_) => self.cursor.advance(),
            }
        }

        let mut seen = String::new();
        while let Some(c) = self.cursor.c0() {
            if !is_identifier_part(c) {
                break;
            }
            if !REGEXP_FLAGS.contains(c) || seen.contains(c) {
                return self.illegal("Invalid regular expression flags");
            }
            seen.push(c);
            self.cursor.advance();
        }

        self.next.value = self.cursor.slice(pos, self.cursor.pos()).to_string();
        self.finish(TokenKind::Regexp)
    }

    /// Scans a template continuation starting at the `}` that closed a splice.
    ///
    /// Yields `TemplateMiddle` (text ends with `${`), `TemplateTail` (text ends
    /// with the closing backtick) or `Illegal`.
    pub fn scan_template_body(&mut self, pos: usize) -> TokenKind {
        if !self.cursor.seek(pos) || self.cursor.c0() != Some('}') {
            return self.illegal_at_cursor("Unterminated template literal");
        }
        self.next.reset(pos, self.cursor.line());
        self.cursor.advance();
        match self.scan_template_chars() {
            TokenKind::TemplateHead => self.finish(TokenKind::TemplateMiddle),
            TokenKind::Template => self.finish(TokenKind::TemplateTail),
            _ => TokenKind::Illegal,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Default mode
    // ─────────────────────────────────────────────────────────────────────────

    fn scan(&mut self) {
        self.next.reset(self.cursor.pos(), self.cursor.line());

        loop {
            self.next.location.begin = self.cursor.pos();
            self.next.location.line = self.cursor.line();

            match self.cursor.c0() {
                None => {
                    self.finish(TokenKind::Eos);
                    return;
                }
                Some('\n') => {
                    self.next.trivia.push('\n');
                    self.next.newline_before = true;
                    self.next.space_before = true;
                    self.cursor.advance();
                }
                Some(c) if c.is_whitespace() => {
                    self.next.trivia.push(c);
                    self.next.space_before = true;
                    self.cursor.advance();
                }
                Some('/') if self.cursor.peek_nth(1) == Some('/') => {
                    self.skip_single_line_comment();
                    self.next.space_before = true;
                }
                Some('/') if self.cursor.peek_nth(1) == Some('*') => {
                    self.next.space_before = true;
                    if !self.skip_multi_line_comment() {
                        self.illegal("Unterminated multi-line comment");
                        return;
                    }
                }
                Some(c) => {
                    let kind = self.scan_token(c);
                    self.finish(kind);
                    return;
                }
            }
        }
    }

    fn scan_token(&mut self, c: char) -> TokenKind {
        use TokenKind::*;

        let begin = self.cursor.pos();
        match c {
            '"' | '\'' => self.scan_string(c),
            '`' => {
                self.cursor.advance();
                self.scan_template_chars()
            }
            '<' => self.scan_lt_and_xml_element(),
            '>' => {
                self.cursor.advance();
                if self.cursor.eat('=') {
                    Gte
                } else if self.cursor.eat('>') {
                    if self.cursor.eat('=') {
                        AssignSar
                    } else if self.cursor.eat('>') {
                        self.select('=', AssignShr, Shr)
                    } else {
                        Sar
                    }
                } else {
                    Gt
                }
            }
            '=' => {
                self.cursor.advance();
                if self.cursor.eat('>') {
                    Arrow
                } else if self.cursor.eat('=') {
                    self.select('=', EqStrict, Eq)
                } else {
                    Assign
                }
            }
            '!' => {
                self.cursor.advance();
                if self.cursor.eat('=') {
                    self.select('=', NeStrict, Ne)
                } else {
                    Not
                }
            }
            '+' => {
                self.cursor.advance();
                if self.cursor.eat('+') {
                    Inc
                } else {
                    self.select('=', AssignAdd, Add)
                }
            }
            '-' => {
                self.cursor.advance();
                if self.cursor.eat('-') {
                    Dec
                } else {
                    self.select('=', AssignSub, Sub)
                }
            }
            '*' => {
                self.cursor.advance();
                if self.cursor.eat('*') {
                    self.select('=', AssignPower, Power)
                } else {
                    self.select('=', AssignMul, Mul)
                }
            }
            '/' => {
                self.cursor.advance();
                self.select('=', AssignDiv, Div)
            }
            '%' => {
                self.cursor.advance();
                self.select('=', AssignMod, Mod)
            }
            '&' => {
                self.cursor.advance();
                if self.cursor.eat('&') {
                    self.select('=', AssignAnd, And)
                } else {
                    self.select('=', AssignBitAnd, BitAnd)
                }
            }
            '|' => {
                self.cursor.advance();
                if self.cursor.eat('|') {
                    self.select('=', AssignOr, Or)
                } else {
                    self.select('=', AssignBitOr, BitOr)
                }
            }
            '^' => {
                self.cursor.advance();
                self.select('=', AssignBitXor, BitXor)
            }
            '?' => {
                self.cursor.advance();
                if self.cursor.eat('?') {
                    self.select('=', AssignNullish, Nullish)
                } else if self.cursor.c0() == Some('.')
                    && !self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
                {
                    self.cursor.advance();
                    OptionalChain
                } else {
                    Conditional
                }
            }
            '.' => {
                if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.scan_number()
                } else if self.cursor.starts_with("...") {
                    self.cursor.advance_by(3);
                    Ellipsis
                } else {
                    self.cursor.advance();
                    Period
                }
            }
            '(' => self.single(LParen),
            ')' => self.single(RParen),
            '[' => self.single(LBrack),
            ']' => self.single(RBrack),
            '{' => self.single(LBrace),
            '}' => self.single(RBrace),
            ':' => self.single(Colon),
            ';' => self.single(Semicolon),
            ',' => self.single(Comma),
            '~' => self.single(BitNot),
            '@' => self.single(At),
            '#' if self.cursor.peek_nth(1).is_some_and(is_identifier_start) => {
                self.cursor.advance();
                self.scan_identifier_chars();
                self.next.value = self.cursor.slice(begin, self.cursor.pos()).to_string();
                Identifier
            }
            c if is_identifier_start(c) => {
                self.scan_identifier_chars();
                let name = self.cursor.slice(begin, self.cursor.pos());
                self.next.value = name.to_string();
                keyword_or_identifier(name)
            }
            c if c.is_ascii_digit() => self.scan_number(),
            _ => {
                self.cursor.advance();
                self.next.error = Some("Invalid or unexpected token");
                Illegal
            }
        }
    }

    fn scan_shell_header(&mut self) {
        self.next.reset(0, 0);
        while let Some(c) = self.cursor.c0() {
            self.cursor.advance();
            if c == '\n' {
                break;
            }
        }
        self.next.value = self.cursor.slice(0, self.cursor.pos()).to_string();
        self.finish(TokenKind::ShellHeader);
    }

    fn skip_single_line_comment(&mut self) {
        let begin = self.cursor.pos();
        while let Some(c) = self.cursor.c0() {
            if is_line_terminator(c) {
                break;
            }
            self.cursor.advance();
        }
        if !self.strip_comments {
            let text = self.cursor.slice(begin, self.cursor.pos());
            self.next.trivia.push_str(text);
        }
    }

    /// Returns `false` when the comment is unterminated.
    fn skip_multi_line_comment(&mut self) -> bool {
        let begin = self.cursor.pos();
        self.cursor.advance_by(2);
        loop {
            match self.cursor.c0() {
                None => return false,
                Some('*') if self.cursor.peek_nth(1) == Some('/') => {
                    self.cursor.advance_by(2);
                    break;
                }
                Some(c) => {
                    if c == '\n' {
                        self.next.newline_before = true;
                        if self.strip_comments {
                            self.next.trivia.push('\n');
                        }
                    }
                    self.cursor.advance();
                }
            }
        }
        let text = self.cursor.slice(begin, self.cursor.pos());
        if !self.strip_comments {
            self.next.trivia.push_str(text);
        } else if !text.contains('\n') && self.joins_neighbours(begin) {
            // `return/**/x` must not become `returnx`.
            self.next.trivia.push(' ');
        }
        true
    }

    /// Whether dropping the comment that started at `begin` would glue the
    /// characters on either side together.
    fn joins_neighbours(&self, begin: usize) -> bool {
        let spaced = |c: Option<char>| c.map_or(true, char::is_whitespace);
        let before = self.cursor.src()[..begin].chars().next_back();
        !spaced(before)
            && !spaced(self.cursor.c0())
            && !self.next.trivia.ends_with(char::is_whitespace)
    }

    fn scan_identifier_chars(&mut self) {
        while self.cursor.c0().is_some_and(is_identifier_part) {
            self.cursor.advance();
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let begin = self.cursor.pos();
        self.cursor.advance();
        loop {
            match self.cursor.c0() {
                None => return self.fail("Invalid or unexpected token: unterminated string"),
                Some(c) if is_line_terminator(c) => {
                    return self.fail("Invalid or unexpected token: unterminated string")
                }
                Some('\\') => {
                    if !self.scan_escape() {
                        return self.fail("Invalid escape sequence");
                    }
                }
                Some(c) => {
                    self.cursor.advance();
                    if c == quote {
                        break;
                    }
                }
            }
        }
        self.next.value = self.cursor.slice(begin, self.cursor.pos()).to_string();
        TokenKind::String
    }

    /// Consumes a backslash escape. Returns `false` when it is malformed.
    fn scan_escape(&mut self) -> bool {
        self.cursor.advance();
        match self.cursor.c0() {
            None => false,
            Some('\r') => {
                self.cursor.advance();
                self.cursor.eat('\n');
                true
            }
            Some('u') => {
                self.cursor.advance();
                if self.cursor.eat('{') {
                    let digits = self.scan_hex_digits(usize::MAX);
                    digits > 0 && self.cursor.eat('}')
                } else {
                    self.scan_hex_digits(4) == 4
                }
            }
            Some('x') => {
                self.cursor.advance();
                self.scan_hex_digits(2) == 2
            }
            Some(_) => {
                self.cursor.advance();
                true
            }
        }
    }

    fn scan_hex_digits(&mut self, max: usize) -> usize {
        let mut n = 0;
        while n < max && self.cursor.c0().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.cursor.advance();
            n += 1;
        }
        n
    }

    /// Scans template text after a backtick or a splice-closing `}`.
    /// Yields `Template` at the closing backtick, `TemplateHead` after `${`.
    fn scan_template_chars(&mut self) -> TokenKind {
        let begin = self.next.location.begin;
        let kind = loop {
            match self.cursor.c0() {
                None => return self.fail("Unterminated template literal"),
                Some('`') => {
                    self.cursor.advance();
                    break TokenKind::Template;
                }
                Some('\\') => {
                    if !self.scan_escape() {
                        return self.fail("Invalid escape sequence in template");
                    }
                }
                Some('$') if self.cursor.peek_nth(1) == Some('{') => {
                    self.cursor.advance_by(2);
                    break TokenKind::TemplateHead;
                }
                Some(_) => self.cursor.advance(),
            }
        };
        self.next.value = self.cursor.slice(begin, self.cursor.pos()).to_string();
        kind
    }

    fn scan_number(&mut self) -> TokenKind {
        let begin = self.cursor.pos();
        let radix_prefix = self.cursor.c0() == Some('0')
            && matches!(
                self.cursor.peek_nth(1),
                Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')
            );

        if radix_prefix {
            self.cursor.advance();
            let radix = match self.cursor.c0() {
                Some('x' | 'X') => 16,
                Some('o' | 'O') => 8,
                _ => 2,
            };
            self.cursor.advance();
            if self.scan_digits(radix) == 0 {
                return self.fail("Invalid or unexpected token: missing digits");
            }
            self.cursor.eat('n');
        } else {
            self.scan_digits(10);
            if self.cursor.c0() == Some('.') {
                self.cursor.advance();
                self.scan_digits(10);
            }
            if matches!(self.cursor.c0(), Some('e' | 'E')) {
                self.cursor.advance();
                if matches!(self.cursor.c0(), Some('+' | '-')) {
                    self.cursor.advance();
                }
                if self.scan_digits(10) == 0 {
                    return self.fail("Invalid or unexpected token: missing exponent");
                }
            } else {
                self.cursor.eat('n');
            }
        }

        if self.cursor.c0().is_some_and(is_identifier_part) {
            return self.fail("Invalid or unexpected token: identifier after number");
        }
        self.next.value = self.cursor.slice(begin, self.cursor.pos()).to_string();
        TokenKind::Number
    }

    fn scan_digits(&mut self, radix: u32) -> usize {
        let mut n = 0;
        while let Some(c) = self.cursor.c0() {
            if c.is_digit(radix) {
                n += 1;
            } else if c != '_' {
                break;
            }
            self.cursor.advance();
        }
        n
    }

    // ─────────────────────────────────────────────────────────────────────────
    // `<` and element markup
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether the `<` at the cursor opens a comment, a tag or a closing tag.
    fn at_xml_markup(&self) -> bool {
        match self.cursor.peek_nth(1) {
            Some(c) if is_xml_element_start(c) => true,
            Some('/') => self.cursor.peek_nth(2).is_some_and(is_xml_element_start),
            Some('!') => self.cursor.starts_with("<!--"),
            _ => false,
        }
    }

    /// `<!-- comment -->`, `<tag`, `</tag>`, or `<` `<=` `<<` `<<=`.
    fn scan_lt_and_xml_element(&mut self) -> TokenKind {
        use TokenKind::*;

        if self.cursor.starts_with("<!--") {
            return self.scan_xml_comment();
        }
        self.cursor.advance();
        match self.cursor.c0() {
            Some(c) if is_xml_element_start(c) => {
                let name = self.scan_xml_tag_name();
                self.next.value = name;
                XmlElementTag
            }
            Some('/') if self.cursor.peek_nth(1).is_some_and(is_xml_element_start) => {
                self.cursor.advance();
                let name = self.scan_xml_tag_name();
                while self.cursor.c0().is_some_and(|c| c == ' ' || c == '\t') {
                    self.cursor.advance();
                }
                if !self.cursor.eat('>') {
                    return self.fail("Invalid closing tag");
                }
                self.next.value = name;
                XmlElementTagEnd
            }
            Some('=') => self.single(Lte),
            Some('<') => {
                self.cursor.advance();
                self.select('=', AssignShl, Shl)
            }
            _ => Lt,
        }
    }

    /// `name`, `a.b.c` or `prefix:name`.
    fn scan_xml_tag_name(&mut self) -> String {
        let begin = self.cursor.pos();
        self.scan_tag_segment();
        loop {
            match (self.cursor.c0(), self.cursor.peek_nth(1)) {
                (Some('.' | ':'), Some(c)) if is_xml_element_start(c) => {
                    self.cursor.advance();
                    self.scan_tag_segment();
                }
                _ => break,
            }
        }
        self.cursor.slice(begin, self.cursor.pos()).to_string()
    }

    fn scan_tag_segment(&mut self) {
        loop {
            match self.cursor.c0() {
                Some(c) if is_identifier_part(c) => self.cursor.advance(),
                Some('-') if self.cursor.peek_nth(1).is_some_and(is_xml_element_start) => {
                    self.cursor.advance()
                }
                _ => break,
            }
        }
    }

    fn scan_xml_comment(&mut self) -> TokenKind {
        self.cursor.advance_by(4);
        let mut body = String::new();
        loop {
            match self.cursor.c0() {
                None => return self.fail("Unterminated XML comment"),
                Some('-') if self.cursor.starts_with("-->") => {
                    self.cursor.advance_by(3);
                    break;
                }
                Some(c) => {
                    if !self.strip_comments {
                        body.push(if c == '*' { 'x' } else { c });
                    } else if c == '\n' {
                        body.push('\n');
                    }
                    self.cursor.advance();
                }
            }
        }
        self.next.value = body;
        TokenKind::XmlComment
    }

    /// A run of element text, escaped for a double-quoted JS string.
    fn scan_xml_text(&mut self, ignore_space: &mut bool) -> TokenKind {
        while let Some(c) = self.cursor.c0() {
            match c {
                c if *ignore_space && c.is_whitespace() => {
                    while let Some(w) = self.cursor.c0().filter(|w| w.is_whitespace()) {
                        if w == '\n' {
                            self.next.trivia.push('\n');
                        }
                        self.cursor.advance();
                    }
                    self.next.value.push(' ');
                }
                '\\' => {
                    let begin = self.cursor.pos();
                    if !self.scan_escape() {
                        return self.fail("Invalid escape sequence in element text");
                    }
                    let escape = self.cursor.slice(begin, self.cursor.pos());
                    self.next.value.push_str(escape);
                }
                '\r' | '\n' => {
                    self.cursor.advance();
                    if c == '\r' {
                        self.cursor.eat('\n');
                    }
                    self.next.trivia.push('\n');
                    self.next.value.push_str("\\n");
                }
                '"' => {
                    self.next.value.push_str("\\\"");
                    self.cursor.advance();
                }
                '`' => {
                    *ignore_space = !*ignore_space;
                    self.cursor.advance();
                }
                '{' => break,
                '<' if self.at_xml_markup() => break,
                c => {
                    self.next.value.push(c);
                    self.cursor.advance();
                }
            }
        }
        TokenKind::XmlText
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    /// Consumes `c0` and yields `then` if it equals `c`, else yields `otherwise`.
    #[inline]
    fn select(&mut self, c: char, then: TokenKind, otherwise: TokenKind) -> TokenKind {
        if self.cursor.eat(c) {
            then
        } else {
            otherwise
        }
    }

    fn fail(&mut self, message: &'static str) -> TokenKind {
        self.next.error = Some(message);
        TokenKind::Illegal
    }

    fn finish(&mut self, kind: TokenKind) -> TokenKind {
        self.next.kind = kind;
        self.next.location.end = self.cursor.pos();
        kind
    }

    fn illegal(&mut self, message: &'static str) -> TokenKind {
        self.next.error = Some(message);
        self.finish(TokenKind::Illegal)
    }

    fn illegal_at_cursor(&mut self, message: &'static str) -> TokenKind {
        self.next.reset(self.cursor.pos(), self.cursor.line());
        self.illegal(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(src, false);
        let mut out = Vec::new();
        loop {
            let kind = scanner.next();
            if kind == Eos {
                break;
            }
            out.push(kind);
            if kind == Illegal {
                break;
            }
        }
        out
    }

    #[test]
    fn test_punctuators_and_operators() {
        assert_eq!(
            kinds("a >>>= b ?? c?.d => ...e"),
            vec![
                Identifier,
                AssignShr,
                Identifier,
                Nullish,
                Identifier,
                OptionalChain,
                Identifier,
                Arrow,
                Ellipsis,
                Identifier
            ]
        );
        assert_eq!(kinds("x ? .5 : 1"), vec![Identifier, Conditional, Number, Colon, Number]);
    }

    #[test]
    fn test_keywords_and_private_names() {
        assert_eq!(
            kinds("class A extends B { #x; event }"),
            vec![Class, Identifier, Extends, Identifier, LBrace, Identifier, Semicolon, Event, RBrace]
        );
    }

    #[test]
    fn test_current_and_next_are_double_buffered() {
        let mut scanner = Scanner::new("let x = 1", false);
        assert_eq!(scanner.peek(), Let);
        assert_eq!(scanner.next(), Let);
        assert_eq!(scanner.peek(), Identifier);
        assert_eq!(scanner.next_token().value, "x");
        assert_eq!(scanner.next(), Identifier);
        assert_eq!(scanner.token().value, "x");
        assert_eq!(scanner.prev(), Some(Let));
    }

    #[test]
    fn test_trivia_and_line_flags() {
        let mut scanner = Scanner::new("a /* c */\n  // d\n b", false);
        scanner.next();
        scanner.next();
        let tok = scanner.token();
        assert_eq!(tok.value, "b");
        assert_eq!(tok.trivia, " /* c */\n  // d\n ");
        assert!(tok.newline_before);
        assert_eq!(tok.location.line, 2);
    }

    #[test]
    fn test_strip_comments_keeps_newlines() {
        let mut scanner = Scanner::new("a /* x\ny */ // z\nb", true);
        scanner.next();
        scanner.next();
        assert_eq!(scanner.token().trivia, " \n \n");
    }

    #[test]
    fn test_numbers() {
        for src in ["0", "0x1F", "1_000", "1.5e-3", ".25", "10n", "0b101", "0o17"] {
            let mut scanner = Scanner::new(src, false);
            assert_eq!(scanner.next(), Number, "{src}");
            assert_eq!(scanner.token().value, src);
        }
        assert_eq!(kinds("1e"), vec![Illegal]);
        assert_eq!(kinds("3in"), vec![Illegal]);
    }

    #[test]
    fn test_strings_and_escapes() {
        let mut scanner = Scanner::new(r#"'it\'s' "é\x41""#, false);
        assert_eq!(scanner.next(), String);
        assert_eq!(scanner.token().value, r"'it\'s'");
        assert_eq!(scanner.next(), String);
        assert_eq!(kinds("'abc"), vec![Illegal]);
        assert_eq!(kinds(r#""\u12""#), vec![Illegal]);
    }

    #[test]
    fn test_template_head_and_full() {
        let mut scanner = Scanner::new("`a${b}c` `plain`", false);
        assert_eq!(scanner.next(), TemplateHead);
        assert_eq!(scanner.token().value, "`a${");
        assert_eq!(scanner.next(), Identifier);
        assert_eq!(scanner.next(), RBrace);
        let pos = scanner.token().location.begin;
        assert_eq!(scanner.scan_template_body(pos), TemplateTail);
        assert_eq!(scanner.next(), TemplateTail);
        assert_eq!(scanner.token().value, "}c`");
        assert_eq!(scanner.next(), Template);
        assert_eq!(scanner.token().value, "`plain`");
    }

    #[test]
    fn test_unterminated_template_is_illegal() {
        let mut scanner = Scanner::new("`abc", false);
        assert_eq!(scanner.next(), Illegal);
        assert!(scanner.token().error.is_some());
    }

    #[test]
    fn test_regexp_rescan() {
        let mut scanner = Scanner::new("(/a[/]b\\/c/gi)", false);
        scanner.next();
        assert_eq!(scanner.next(), Div);
        let pos = scanner.token().location.begin;
        assert_eq!(scanner.scan_regexp_body(pos), Regexp);
        assert_eq!(scanner.next(), Regexp);
        assert_eq!(scanner.token().value, "/a[/]b\\/c/gi");
        assert_eq!(scanner.next(), RParen);
    }

    #[test]
    fn test_regexp_rejects_duplicate_flags_and_missing_slash() {
        let mut scanner = Scanner::new("/ab/gg", false);
        scanner.next();
        assert_eq!(scanner.scan_regexp_body(0), Illegal);

        let mut scanner = Scanner::new("/ab\n/", false);
        scanner.next();
        assert_eq!(scanner.scan_regexp_body(0), Illegal);
    }

    #[test]
    fn test_xml_tags_in_default_mode() {
        let mut scanner = Scanner::new("<ui.Button></ui.Button>", false);
        assert_eq!(scanner.next(), XmlElementTag);
        assert_eq!(scanner.token().value, "ui.Button");
        assert_eq!(scanner.next(), Gt);
        assert_eq!(scanner.next(), XmlElementTagEnd);
        assert_eq!(scanner.token().value, "ui.Button");
        assert_eq!(kinds("a <= b << 2"), vec![Identifier, Lte, Identifier, Shl, Number]);
    }

    #[test]
    fn test_xml_comment_masks_stars() {
        let mut scanner = Scanner::new("<!-- a*b -->", false);
        assert_eq!(scanner.next(), XmlComment);
        assert_eq!(scanner.token().value, " axb ");
    }

    #[test]
    fn test_xml_content_modes() {
        let src = "<a>  Hello \"you\"\n {x}</a>";
        let mut scanner = Scanner::new(src, false);
        scanner.next();
        scanner.next();
        let mut ignore_space = true;
        let pos = scanner.token().location.end;
        assert_eq!(scanner.scan_xml_content(pos, &mut ignore_space), XmlText);
        assert_eq!(scanner.next_token().value, " Hello \\\"you\\\" ");
        assert_eq!(scanner.next_token().trivia, "\n");
        let pos = scanner.next_token().location.end;
        assert_eq!(scanner.scan_xml_content(pos, &mut ignore_space), LBrace);
        assert_eq!(scanner.scan_xml_content(pos + 3, &mut ignore_space), XmlElementTagEnd);
    }

    #[test]
    fn test_xml_content_backtick_preserves_space() {
        let mut scanner = Scanner::new("a  `b  c`  d<", false);
        let mut ignore_space = true;
        assert_eq!(scanner.scan_xml_content(0, &mut ignore_space), XmlText);
        assert_eq!(scanner.next_token().value, "a b  c d<");
        assert!(ignore_space);
    }

    #[test]
    fn test_backward_seek_restores_line() {
        let mut scanner = Scanner::new("a\n\nb", false);
        scanner.next();
        scanner.next();
        assert_eq!(scanner.token().location.line, 2);
        assert_eq!(scanner.rescan_from(0), Identifier);
        assert_eq!(scanner.next_token().location.line, 0);
    }

    #[test]
    fn test_shell_header_and_bom() {
        let mut scanner = Scanner::new("\u{feff}#!/usr/bin/env node\nx", false);
        assert_eq!(scanner.next(), ShellHeader);
        assert_eq!(scanner.token().value, "#!/usr/bin/env node\n");
        assert_eq!(scanner.next(), Identifier);
    }
}
