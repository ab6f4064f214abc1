//! Inline element literals.
//!
//! `<Tag a="v" b={expr}>text {expr}<Child/></Tag>` becomes
//! `_VV("Tag", [[["a"],"v"],[["b"],expr]], [_VVT("text "),_VVD(expr),_VV("Child", [], [])])`.
//!
//! Attribute keys are arrays of path segments (`a.b="x"` gives `["a","b"]`).
//! Element heads are synthesized with newline-only trivia so every source
//! line break inside an element survives in the output.

use std::collections::HashSet;

use crate::error::Result;
use crate::parser::Parser;
use crate::sink::TriviaMode;
use crate::snippets::{ELEMENT_CALL, TEXT_CALL, VALUE_CALL, XML_COMMENT_CLOSE, XML_COMMENT_OPEN};
use crate::token::TokenKind;

/// Pending text and line breaks between two children.
#[derive(Default)]
struct ContentState {
    text: String,
    gap: String,
    first: bool,
}

impl<'src, 'out> Parser<'src, 'out> {
    fn is_xml_element_legal_start(&self, in_xml: bool) -> bool {
        if !self.extended {
            return false;
        }
        if !in_xml && !self.is_legal_literal_begin(true) {
            return false;
        }
        !matches!(
            self.scanner.peek(),
            TokenKind::Period | TokenKind::Colon | TokenKind::Assign
        )
    }

    /// An element with its `<tag` token current. Yields the offset just past
    /// the element's final `>`.
    ///
    /// Outside element content a tag in an operator position is a comparison,
    /// see [`Self::parse_less_than`].
    pub(crate) fn parse_xml_element(&mut self, in_xml: bool) -> Result<usize> {
        use TokenKind::*;

        if !self.is_xml_element_legal_start(in_xml) {
            if in_xml {
                return Err(self.error("Malformed element"));
            }
            return Ok(self.parse_less_than());
        }

        let tag = self.scanner.token().value.clone();
        if tag.contains(':') {
            return Err(self.error(format!(
                "Element tag `<{}>`: prefix:suffix tags are not supported",
                tag
            )));
        }

        let mode = self.set_trivia_mode(TriviaMode::NewlinesOnly);
        self.emit(&format!("{}(\"{}\", [", ELEMENT_CALL, tag));
        let kind = self.parse_xml_attributes()?;
        self.emit("]");

        let end = match kind {
            Div => {
                let close = self.next()?;
                if !close.starts_with_gt() {
                    return Err(self.error(format!("Expected `>` after `/` in <{}>", tag)));
                }
                self.emit(", []");
                let pos = self.scanner.token().location.begin + 1;
                if close != Gt && !in_xml {
                    self.scanner.rescan_from(pos);
                }
                // The closing `>` ends an operand, not a comparison.
                self.scanner.retag(XmlElementTagEnd);
                pos
            }
            k if k.starts_with_gt() => {
                let pos = self.scanner.token().location.begin + 1;
                self.parse_xml_content(&tag, pos)?
            }
            _ => return Err(self.error(format!("Malformed element <{}>", tag))),
        };

        self.emit(")");
        self.trivia_mode = mode;
        Ok(end)
    }

    /// `<name` after an operand with the tag token current: a comparison.
    /// Emits `<` and re-lexes the glued name as ordinary code, so `a<b:c`
    /// yields `b`, `:` and `c`. Yields the offset after `<`.
    pub(crate) fn parse_less_than(&mut self) -> usize {
        let pos = self.scanner.token().location.begin + 1;
        self.emit("<");
        self.scanner.retag(TokenKind::Lt);
        self.scanner.rescan_from(pos);
        pos
    }

    /// Attributes up to the head terminator; yields the terminator's kind.
    fn parse_xml_attributes(&mut self) -> Result<TokenKind> {
        use TokenKind::*;

        let mut seen: HashSet<std::string::String> = HashSet::new();
        let mut kind = self.next()?;
        let mut first = true;

        while kind.is_property_identifier() {
            if !self.scanner.token().space_before {
                return Err(self.error("Attribute name must be preceded by whitespace"));
            }
            if !first {
                self.emit(",");
            }
            first = false;

            self.emit("[[");
            let mut key = std::string::String::new();
            loop {
                let segment = self.parse_xml_attribute_segment()?;
                self.emit(&format!("\"{}\"", segment));
                key.push_str(&segment);
                kind = self.next()?;
                if kind != Period {
                    break;
                }
                if !self.next()?.is_property_identifier() {
                    return Err(self.error("Malformed attribute name"));
                }
                self.emit(",");
                key.push('.');
            }
            self.emit("],");

            // A shared prefix (`a.b` and `a.c`) is fine, a repeated full path is not.
            if !seen.insert(key.clone()) {
                return Err(self.error(format!("Duplicate attribute `{}`", key)));
            }

            if kind == Assign {
                self.parse_xml_attribute_value()?;
                kind = self.next()?;
            } else {
                self.emit("\"\"");
            }
            self.emit("]");
        }
        Ok(kind)
    }

    /// One key segment; `data-id` is joined into a single segment.
    fn parse_xml_attribute_segment(&mut self) -> Result<std::string::String> {
        let mut segment = self.scanner.token().value.clone();
        while self.scanner.peek() == TokenKind::Sub && !self.scanner.next_token().space_before {
            self.next()?;
            let kind = self.next()?;
            if !kind.is_property_identifier() || self.scanner.token().space_before {
                return Err(self.error("Malformed attribute name"));
            }
            segment.push('-');
            segment.push_str(&self.scanner.token().value);
        }
        Ok(segment)
    }

    /// After `=`: `{expr}` is unwrapped and parsed as ordinary code, anything
    /// else is a single restricted operand.
    fn parse_xml_attribute_value(&mut self) -> Result<()> {
        let mode = self.trivia_mode;
        let result = if self.scanner.peek() == TokenKind::LBrace {
            self.next()?;
            self.trivia_mode = TriviaMode::Verbatim;
            self.parse_brace_expression(TokenKind::RBrace)
        } else {
            self.trivia_mode = TriviaMode::Verbatim;
            self.in_attribute = true;
            let result = self.parse_expression();
            self.in_attribute = false;
            result
        };
        self.trivia_mode = mode;
        result
    }

    /// Children after the head's `>`, scanning from `pos` until the matching
    /// close tag. Yields the offset past the close tag.
    fn parse_xml_content(&mut self, tag: &str, mut pos: usize) -> Result<usize> {
        use TokenKind::*;

        self.emit(", [");
        let mut ignore_space = true;
        let mut state = ContentState {
            first: true,
            ..ContentState::default()
        };

        loop {
            let kind = self.scanner.scan_xml_content(pos, &mut ignore_space);
            match kind {
                XmlComment => {
                    let token = self.scanner.next_token();
                    if self.scanner.strips_comments() {
                        state.gap.push_str(&token.value);
                    } else {
                        state.gap.push_str(XML_COMMENT_OPEN);
                        state.gap.push_str(&token.value);
                        state.gap.push_str(XML_COMMENT_CLOSE);
                    }
                    pos = token.location.end;
                }
                XmlText => {
                    let token = self.scanner.next_token();
                    state.gap.push_str(&token.trivia);
                    state.text.push_str(&token.value);
                    pos = token.location.end;
                }
                XmlElementTag => {
                    self.flush_xml_text(&mut state, true, ignore_space);
                    self.next()?;
                    pos = self.parse_xml_element(true)?;
                }
                XmlElementTagEnd => {
                    self.flush_xml_text(&mut state, false, ignore_space);
                    let close = &self.scanner.next_token().value;
                    if close != tag {
                        return Err(self.error_at_next(format!(
                            "Mismatched closing tag: <{}> ... </{}>",
                            tag, close
                        )));
                    }
                    self.emit("]");
                    self.next()?;
                    return Ok(self.scanner.token().location.end);
                }
                LBrace => {
                    self.flush_xml_text(&mut state, true, ignore_space);
                    self.next()?;
                    self.emit(VALUE_CALL);
                    self.emit("(");
                    let mode = self.set_trivia_mode(TriviaMode::Verbatim);
                    self.parse_brace_expression(RBrace)?;
                    self.trivia_mode = mode;
                    self.emit(")");
                    pos = self.scanner.token().location.end;
                }
                Eos => {
                    return Err(self.error_at_next(format!("Unterminated element <{}>", tag)));
                }
                _ => {
                    self.next()?;
                    return Err(self.unexpected());
                }
            }
        }
    }

    /// Emits accumulated text as a `_VVT` child (unless it is only
    /// collapsible whitespace), the separator before the next child, and the
    /// line breaks seen since the previous child.
    fn flush_xml_text(&mut self, state: &mut ContentState, before_child: bool, ignore_space: bool) {
        if !state.text.is_empty() {
            let text = std::mem::take(&mut state.text);
            if !ignore_space || !text.trim().is_empty() {
                self.separate_child(state);
                self.emit(&format!("{}(\"{}\")", TEXT_CALL, text));
            }
        }
        if before_child {
            self.separate_child(state);
        }
        if !state.gap.is_empty() {
            let gap = std::mem::take(&mut state.gap);
            self.emit(&gap);
        }
    }

    fn separate_child(&mut self, state: &mut ContentState) {
        if state.first {
            state.first = false;
        } else {
            self.emit(",");
        }
    }
}
