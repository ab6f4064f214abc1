//! Recursive-descent driver.
//!
//! There is no tree: each rule either passes its tokens through or writes the
//! rewritten form straight into the output sink. Rules follow one contract:
//! on entry the current token is the construct's first token, on return it is
//! the construct's last consumed token.
//!
//! The grammar is split by construct across `expression`, `modules`,
//! `class_fields`, `xml` and `template`; this file holds the shared state,
//! token plumbing and the statement-level dispatch.

use tracing::trace;

use crate::class_fields::ClassFieldRecord;
use crate::document;
use crate::error::{Result, TransformError};
use crate::modules::ExportBinding;
use crate::scanner::Scanner;
use crate::sink::{OutputSink, TriviaMode};
use crate::snippets;
use crate::token::TokenKind;
use crate::transform::TransformOptions;

pub struct Parser<'src, 'out> {
    pub(crate) scanner: Scanner<'src>,
    out: &'out mut dyn OutputSink,
    path: &'src str,
    pub(crate) extended: bool,
    helper_module: &'src str,
    /// Bracket depth; every sub-parse restores it.
    pub(crate) level: u32,
    pub(crate) classes: Vec<ClassFieldRecord>,
    pub(crate) exports: Vec<ExportBinding>,
    pub(crate) export_default: Option<String>,
    pub(crate) has_export_default: bool,
    /// Nested capture buffers; emission goes to the innermost one.
    captures: Vec<String>,
    /// Parsing a restricted element attribute value.
    pub(crate) in_attribute: bool,
    /// Parsing the statement of a braceless `if (...)`.
    pub(crate) single_if: bool,
    pub(crate) trivia_mode: TriviaMode,
}

impl<'src, 'out> Parser<'src, 'out> {
    pub fn new(
        source: &'src str,
        path: &'src str,
        options: &'src TransformOptions,
        out: &'out mut dyn OutputSink,
    ) -> Self {
        Self {
            scanner: Scanner::new(source, options.strip_comments),
            out,
            path,
            extended: options.extended,
            helper_module: &options.helper_module,
            level: 0,
            classes: Vec::new(),
            exports: Vec::new(),
            export_default: None,
            has_export_default: false,
            captures: Vec::new(),
            in_attribute: false,
            single_if: false,
            trivia_mode: TriviaMode::Verbatim,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DOCUMENT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Transforms the whole document, then appends the hoisted tail.
    pub fn parse_document(mut self) -> Result<()> {
        if self.scanner.peek() == TokenKind::ShellHeader {
            self.next()?;
            self.fetch();
        }
        if self.extended {
            let header = snippets::helper_header(self.helper_module);
            self.emit(&header);
        }

        while self.next()? != TokenKind::Eos {
            self.parse_advance()?;
        }
        if self.level != 0 {
            return Err(self.error("Unbalanced brackets at end of input"));
        }

        trace!(
            classes = self.classes.len(),
            exports = self.exports.len(),
            "assembling document tail"
        );
        let tail = document::assemble_tail(
            &self.classes,
            &self.exports,
            self.export_default.as_deref(),
        );
        self.emit(&tail);
        Ok(())
    }

    /// Dispatches on the current token: rewrite it or pass it through.
    pub(crate) fn parse_advance(&mut self) -> Result<()> {
        use TokenKind::*;

        let kind = self.scanner.kind();

        // Keywords used as property names: `a.class`, `{ import: 1 }`.
        if kind.is_keyword()
            && (matches!(self.scanner.prev(), Some(Period | OptionalChain))
                || self.scanner.peek() == Colon)
        {
            self.fetch();
            return Ok(());
        }

        match kind {
            Export => self.parse_export(),
            Import => self.parse_import(),
            Class if self.extended => self.parse_class().map(|_| ()),
            Function => self.parse_function().map(|_| ()),
            If => {
                self.fetch();
                self.expect(LParen)?;
                self.emit("(");
                self.parse_brace_expression(RParen)?;
                self.emit(")");
                if self.scanner.peek() != LBrace {
                    self.next()?;
                    self.single_if = true;
                    let result = self.parse_advance();
                    self.single_if = false;
                    result?;
                }
                Ok(())
            }
            LParen => self.parse_group(RParen),
            LBrack => self.parse_group(RBrack),
            LBrace => self.parse_group(RBrace),
            TemplateHead => self.parse_template(),
            XmlElementTag => {
                if self.in_attribute {
                    return Err(self.unexpected());
                }
                self.parse_xml_element(false).map(|_| ())
            }
            XmlComment => {
                if !self.extended || self.in_attribute {
                    return Err(self.unexpected());
                }
                self.emit_xml_comment();
                Ok(())
            }
            Div | AssignDiv => {
                if self.is_legal_literal_begin(false) {
                    self.parse_regexp()
                } else {
                    self.fetch();
                    Ok(())
                }
            }
            RParen | RBrack | RBrace | XmlElementTagEnd | Illegal | Eos => Err(self.unexpected()),
            _ => {
                self.fetch();
                Ok(())
            }
        }
    }

    /// `(`, `[` or `{` as current: emits the pair around its contents.
    pub(crate) fn parse_group(&mut self, end: TokenKind) -> Result<()> {
        self.fetch();
        self.parse_brace_expression(end)?;
        self.emit(end.text());
        Ok(())
    }

    /// Passes everything through up to the matching `end`, which becomes
    /// current. The caller emits the delimiters.
    pub(crate) fn parse_brace_expression(&mut self, end: TokenKind) -> Result<()> {
        let level = self.level;
        let in_attribute = std::mem::replace(&mut self.in_attribute, false);
        self.level += 1;

        loop {
            let kind = self.next()?;
            if kind == end {
                break;
            }
            if kind == TokenKind::Eos {
                return Err(self.error(format!("Unexpected end of input, expected `{}`", end.text())));
            }
            self.parse_advance()?;
        }

        self.level -= 1;
        self.in_attribute = in_attribute;
        if self.level != level {
            return Err(self.unexpected());
        }
        Ok(())
    }

    /// `function [*] [name] (params) { body }`; yields the name if any.
    pub(crate) fn parse_function(&mut self) -> Result<Option<String>> {
        use TokenKind::*;

        self.fetch();
        if self.scanner.peek() == Mul {
            self.next()?;
            self.fetch();
        }
        let mut name = None;
        if self.scanner.peek().is_declaration_identifier() {
            self.next()?;
            self.fetch();
            name = Some(self.scanner.token().value.clone());
        }
        self.expect(LParen)?;
        self.emit("(");
        self.parse_brace_expression(RParen)?;
        self.emit(")");
        self.expect(LBrace)?;
        self.emit("{");
        self.parse_brace_expression(RBrace)?;
        self.emit("}");
        Ok(name)
    }

    /// Scans the current `/` or `/=` as a regular expression literal.
    pub(crate) fn parse_regexp(&mut self) -> Result<()> {
        let pos = self.scanner.token().location.begin;
        self.scanner.scan_regexp_body(pos);
        self.next()?;
        self.fetch();
        Ok(())
    }

    pub(crate) fn emit_xml_comment(&mut self) {
        let body = self.scanner.token().value.clone();
        self.emit(snippets::XML_COMMENT_OPEN);
        self.emit(&body);
        self.emit(snippets::XML_COMMENT_CLOSE);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LITERAL POSITION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Whether the previous token lets the current one start a literal
    /// (an element or a regular expression) rather than act as an operator.
    pub(crate) fn is_legal_literal_begin(&self, xml: bool) -> bool {
        use TokenKind::*;

        let Some(prev) = self.scanner.prev() else {
            return true;
        };
        if xml && matches!(prev, Inc | Dec) {
            return false;
        }
        if prev.is_operator_before_operand() {
            return true;
        }
        match prev {
            Of | LBrace | RBrace | LParen | LBrack | Comma | Return | Else | Colon
            | Semicolon | Conditional | Arrow | Default | Ellipsis | ShellHeader | TemplateHead
            | TemplateMiddle => true,
            RParen => self.single_if,
            RBrack => self.scanner.token().newline_before,
            _ => false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TOKENS & EMISSION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advances and emits the new current token's trivia. Consuming an
    /// illegal token is fatal.
    pub(crate) fn next(&mut self) -> Result<TokenKind> {
        let kind = self.scanner.next();
        let trivia = self.scanner.take_trivia();
        if !trivia.is_empty() {
            let text = self.trivia_mode.apply(&trivia);
            self.emit(&text);
        }
        if kind == TokenKind::Illegal {
            return Err(self.unexpected());
        }
        Ok(kind)
    }

    /// Advances and requires `kind`.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<()> {
        if self.next()? != kind {
            return Err(self.unexpected());
        }
        Ok(())
    }

    /// Emits the current token's text.
    pub(crate) fn fetch(&mut self) {
        let text = self.scanner.token().source_text();
        match self.captures.last_mut() {
            Some(buffer) => buffer.push_str(text),
            None => self.out.emit(text),
        }
    }

    pub(crate) fn emit(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.captures.last_mut() {
            Some(buffer) => buffer.push_str(text),
            None => self.out.emit(text),
        }
    }

    /// Redirects emission into a fresh buffer until [`Self::end_capture`].
    pub(crate) fn begin_capture(&mut self) {
        self.captures.push(String::new());
    }

    pub(crate) fn end_capture(&mut self) -> String {
        self.captures.pop().unwrap_or_default()
    }

    /// Sets the trivia mode, returning the previous one.
    pub(crate) fn set_trivia_mode(&mut self, mode: TriviaMode) -> TriviaMode {
        std::mem::replace(&mut self.trivia_mode, mode)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub(crate) fn error(&self, message: impl Into<String>) -> TransformError {
        let line = self.scanner.token().location.line + 1;
        TransformError::structural(message, line, self.path)
    }

    pub(crate) fn error_at_next(&self, message: impl Into<String>) -> TransformError {
        let line = self.scanner.next_token().location.line + 1;
        TransformError::structural(message, line, self.path)
    }

    /// Error for the current token; lexical when the scanner rejected it.
    pub(crate) fn unexpected(&self) -> TransformError {
        let token = self.scanner.token();
        let line = token.location.line + 1;
        if let Some(message) = token.error {
            return TransformError::lexical(message, line, self.path);
        }
        let message = match token.kind {
            TokenKind::Eos => "Unexpected end of input".to_string(),
            _ => {
                let text = token.source_text();
                if text.is_empty() {
                    format!("Unexpected token {:?}", token.kind)
                } else {
                    format!("Unexpected token `{}`", text)
                }
            }
        };
        TransformError::structural(message, line, self.path)
    }
}

#[cfg(test)]
mod tests {
    use crate::transform::{transform, transform_plain};

    #[test]
    fn test_passthrough_keeps_text() {
        let src = "var a = [1, (2)];\nif (a) { b(a) } // done\n";
        assert_eq!(transform_plain(src, "a.js", false).unwrap(), format!("{src}\n"));
    }

    #[test]
    fn test_keywords_as_property_names() {
        let src = "x.class = { import: 1, export: 2 }.if;";
        assert_eq!(transform_plain(src, "a.js", false).unwrap(), format!("{src}\n"));
    }

    #[test]
    fn test_unbalanced_brackets_are_fatal() {
        let err = transform_plain("f(a]", "a.js", false).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(transform_plain("{ a", "a.js", false).is_err());
        assert!(transform_plain("a }", "a.js", false).is_err());
    }

    #[test]
    fn test_lexical_error_reports_scanner_message() {
        let err = transform_plain("x = 1;\ny = 'abc", "bad.js", false).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Lexical);
        assert_eq!(err.line, 2);
        assert_eq!(err.path, "bad.js");
    }

    #[test]
    fn test_braceless_if_allows_element() {
        let out = transform("if (a) <b/>", "a.jsx", false).unwrap();
        assert!(out.ends_with("if (a) _VV(\"b\", [], [])\n"), "{out}");
    }

    #[test]
    fn test_lt_after_identifier_is_comparison() {
        let out = transform("x = a<b;", "a.jsx", false).unwrap();
        assert!(out.ends_with("x = a<b;\n"), "{out}");
    }
}
