//! Class bodies: field hoisting and `event` sugar.
//!
//! A field initializer cannot stay in the class body, so it is re-parsed
//! through the expression grammar into a capture buffer. The body keeps a
//! comment placeholder with the same text (and so the same line count) and
//! the captured initializer lands in the owning class's record. The document
//! tail turns each record into `Object.assign(...)` statements.

use indexmap::IndexMap;
use tracing::trace;

use crate::error::Result;
use crate::parser::Parser;
use crate::sink::TriviaMode;
use crate::snippets;
use crate::token::TokenKind;

/// Hoisted fields of one class declaration.
///
/// Records are identified by declaration order, so two classes sharing a
/// name in different scopes never merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFieldRecord {
    pub index: usize,
    pub class_name: String,
    /// Instance fields: name to initializer source. Redeclaring a field
    /// replaces its initializer but keeps its first position.
    pub fields: IndexMap<String, String>,
    pub static_fields: IndexMap<String, String>,
}

impl ClassFieldRecord {
    pub fn new(index: usize, class_name: impl Into<String>) -> Self {
        Self {
            index,
            class_name: class_name.into(),
            fields: IndexMap::new(),
            static_fields: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.static_fields.is_empty()
    }
}

/// `on` followed by a letter; yields the event name after `on`.
fn event_name(member: &str) -> Option<&str> {
    let rest = member.strip_prefix("on")?;
    rest.starts_with(|c: char| c.is_ascii_alphabetic())
        .then_some(rest)
}

/// Whether a token can name a class member.
fn is_member_name(kind: TokenKind) -> bool {
    kind.is_property_identifier()
        || kind.is_class_member_identifier()
        || matches!(kind, TokenKind::Number | TokenKind::LBrack)
}

impl<'src, 'out> Parser<'src, 'out> {
    /// `class [name] [extends expr] { body }` with `class` current. Yields
    /// the class name.
    pub(crate) fn parse_class(&mut self) -> Result<Option<String>> {
        use TokenKind::*;

        let declaration = self.at_declaration_position();
        self.fetch();

        let mut name = None;
        let mut record = None;
        if self.scanner.peek().is_declaration_identifier() {
            self.next()?;
            self.fetch();
            let class_name = self.scanner.token().value.clone();
            if self.level == 0 && declaration {
                let index = self.classes.len();
                self.classes.push(ClassFieldRecord::new(index, class_name.clone()));
                record = Some(index);
            }
            name = Some(class_name);
        }

        if self.scanner.peek() == Extends {
            self.next()?;
            self.fetch();
            loop {
                match self.next()? {
                    LBrace => break,
                    Eos => return Err(self.unexpected()),
                    _ => self.parse_advance()?,
                }
            }
        } else {
            self.expect(LBrace)?;
        }

        self.emit("{");
        self.level += 1;
        self.parse_class_body(record)?;
        self.level -= 1;
        self.emit("}");
        Ok(name)
    }

    /// Statement start: top of file, after `;`, `}`, `export [default]`, or
    /// on a fresh line after something that cannot continue an expression.
    fn at_declaration_position(&self) -> bool {
        use TokenKind::*;

        match self.scanner.prev() {
            None | Some(Semicolon | RBrace | Export | Default | ShellHeader) => true,
            Some(prev) => {
                self.scanner.token().newline_before
                    && !prev.is_operator_before_operand()
                    && !matches!(
                        prev,
                        LParen | LBrack | Comma | Colon | Conditional | Return | Arrow | Ellipsis
                    )
            }
        }
    }

    fn parse_class_body(&mut self, record: Option<usize>) -> Result<()> {
        use TokenKind::*;

        loop {
            match self.next()? {
                RBrace => return Ok(()),
                Semicolon => self.fetch(),
                Eos => return Err(self.unexpected()),
                At => self.parse_decorator()?,
                Static => match self.scanner.peek() {
                    LBrace => {
                        self.fetch();
                        self.next()?;
                        self.parse_group(RBrace)?;
                    }
                    LParen | Assign | Semicolon | RBrace => self.parse_class_member(record, None)?,
                    _ => {
                        // Hold `static` back until we know whether a field follows.
                        self.begin_capture();
                        let next = self.next();
                        let gap = self.end_capture();
                        next?;
                        self.parse_class_member(record, Some(gap))?;
                    }
                },
                Event if self.scanner.peek() == Identifier => self.parse_event()?,
                _ => self.parse_class_member(record, None)?,
            }
        }
    }

    /// A method, accessor or field, current at its first token after `static`.
    /// `static_gap` holds the trivia that followed a held-back `static`.
    fn parse_class_member(&mut self, record: Option<usize>, static_gap: Option<String>) -> Result<()> {
        use TokenKind::*;

        let kind = self.scanner.kind();
        let peek = self.scanner.peek();
        let same_line = !self.scanner.next_token().newline_before;

        let modifier = match kind {
            Get | Set => is_member_name(peek),
            Async => same_line && (is_member_name(peek) || peek == Mul),
            Mul => true,
            _ => false,
        };

        if !modifier && !is_member_name(kind) {
            return Err(self.unexpected());
        }

        if !modifier && kind != LBrack && peek != LParen {
            return self.parse_class_field(record, static_gap);
        }

        if let Some(gap) = static_gap {
            self.emit("static");
            self.emit(&gap);
        }
        if modifier {
            self.fetch();
            self.next()?;
            if kind == Async && self.scanner.kind() == Mul {
                self.fetch();
                self.next()?;
            }
            if !is_member_name(self.scanner.kind()) {
                return Err(self.unexpected());
            }
        }
        self.parse_member_name()?;
        if kind == LBrack && self.scanner.peek() != LParen {
            return Err(self.error("Computed class field names are not supported"));
        }
        self.parse_method_tail()
    }

    fn parse_member_name(&mut self) -> Result<()> {
        if self.scanner.kind() == TokenKind::LBrack {
            self.parse_group(TokenKind::RBrack)
        } else {
            self.fetch();
            Ok(())
        }
    }

    /// `(params) { body }` after a member name.
    fn parse_method_tail(&mut self) -> Result<()> {
        use TokenKind::*;

        self.expect(LParen)?;
        self.emit("(");
        self.parse_brace_expression(RParen)?;
        self.emit(")");
        self.expect(LBrace)?;
        self.emit("{");
        self.parse_brace_expression(RBrace)?;
        self.emit("}");
        Ok(())
    }

    /// `name = expr;` or `name;`, current at the name.
    fn parse_class_field(&mut self, record: Option<usize>, static_gap: Option<String>) -> Result<()> {
        use TokenKind::*;

        let token = self.scanner.token();
        if token.value.starts_with('#') {
            return Err(self.error("Private class fields are not supported"));
        }
        let Some(index) = record else {
            return Err(self.error(
                "Class fields are only supported in named top-level class declarations",
            ));
        };
        let name = token.source_text().to_string();

        let mut placeholder = std::string::String::from("/*");
        if let Some(gap) = &static_gap {
            placeholder.push_str("static");
            placeholder.push_str(gap);
        }
        placeholder.push_str(&name);

        let value = if self.scanner.peek() == Assign {
            self.begin_capture();
            let assign = self.next();
            let gap = self.end_capture();
            assign?;
            placeholder.push_str(&gap);
            placeholder.push('=');

            self.begin_capture();
            let parsed = self.parse_expression();
            let captured = self.end_capture();
            parsed?;
            placeholder.push_str(&captured.replace("*/", "*\\/"));
            captured
        } else {
            "undefined".to_string()
        };
        placeholder.push_str("*/");
        self.emit(&placeholder);
        self.end_member()?;

        if let Some(record) = self.classes.get_mut(index) {
            trace!(
                class = %record.class_name,
                index = record.index,
                field = %name,
                is_static = static_gap.is_some(),
                "hoisted class field"
            );
            let fields = if static_gap.is_some() {
                &mut record.static_fields
            } else {
                &mut record.fields
            };
            fields.insert(name, value);
        }
        Ok(())
    }

    /// `event onName;` with `event` current.
    fn parse_event(&mut self) -> Result<()> {
        let mode = self.set_trivia_mode(TriviaMode::NewlinesOnly);
        let next = self.next();
        self.trivia_mode = mode;
        next?;

        let member = self.scanner.token().value.clone();
        let Some(name) = event_name(&member) else {
            return Err(self.error(format!(
                "Invalid event name `{}`, expected `on` followed by a letter",
                member
            )));
        };
        self.emit(&snippets::event_members(name));
        self.end_member()
    }

    /// Consumes the `;` ending a field or event, or accepts an implicit end
    /// at `}` or a line break. The `;` itself is dropped.
    fn end_member(&mut self) -> Result<()> {
        match self.scanner.peek() {
            TokenKind::Semicolon => {
                self.next()?;
                Ok(())
            }
            TokenKind::RBrace => Ok(()),
            _ if self.scanner.next_token().newline_before => Ok(()),
            _ => {
                self.next()?;
                Err(self.error("Expected `;` after class member"))
            }
        }
    }

    /// `@name[.path](args)` before a class member.
    fn parse_decorator(&mut self) -> Result<()> {
        self.fetch();
        if !self.next()?.is_declaration_identifier() {
            return Err(self.unexpected());
        }
        self.fetch();
        self.parse_postfix_expression()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name() {
        assert_eq!(event_name("onClick"), Some("Click"));
        assert_eq!(event_name("onchange"), Some("change"));
        assert_eq!(event_name("on"), None);
        assert_eq!(event_name("on1"), None);
        assert_eq!(event_name("click"), None);
    }

    #[test]
    fn test_redeclared_field_keeps_position() {
        let mut record = ClassFieldRecord::new(0, "A");
        record.fields.insert("a".into(), "1".into());
        record.fields.insert("b".into(), "2".into());
        record.fields.insert("a".into(), "3".into());
        let entries: Vec<_> = record.fields.iter().collect();
        assert_eq!(entries[0], (&"a".to_string(), &"3".to_string()));
        assert_eq!(entries[1].0, "b");
    }
}
