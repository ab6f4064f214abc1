//! Single-expression grammar.
//!
//! Statement-level code is passed through token by token, but a class-field
//! initializer or an element attribute value must stop exactly where the
//! expression ends. These rules consume one assignment expression and leave
//! the following token as lookahead. In an attribute value the grammar is
//! restricted to one operand (plus `?:`) so a sibling attribute or the tag
//! close is never swallowed.

use crate::error::Result;
use crate::parser::Parser;
use crate::token::TokenKind;

const PREFIX_WORDS: [&str; 5] = ["new", "void", "delete", "await", "yield"];

/// Tokens that can begin an operand.
fn starts_operand(kind: TokenKind) -> bool {
    use TokenKind::*;
    kind.is_declaration_identifier()
        || matches!(
            kind,
            Number
                | String
                | Template
                | TemplateHead
                | Function
                | Class
                | LParen
                | LBrack
                | LBrace
                | Add
                | Sub
                | Not
                | BitNot
                | Typeof
                | Inc
                | Dec
                | Div
                | AssignDiv
                | XmlElementTag
        )
}

impl<'src, 'out> Parser<'src, 'out> {
    /// Consumes one assignment expression starting at the lookahead.
    pub(crate) fn parse_expression(&mut self) -> Result<()> {
        use TokenKind::*;

        self.parse_unary_expression()?;

        if self.scanner.peek() == Arrow {
            self.next()?;
            self.fetch();
            return self.parse_arrow_body();
        }

        if self.in_attribute {
            if self.scanner.peek() == Conditional {
                self.parse_conditional_expression()?;
            }
            return Ok(());
        }

        if self.scanner.peek().is_assignment_op() {
            self.next()?;
            self.fetch();
            return self.parse_expression();
        }

        loop {
            let op = self.scanner.peek();
            if op.is_binary_or_compare_op() {
                self.next()?;
                self.fetch();
                self.parse_unary_expression()?;
            } else if op == XmlElementTag {
                // `a <b`: the scanner read a tag name, but after an operand it
                // can only be a comparison.
                self.next()?;
                self.parse_less_than();
                self.parse_unary_expression()?;
            } else if op == Conditional {
                return self.parse_conditional_expression();
            } else {
                return Ok(());
            }
        }
    }

    /// `? then : else` with the lookahead at `?`.
    fn parse_conditional_expression(&mut self) -> Result<()> {
        self.expect(TokenKind::Conditional)?;
        self.fetch();
        self.parse_expression()?;
        self.expect(TokenKind::Colon)?;
        self.fetch();
        self.parse_expression()
    }

    /// After `=>`: a braced body or a single expression.
    fn parse_arrow_body(&mut self) -> Result<()> {
        if self.scanner.peek() == TokenKind::LBrace {
            self.next()?;
            return self.parse_group(TokenKind::RBrace);
        }
        let in_attribute = std::mem::replace(&mut self.in_attribute, false);
        let result = self.parse_expression();
        self.in_attribute = in_attribute;
        result
    }

    /// Prefix operators, then a primary with its postfix chain.
    pub(crate) fn parse_unary_expression(&mut self) -> Result<()> {
        use TokenKind::*;

        let kind = self.next()?;
        match kind {
            Add | Sub | Not | BitNot | Typeof | Inc | Dec | Ellipsis => {
                self.fetch();
                self.parse_unary_expression()
            }
            Identifier
                if PREFIX_WORDS.contains(&self.scanner.token().value.as_str())
                    && starts_operand(self.scanner.peek()) =>
            {
                self.fetch();
                self.parse_unary_expression()
            }
            Async if self.scanner.peek() == Function => {
                self.fetch();
                self.next()?;
                self.parse_function()?;
                self.parse_postfix_expression()
            }
            k if k.is_declaration_identifier() => {
                self.fetch();
                self.parse_postfix_expression()
            }
            Number | String | Template => {
                self.fetch();
                self.parse_postfix_expression()
            }
            TemplateHead => {
                self.parse_template()?;
                self.parse_postfix_expression()
            }
            Function => {
                self.parse_function()?;
                self.parse_postfix_expression()
            }
            Class => {
                self.parse_class()?;
                self.parse_postfix_expression()
            }
            Div | AssignDiv => {
                self.parse_regexp()?;
                self.parse_postfix_expression()
            }
            LParen => {
                self.parse_group(RParen)?;
                self.parse_postfix_expression()
            }
            LBrack => {
                self.parse_group(RBrack)?;
                self.parse_postfix_expression()
            }
            LBrace => {
                self.parse_group(RBrace)?;
                self.parse_postfix_expression()
            }
            XmlElementTag => {
                if self.in_attribute {
                    return Err(self.error("An element cannot be an attribute value without braces"));
                }
                self.parse_xml_element(false)?;
                Ok(())
            }
            XmlComment if self.extended && !self.in_attribute => {
                self.emit_xml_comment();
                self.parse_unary_expression()
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Member access, calls, indexing, tagged templates and postfix `++`/`--`.
    pub(crate) fn parse_postfix_expression(&mut self) -> Result<()> {
        use TokenKind::*;

        loop {
            match self.scanner.peek() {
                Period | OptionalChain => {
                    let optional = self.next()? == OptionalChain;
                    self.fetch();
                    let after = self.scanner.peek();
                    if after.is_property_identifier() {
                        self.next()?;
                        self.fetch();
                    } else if !(optional && matches!(after, LParen | LBrack)) {
                        self.next()?;
                        return Err(self.unexpected());
                    }
                }
                LParen => {
                    self.next()?;
                    self.parse_group(RParen)?;
                }
                LBrack => {
                    self.next()?;
                    self.parse_group(RBrack)?;
                }
                Template => {
                    self.next()?;
                    self.fetch();
                }
                TemplateHead => {
                    self.next()?;
                    self.parse_template()?;
                }
                Inc | Dec if !self.scanner.next_token().newline_before => {
                    self.next()?;
                    self.fetch();
                }
                _ => return Ok(()),
            }
        }
    }
}
