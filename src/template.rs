//! Template literals with `${}` splices.
//!
//! The scanner stops a template at each `${`. The splice is parsed with the
//! full statement grammar, so elements, nested templates and classes all work
//! inside it, and scanning resumes from the `}` that closes it.

use crate::error::Result;
use crate::parser::Parser;
use crate::token::TokenKind;

impl<'src, 'out> Parser<'src, 'out> {
    /// A template with its head (`` `text${ ``) current.
    pub(crate) fn parse_template(&mut self) -> Result<()> {
        use TokenKind::*;

        self.fetch();
        loop {
            let level = self.level;
            self.level += 1;
            loop {
                match self.next()? {
                    RBrace => break,
                    Eos => return Err(self.error("Unterminated template literal")),
                    _ => self.parse_advance()?,
                }
            }
            self.level -= 1;
            if self.level != level {
                return Err(self.unexpected());
            }

            let pos = self.scanner.token().location.begin;
            self.scanner.scan_template_body(pos);
            match self.next()? {
                TemplateMiddle => self.fetch(),
                TemplateTail => {
                    self.fetch();
                    return Ok(());
                }
                _ => return Err(self.unexpected()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::transform::{transform, transform_plain};

    #[test]
    fn test_splices_pass_through() {
        let src = "s = `a${b}c${ d + `x${e}` }f`;";
        assert_eq!(transform_plain(src, "t.js", false).unwrap(), format!("{src}\n"));
    }

    #[test]
    fn test_splice_with_element() {
        let out = transform("s = `a${ <div/> }b`;", "t.jsx", false).unwrap();
        assert!(out.ends_with("s = `a${ _VV(\"div\", [], []) }b`;\n"), "{out}");
    }

    #[test]
    fn test_splice_with_object_literal() {
        let src = "s = `${ {a: 1}.a }`;";
        assert_eq!(transform_plain(src, "t.js", false).unwrap(), format!("{src}\n"));
    }

    #[test]
    fn test_unterminated_template_is_fatal() {
        assert!(transform_plain("s = `a${b", "t.js", false).is_err());
        assert!(transform_plain("s = `a${b}c", "t.js", false).is_err());
    }
}
