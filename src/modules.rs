//! `import` and `export` rewriting to CommonJS.
//!
//! Imports become `const ... = require(...)` in place. Exports are either
//! rewritten in place (`export default <expr>`) or collected and assigned
//! to `exports` by the document tail.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::parser::Parser;
use crate::scanner::{is_identifier_part, is_identifier_start};
use crate::sink::TriviaMode;
use crate::snippets;
use crate::token::{keyword_or_identifier, TokenKind};

/// A collected `exports.<exported> = <local>;` binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBinding {
    pub exported: String,
    pub local: String,
}

impl ExportBinding {
    pub fn same(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            exported: name.clone(),
            local: name,
        }
    }
}

/// Binding name for `import "path"`: the file stem with `.` and `-` mapped
/// to `_`, if that forms a bindable identifier.
pub fn import_alias(path: &str) -> Option<String> {
    let path = path.trim();
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let stem = match base.rfind('.') {
        Some(i) if i > 0 => &base[..i],
        _ => base,
    };
    let alias = stem.replace(['.', '-'], "_");
    is_binding_name(&alias).then_some(alias)
}

fn is_binding_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_identifier_start)
        && chars.all(is_identifier_part)
        && keyword_or_identifier(name).is_declaration_identifier()
}

/// Text between the quotes of a string literal token.
fn unquote(literal: &str) -> &str {
    if literal.len() >= 2 {
        &literal[1..literal.len() - 1]
    } else {
        literal
    }
}

impl<'src, 'out> Parser<'src, 'out> {
    // ═══════════════════════════════════════════════════════════════════════════
    // IMPORT
    // ═══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_import(&mut self) -> Result<()> {
        use TokenKind::*;

        // `import(...)` and `import.meta` are expressions.
        if matches!(self.scanner.peek(), LParen | Period) {
            self.fetch();
            return Ok(());
        }

        let mode = self.set_trivia_mode(TriviaMode::NewlinesOnly);
        let kind = self.next()?;

        if kind.is_import_identifier() {
            let id = self.scanner.token().value.clone();
            match self.next()? {
                From => {
                    let module = self.expect_module_specifier()?;
                    self.emit(&format!("const {} = require({}).default", id, module));
                }
                Comma => match self.next()? {
                    LBrace => {
                        self.emit(&format!("const {{ default: {},", id));
                        self.parse_import_block()?;
                        self.expect(From)?;
                        let module = self.expect_module_specifier()?;
                        self.emit(&format!(" = require({})", module));
                    }
                    Mul => {
                        let namespace = self.parse_namespace_alias()?;
                        self.expect(From)?;
                        let module = self.expect_module_specifier()?;
                        self.emit(&format!(
                            "const {} = require({}), {} = {}.default",
                            namespace, module, id, namespace
                        ));
                    }
                    _ => return Err(self.error("Malformed import: expected `{` or `*` after `,`")),
                },
                _ => return Err(self.error("Malformed import: expected `from`")),
            }
        } else if kind == Mul {
            let namespace = self.parse_namespace_alias()?;
            self.expect(From)?;
            let module = self.expect_module_specifier()?;
            self.emit(&format!("const {} = require({})", namespace, module));
        } else if kind == LBrace {
            self.emit("const {");
            self.parse_import_block()?;
            self.expect(From)?;
            let module = self.expect_module_specifier()?;
            self.emit(&format!(" = require({})", module));
        } else if kind == String {
            let module = self.scanner.token().value.clone();
            if self.scanner.peek() == As {
                self.next()?;
                if !self.next()?.is_import_identifier() {
                    return Err(self.error("Malformed import: expected an alias after `as`"));
                }
                let alias = self.scanner.token().value.clone();
                self.emit(&format!("const {} = require({})", alias, module));
            } else {
                match import_alias(unquote(&module)) {
                    Some(alias) => self.emit(&format!("const {} = require({})", alias, module)),
                    None => self.emit(&format!("require({})", module)),
                }
            }
        } else {
            return Err(self.error("Malformed import"));
        }

        trace!(line = self.scanner.token().location.line + 1, "rewrote import");
        self.trivia_mode = mode;
        Ok(())
    }

    /// `{ a as b, c }` with `{` current; emits ` a: b, c }`.
    fn parse_import_block(&mut self) -> Result<()> {
        use TokenKind::*;

        loop {
            if self.scanner.peek() == RBrace {
                break;
            }
            let imported = self.next()?;
            let name = self.scanner.token().value.clone();
            if self.scanner.peek() == As {
                if !imported.is_property_identifier() {
                    return Err(self.error("Malformed import: bad imported name"));
                }
                self.next()?;
                if !self.next()?.is_import_identifier() {
                    return Err(self.error("Malformed import: expected an alias after `as`"));
                }
                let alias = self.scanner.token().value.clone();
                self.emit(&format!(" {}: {}", name, alias));
            } else {
                if !imported.is_import_identifier() {
                    return Err(self.error("Malformed import: bad imported name"));
                }
                self.emit(&format!(" {}", name));
            }
            if self.scanner.peek() != Comma {
                break;
            }
            self.next()?;
            self.emit(",");
        }
        self.expect(RBrace)?;
        self.emit(" }");
        Ok(())
    }

    /// `* as name` with `*` current.
    fn parse_namespace_alias(&mut self) -> Result<std::string::String> {
        self.expect(TokenKind::As)?;
        if !self.next()?.is_import_identifier() {
            return Err(self.error("Malformed import: expected a namespace name"));
        }
        Ok(self.scanner.token().value.clone())
    }

    fn expect_module_specifier(&mut self) -> Result<std::string::String> {
        if self.next()? != TokenKind::String {
            return Err(self.error("Malformed import: expected a module string"));
        }
        Ok(self.scanner.token().value.clone())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EXPORT
    // ═══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_export(&mut self) -> Result<()> {
        use TokenKind::*;

        if self.level != 0 {
            return Err(self.error("`export` is only allowed at the top level"));
        }

        let is_default = self.scanner.peek() == Default;
        if is_default {
            if self.has_export_default {
                self.next()?;
                return Err(self.error("Duplicate `export default`"));
            }
            self.has_export_default = true;
            let mode = self.set_trivia_mode(TriviaMode::NewlinesOnly);
            self.next()?;
            self.trivia_mode = mode;
        }

        match self.scanner.peek() {
            Var | Let | Const if !is_default => {
                self.emit(snippets::EXPORT_MARKER);
                self.next()?;
                self.fetch();
                if !self.scanner.peek().is_declaration_identifier() {
                    return Err(self.error_at_next("Malformed export: expected a binding name"));
                }
                let name = self.scanner.next_token().value.clone();
                trace!(%name, "collected export");
                self.exports.push(ExportBinding::same(name));
                Ok(())
            }
            Function | Class | Async if !is_default || self.is_named_declaration_ahead() => {
                self.emit(snippets::EXPORT_MARKER);
                self.next()?;
                let name = self.parse_exported_declaration()?;
                let Some(name) = name else {
                    return Err(self.error("Malformed export: declaration has no name"));
                };
                trace!(%name, is_default, "collected export");
                if is_default {
                    self.export_default = Some(name);
                } else {
                    self.exports.push(ExportBinding::same(name));
                }
                Ok(())
            }
            LBrace if !is_default => self.parse_export_list(),
            Eos | Semicolon | RBrace | RParen | RBrack => {
                self.next()?;
                Err(self.error("Malformed export"))
            }
            _ if is_default => {
                self.emit(snippets::EXPORTS_DEFAULT);
                self.emit(" =");
                self.next()?;
                self.parse_advance()
            }
            _ => {
                self.next()?;
                Err(self.error("Malformed export: expected a declaration or `{`"))
            }
        }
    }

    /// Whether the `function`/`class`/`async function` in the lookahead
    /// declares a name.
    fn is_named_declaration_ahead(&self) -> bool {
        use TokenKind::*;

        let mut ahead = self.scanner.clone();
        let mut kind = ahead.next();
        if kind == Async {
            if ahead.peek() != Function {
                return false;
            }
            kind = ahead.next();
        }
        if kind == Function && ahead.peek() == Mul {
            ahead.next();
        }
        ahead.peek().is_declaration_identifier()
    }

    /// The declaration after `export`, current at its first keyword.
    fn parse_exported_declaration(&mut self) -> Result<Option<std::string::String>> {
        use TokenKind::*;

        match self.scanner.kind() {
            Async => {
                self.fetch();
                self.expect(Function)?;
                self.parse_function()
            }
            Function => self.parse_function(),
            Class if self.extended => self.parse_class(),
            Class => {
                self.fetch();
                if !self.scanner.peek().is_declaration_identifier() {
                    return Ok(None);
                }
                self.next()?;
                self.fetch();
                Ok(Some(self.scanner.token().value.clone()))
            }
            _ => Err(self.unexpected()),
        }
    }

    /// `export { a, b as c }`: removed in place, bindings collected.
    fn parse_export_list(&mut self) -> Result<()> {
        use TokenKind::*;

        let mode = self.set_trivia_mode(TriviaMode::NewlinesOnly);
        self.expect(LBrace)?;
        loop {
            if self.scanner.peek() == RBrace {
                break;
            }
            if !self.next()?.is_declaration_identifier() {
                return Err(self.error("Malformed export list"));
            }
            let local = self.scanner.token().value.clone();
            let mut exported = local.clone();
            if self.scanner.peek() == As {
                self.next()?;
                if !self.next()?.is_property_identifier() {
                    return Err(self.error("Malformed export list: expected a name after `as`"));
                }
                exported = self.scanner.token().value.clone();
            }
            trace!(%local, %exported, "collected export");
            self.exports.push(ExportBinding { exported, local });
            if self.scanner.peek() != Comma {
                break;
            }
            self.next()?;
        }
        self.expect(RBrace)?;
        if self.scanner.peek() == From {
            return Err(self.error_at_next("Re-exporting from another module is not supported"));
        }
        self.trivia_mode = mode;
        Ok(())
    }
}
