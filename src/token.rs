//! Token kinds, locations and the keyword table.

use lazy_static::lazy_static;
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN KIND
// ═══════════════════════════════════════════════════════════════════════════════

/// Lexical category of a token.
///
/// Declaration order matters: assignment operators, then binary and compare
/// operators, then unary operators form contiguous runs that the predicates
/// below rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TokenKind {
    Eos,
    // punctuators
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Colon,
    Semicolon,
    Comma,
    Conditional,
    Period,
    Ellipsis,
    OptionalChain,
    Inc,
    Dec,
    Arrow,
    // assignment operators
    Assign,
    AssignBitOr,
    AssignBitXor,
    AssignBitAnd,
    AssignShl,
    AssignSar,
    AssignShr,
    AssignAdd,
    AssignSub,
    AssignMul,
    AssignPower,
    AssignDiv,
    AssignMod,
    AssignOr,
    AssignAnd,
    AssignNullish,
    // binary operators
    Or,
    And,
    Nullish,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Sar,
    Shr,
    Add,
    Sub,
    Mul,
    Power,
    Div,
    Mod,
    // compare operators
    Eq,
    Ne,
    EqStrict,
    NeStrict,
    Lt,
    Gt,
    Lte,
    Gte,
    Instanceof,
    In,
    // unary operators
    Not,
    BitNot,
    Typeof,
    // literals
    Number,
    String,
    Template,
    TemplateHead,
    TemplateMiddle,
    TemplateTail,
    Regexp,
    Identifier,
    // keywords
    As,
    Async,
    Export,
    From,
    Import,
    If,
    Of,
    Return,
    Var,
    Class,
    Function,
    Let,
    Default,
    Const,
    Extends,
    Event,
    Else,
    Get,
    Set,
    Static,
    // other
    #[default]
    Illegal,
    ShellHeader,
    At,
    XmlElementTag,
    XmlElementTagEnd,
    XmlComment,
    XmlText,
}

impl TokenKind {
    /// Source text of fixed-spelling tokens, empty for everything else.
    pub fn text(self) -> &'static str {
        use TokenKind::*;
        match self {
            LParen => "(",
            RParen => ")",
            LBrack => "[",
            RBrack => "]",
            LBrace => "{",
            RBrace => "}",
            Colon => ":",
            Semicolon => ";",
            Comma => ",",
            Conditional => "?",
            Period => ".",
            Ellipsis => "...",
            OptionalChain => "?.",
            Inc => "++",
            Dec => "--",
            Arrow => "=>",
            Assign => "=",
            AssignBitOr => "|=",
            AssignBitXor => "^=",
            AssignBitAnd => "&=",
            AssignShl => "<<=",
            AssignSar => ">>=",
            AssignShr => ">>>=",
            AssignAdd => "+=",
            AssignSub => "-=",
            AssignMul => "*=",
            AssignPower => "**=",
            AssignDiv => "/=",
            AssignMod => "%=",
            AssignOr => "||=",
            AssignAnd => "&&=",
            AssignNullish => "??=",
            Or => "||",
            And => "&&",
            Nullish => "??",
            BitOr => "|",
            BitXor => "^",
            BitAnd => "&",
            Shl => "<<",
            Sar => ">>",
            Shr => ">>>",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Power => "**",
            Div => "/",
            Mod => "%",
            Eq => "==",
            Ne => "!=",
            EqStrict => "===",
            NeStrict => "!==",
            Lt => "<",
            Gt => ">",
            Lte => "<=",
            Gte => ">=",
            Not => "!",
            BitNot => "~",
            At => "@",
            _ => "",
        }
    }

    pub fn is_assignment_op(self) -> bool {
        (TokenKind::Assign..=TokenKind::AssignNullish).contains(&self)
    }

    pub fn is_binary_or_compare_op(self) -> bool {
        (TokenKind::Or..=TokenKind::In).contains(&self)
    }

    /// Operators after which an operand (and so a literal) may start.
    pub fn is_operator_before_operand(self) -> bool {
        (TokenKind::Assign..=TokenKind::Typeof).contains(&self)
    }

    pub fn is_keyword(self) -> bool {
        (TokenKind::As..=TokenKind::Static).contains(&self)
            || matches!(self, TokenKind::Typeof | TokenKind::Instanceof | TokenKind::In)
    }

    /// Tokens that may name a binding (`let x`, `function x`, `class x`).
    pub fn is_declaration_identifier(self) -> bool {
        use TokenKind::*;
        matches!(self, Identifier | As | Async | Of | From | Event | Get | Set)
    }

    /// Tokens that may name an imported binding.
    pub fn is_import_identifier(self) -> bool {
        use TokenKind::*;
        matches!(self, Identifier | Async | Of | Event | Get | Set)
    }

    /// Tokens that may name a property: any identifier or keyword.
    pub fn is_property_identifier(self) -> bool {
        self == TokenKind::Identifier || self.is_keyword()
    }

    /// Tokens that may name a class member.
    pub fn is_class_member_identifier(self) -> bool {
        self.is_declaration_identifier() || self == TokenKind::String
    }

    /// Tokens whose spelling starts with `>`; an element head may end with
    /// one of these when the scanner glued the tag close to what follows.
    pub fn starts_with_gt(self) -> bool {
        use TokenKind::*;
        matches!(self, Gt | Gte | Sar | Shr | AssignSar | AssignShr)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEYWORDS
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut m = HashMap::new();
        m.insert("as", TokenKind::As);
        m.insert("async", TokenKind::Async);
        m.insert("class", TokenKind::Class);
        m.insert("const", TokenKind::Const);
        m.insert("default", TokenKind::Default);
        m.insert("export", TokenKind::Export);
        m.insert("extends", TokenKind::Extends);
        m.insert("event", TokenKind::Event);
        m.insert("else", TokenKind::Else);
        m.insert("from", TokenKind::From);
        m.insert("function", TokenKind::Function);
        m.insert("get", TokenKind::Get);
        m.insert("instanceof", TokenKind::Instanceof);
        m.insert("import", TokenKind::Import);
        m.insert("in", TokenKind::In);
        m.insert("if", TokenKind::If);
        m.insert("let", TokenKind::Let);
        m.insert("of", TokenKind::Of);
        m.insert("return", TokenKind::Return);
        m.insert("set", TokenKind::Set);
        m.insert("static", TokenKind::Static);
        m.insert("typeof", TokenKind::Typeof);
        m.insert("var", TokenKind::Var);
        m
    };
}

/// Keyword kind for `ident`, or `Identifier`.
pub fn keyword_or_identifier(ident: &str) -> TokenKind {
    KEYWORDS
        .get(ident)
        .copied()
        .unwrap_or(TokenKind::Identifier)
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub begin: usize,
    pub end: usize,
    /// 0-based line of `begin`.
    pub line: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
    /// Literal text: identifier name, literal source, tag name, escaped
    /// XML text or comment body.
    pub value: String,
    /// Whitespace and comments preceding the token.
    pub trivia: String,
    pub newline_before: bool,
    pub space_before: bool,
    /// Why an `Illegal` token could not be scanned.
    pub error: Option<&'static str>,
}

impl Token {
    pub(crate) fn reset(&mut self, begin: usize, line: u32) {
        self.kind = TokenKind::Illegal;
        self.location = Location {
            begin,
            end: begin,
            line,
        };
        self.value.clear();
        self.trivia.clear();
        self.newline_before = false;
        self.space_before = false;
        self.error = None;
    }

    /// The text to emit for this token when passing it through.
    pub fn source_text(&self) -> &str {
        match self.kind.text() {
            "" => &self.value,
            fixed => fixed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(keyword_or_identifier("class"), TokenKind::Class);
        assert_eq!(keyword_or_identifier("event"), TokenKind::Event);
        assert_eq!(keyword_or_identifier("classy"), TokenKind::Identifier);
        assert_eq!(keyword_or_identifier("new"), TokenKind::Identifier);
    }

    #[test]
    fn test_operator_runs() {
        assert!(TokenKind::AssignNullish.is_assignment_op());
        assert!(!TokenKind::Or.is_assignment_op());
        assert!(TokenKind::Lt.is_binary_or_compare_op());
        assert!(TokenKind::In.is_binary_or_compare_op());
        assert!(!TokenKind::Not.is_binary_or_compare_op());
        assert!(TokenKind::Typeof.is_operator_before_operand());
        assert!(!TokenKind::Number.is_operator_before_operand());
    }

    #[test]
    fn test_identifier_classes() {
        assert!(TokenKind::From.is_declaration_identifier());
        assert!(!TokenKind::From.is_import_identifier());
        assert!(TokenKind::Return.is_property_identifier());
        assert!(TokenKind::String.is_class_member_identifier());
        assert!(!TokenKind::Class.is_declaration_identifier());
    }
}
