//! Output sink the parser writes generated code into.

/// Destination for generated code.
///
/// The parser emits as it parses, so anything that can append text can
/// receive a transform: an in-memory `String`, a buffer that counts lines,
/// a test recorder.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

impl OutputSink for String {
    #[inline]
    fn emit(&mut self, text: &str) {
        self.push_str(text);
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    #[inline]
    fn emit(&mut self, text: &str) {
        (**self).emit(text);
    }
}

/// How token trivia reaches the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaMode {
    /// Whitespace and comments are copied as scanned.
    Verbatim,
    /// Only line breaks survive; used while synthesizing rewritten
    /// constructs so line numbers stay aligned with the source.
    NewlinesOnly,
}

impl TriviaMode {
    pub fn apply<'a>(self, trivia: &'a str) -> std::borrow::Cow<'a, str> {
        match self {
            TriviaMode::Verbatim => std::borrow::Cow::Borrowed(trivia),
            TriviaMode::NewlinesOnly => {
                let n = trivia.bytes().filter(|&b| b == b'\n').count();
                std::borrow::Cow::Owned("\n".repeat(n))
            }
        }
    }
}
