use std::fmt;

/// A single operation line failed to decode into an opcode.
///
/// Kept separate from [`CompileError`] because the decoder doesn't know its
/// own line number or the label bound to it — the pass-2 driver wraps one
/// of these into a `CompileError` once it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub info: &'static str,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info)
    }
}

impl std::error::Error for DecodeError {}

/// A compile-time failure, carrying the context spec §6 requires the CLI to
/// print: `"<info>\nLine: <n>, Symbol: <sym>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub line_no: usize,
    pub symbol: String,
    pub info: String,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\nLine: {}, Symbol: {}", self.info, self.line_no, self.symbol)
    }
}

impl std::error::Error for CompileError {}
