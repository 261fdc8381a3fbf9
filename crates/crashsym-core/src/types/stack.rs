//! Stack frame and resolution result types.

use std::fmt;

use super::symbols::SymbolName;
use super::Address;

/// Which kind of record produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind
{
    /// A `FUNC` record with a known extent (and possibly line info).
    Function,
    /// A `PUBLIC` record. These have no size, so a large offset means the
    /// match is weak.
    PublicSymbol,
}

/// What the resolver found for one instruction address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLineInfo
{
    /// Record kind the answer came from.
    pub kind: SymbolKind,
    /// Function or public symbol name.
    pub function_name: SymbolName,
    /// Start address of the matched function or public symbol.
    pub function_base: Address,
    /// Source file, when a line record matched and its file id is known.
    pub source_file: Option<String>,
    /// Source line, when a line record matched.
    pub source_line: Option<u32>,
    /// Start address of the matched line record.
    pub source_line_base: Option<Address>,
    /// Byte offset from `source_line_base` if a line matched, otherwise from
    /// `function_base`.
    pub offset: u64,
    /// Stack bytes consumed by the symbol's arguments.
    pub parameter_size: u32,
}

impl fmt::Display for SourceLineInfo
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{} + 0x{:x}", self.function_name, self.offset)?;
        match (&self.source_file, self.source_line) {
            (Some(file), Some(line)) => write!(f, " [{file}:{line}]"),
            (None, Some(line)) => write!(f, " [<unknown file>:{line}]"),
            _ => Ok(()),
        }
    }
}

/// One frame of a captured call stack.
///
/// The stack walker fills in `module_name` and `instruction`; the resolver
/// fills in `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame
{
    /// Name the module's symbols were loaded under.
    pub module_name: String,
    /// Module-relative instruction address.
    pub instruction: Address,
    /// Resolution result, once `fill_source_line_info` succeeded.
    pub source: Option<SourceLineInfo>,
}

impl StackFrame
{
    /// Frame that has not been resolved yet.
    pub fn new(module_name: impl Into<String>, instruction: Address) -> Self
    {
        Self {
            module_name: module_name.into(),
            instruction,
            source: None,
        }
    }

    /// Returns `true` once the resolver has filled in a source location.
    pub fn is_resolved(&self) -> bool
    {
        self.source.is_some()
    }
}
