//! # Types
//!
//! Value types shared by the symbol store, the resolver and its callers.

pub mod address;
pub mod stack;
pub mod symbols;

// Re-export all public types
pub use address::Address;
pub use stack::{SourceLineInfo, StackFrame, SymbolKind};
pub use symbols::{SymbolLanguage, SymbolName};
