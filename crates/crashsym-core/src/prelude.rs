//! Common module for library exports

pub use crate::config::ResolverOptions;
pub use crate::error::{SymbolError, SymbolResult};
pub use crate::resolver::{BasicSourceLineResolver, SourceLineResolver};
pub use crate::symbols::{LoadStats, Module};
pub use crate::types::address::Address;
pub use crate::types::stack::{SourceLineInfo, StackFrame, SymbolKind};
pub use crate::types::symbols::{SymbolLanguage, SymbolName};
