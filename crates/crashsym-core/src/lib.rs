//! # crashsym-core
//!
//! Symbol store and address resolution for crash stack symbolication.
//!
//! This crate turns raw instruction addresses from a crashed process's stack
//! into function names and source lines, using text map files produced by an
//! external symbol-extraction tool. It provides:
//! - A tolerant map file parser (`FILE`, `FUNC`, `LINE`, `PUBLIC` records)
//! - Per-module function, line, public symbol and file tables with
//!   `O(log n)` floor lookups
//! - A resolver that owns every loaded module and fills in stack frames
//!
//! ## Example
//!
//! ```rust
//! use crashsym_core::{Address, BasicSourceLineResolver, SourceLineResolver, StackFrame};
//!
//! let mut resolver = BasicSourceLineResolver::new();
//! resolver.load_module_from_buffer(
//!     "app",
//!     b"FILE 1 a.c\nFUNC 1000 10 4 foo\nLINE 1000 5 42 1\nLINE 1005 5 43 1\n",
//! )?;
//!
//! let mut frame = StackFrame::new("app", Address::new(0x1007));
//! let info = resolver.fill_source_line_info(&mut frame)?;
//! assert_eq!(info.function_name.to_string(), "foo");
//! assert_eq!(info.source_line, Some(43));
//! assert_eq!(info.offset, 2);
//! # Ok::<(), crashsym_core::SymbolError>(())
//! ```

pub mod config;
pub mod error;
pub mod prelude;
pub mod resolver;
pub mod symbols;
pub mod types;

pub use config::ResolverOptions;
pub use error::{SymbolError, SymbolResult};
pub use resolver::{BasicSourceLineResolver, SourceLineResolver};
pub use symbols::{LoadStats, Module};
pub use types::{Address, SourceLineInfo, StackFrame, SymbolKind};
