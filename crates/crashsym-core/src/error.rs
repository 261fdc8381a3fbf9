//! # Error Types
//!
//! Error handling for symbol loading and address resolution.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Address;

/// Main error type for symbol operations
///
/// ## Error Categories
///
/// 1. **Load errors**: Io, ModuleAlreadyLoaded, TooManyMalformedLines
/// 2. **Resolution errors**: ModuleNotLoaded, AddressUnresolved
/// 3. **Parse errors**: MalformedRecord (recovered inside the parser, never
///    returned from a load call)
///
/// Resolution errors are expected in normal operation. A caller that gets
/// `ModuleNotLoaded` may try to load symbols for the module and retry, while
/// `AddressUnresolved` means the best it can do is print the raw address.
#[derive(Error, Debug)]
pub enum SymbolError
{
    /// The map file could not be read
    #[error("Failed to read map file {}: {source}", .path.display())]
    Io
    {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A module with this name is already loaded
    ///
    /// The existing module stays authoritative and the new data is discarded.
    /// Call `unload_module` first to replace it.
    #[error("Symbols for module {0} already loaded")]
    ModuleAlreadyLoaded(String),

    /// The map file had more malformed lines than the resolver tolerates
    ///
    /// Only produced when `ResolverOptions::max_malformed_ratio` is set.
    #[error("Module {module}: {malformed} of {total} lines malformed")]
    TooManyMalformedLines
    {
        /// Module that was being loaded
        module: String,
        /// Number of malformed lines
        malformed: usize,
        /// Number of non-blank lines
        total: usize,
    },

    /// Resolution was requested for a module that was never loaded
    #[error("Module not loaded: {0}")]
    ModuleNotLoaded(String),

    /// No function or public symbol covers the address
    #[error("Address {address} not covered by any symbol in {module}")]
    AddressUnresolved
    {
        /// Module that was searched
        module: String,
        /// Address that was looked up
        address: Address,
    },

    /// A single map file line could not be parsed
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord
    {
        /// 1-based line number in the map file
        line: usize,
        /// What was wrong with it
        reason: String,
    },
}

impl SymbolError
{
    /// `true` if the module was never loaded (the caller may load it and retry).
    pub fn is_module_not_loaded(&self) -> bool
    {
        matches!(self, SymbolError::ModuleNotLoaded(_))
    }

    /// `true` if the module is loaded but nothing covers the address.
    pub fn is_unresolved(&self) -> bool
    {
        matches!(self, SymbolError::AddressUnresolved { .. })
    }
}

/// Convenience type alias for `Result<T, SymbolError>`
///
/// ```rust
/// use crashsym_core::error::SymbolResult;
/// fn foo() -> SymbolResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type SymbolResult<T> = std::result::Result<T, SymbolError>;
