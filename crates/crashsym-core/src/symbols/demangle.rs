//! Symbol demangling utilities.
//!
//! Extraction tools usually demangle names before writing the map file, but
//! some symbols come through in their linkage form. This module turns a name
//! from a `FUNC`/`PUBLIC` record into a [`SymbolName`] so callers get a
//! readable name either way.
//!
//! ## Language Detection
//!
//! - Rust symbols: accepted by `rustc_demangle` (legacy `_ZN...E` or v0 `_R`)
//! - C++ symbols: other `_Z` names (Itanium mangling), or already demangled
//!   signatures that carry a parameter list such as `Foo::Bar(int) const`
//! - Everything else: Unknown

use cpp_demangle::{BorrowedSymbol, DemangleOptions};
use rustc_demangle::try_demangle;

use crate::types::{SymbolLanguage, SymbolName};

/// Create a `SymbolName` from a name as written in the map file.
///
/// `rustc_demangle` handles both the legacy (`_ZN...E`) and v0 (`_R...`)
/// schemes. The alternate format drops the trailing hash of legacy symbols.
pub(crate) fn make_symbol_name(raw: &str) -> SymbolName
{
    if let Ok(demangled) = try_demangle(raw) {
        return SymbolName::new(raw.to_string(), Some(format!("{demangled:#}")), SymbolLanguage::Rust);
    }

    if raw.starts_with("_R") {
        return SymbolName::new(raw.to_string(), None, SymbolLanguage::Rust);
    }

    if raw.starts_with("_Z") {
        return SymbolName::new(raw.to_string(), demangle_cpp(raw), SymbolLanguage::Cpp);
    }

    let language = if raw.contains("::") && raw.contains('(') {
        SymbolLanguage::Cpp
    } else {
        SymbolLanguage::Unknown
    };
    SymbolName::new(raw.to_string(), None, language)
}

fn demangle_cpp(raw: &str) -> Option<String>
{
    let symbol = BorrowedSymbol::new(raw.as_bytes()).ok()?;
    symbol.demangle(&DemangleOptions::default()).ok()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_plain_name_is_kept()
    {
        let name = make_symbol_name("main");
        assert_eq!(name.raw(), "main");
        assert_eq!(name.demangled(), None);
        assert_eq!(name.display_name(), "main");
        assert_eq!(name.language(), SymbolLanguage::Unknown);
    }

    #[test]
    fn test_legacy_rust_symbol_is_demangled()
    {
        let name = make_symbol_name("_ZN4core3fmt5write17h0123456789abcdefE");
        assert_eq!(name.display_name(), "core::fmt::write");
        assert_eq!(name.language(), SymbolLanguage::Rust);
    }

    #[test]
    fn test_itanium_symbol_is_demangled()
    {
        let name = make_symbol_name("_ZN3foo3barEv");
        assert_eq!(name.language(), SymbolLanguage::Cpp);
        assert_eq!(name.display_name(), "foo::bar()");
        assert_eq!(name.raw(), "_ZN3foo3barEv");
    }

    #[test]
    fn test_already_demangled_cpp_name()
    {
        let name = make_symbol_name("Foo::Bar(int) const");
        assert_eq!(name.demangled(), None);
        assert_eq!(name.to_string(), "Foo::Bar(int) const");
        assert_eq!(name.language(), SymbolLanguage::Cpp);

        let name = make_symbol_name("std::vector<int>::push_back(int const&)");
        assert_eq!(name.language(), SymbolLanguage::Cpp);
    }

    #[test]
    fn test_unmangled_path_without_params_is_unknown()
    {
        assert_eq!(make_symbol_name("app::main").language(), SymbolLanguage::Unknown);
    }
}
