//! Symbols for one loaded module and the address lookup over them.

use tracing::trace;

use super::demangle::make_symbol_name;
use super::parser::LoadStats;
use super::tables::{FileTable, FunctionTable, PublicSymbolTable};
use crate::error::{SymbolError, SymbolResult};
use crate::types::{Address, SourceLineInfo, SymbolKind};

/// One binary's symbol table, immutable once parsed.
#[derive(Debug, Clone)]
pub struct Module
{
    name: String,
    functions: FunctionTable,
    public_symbols: PublicSymbolTable,
    files: FileTable,
    stats: LoadStats,
}

impl Module
{
    pub(crate) fn from_parts(
        name: String,
        functions: FunctionTable,
        public_symbols: PublicSymbolTable,
        files: FileTable,
        stats: LoadStats,
    ) -> Self
    {
        Self {
            name,
            functions,
            public_symbols,
            files,
            stats,
        }
    }

    /// Name the module was loaded under.
    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn functions(&self) -> &FunctionTable
    {
        &self.functions
    }

    pub fn public_symbols(&self) -> &PublicSymbolTable
    {
        &self.public_symbols
    }

    pub fn files(&self) -> &FileTable
    {
        &self.files
    }

    /// Counters from parsing this module's map file.
    pub fn stats(&self) -> LoadStats
    {
        self.stats
    }

    /// Resolve `address` to the best symbol this module knows about.
    ///
    /// ## Precedence
    ///
    /// 1. A `FUNC` whose extent covers the address, refined by the `LINE`
    ///    covering it when there is one.
    /// 2. Otherwise the nearest `PUBLIC` at or below the address, at any
    ///    distance.
    ///
    /// A function always wins over a public symbol, even one that starts
    /// closer to the address.
    ///
    /// ## Errors
    ///
    /// `AddressUnresolved` if neither table has a candidate.
    pub fn symbol_info(&self, address: Address) -> SymbolResult<SourceLineInfo>
    {
        if let Some(function) = self.functions.find(address) {
            let info = match function.line_for(address) {
                Some(line) => {
                    let source_file = self.files.name(line.file_id).map(str::to_string);
                    if source_file.is_none() {
                        trace!(module = %self.name, file_id = line.file_id, "LINE refers to unknown FILE");
                    }
                    SourceLineInfo {
                        kind: SymbolKind::Function,
                        function_name: make_symbol_name(&function.name),
                        function_base: function.address,
                        source_file,
                        source_line: Some(line.line),
                        source_line_base: Some(line.address),
                        offset: distance(address, line.address),
                        parameter_size: function.parameter_size,
                    }
                }
                None => SourceLineInfo {
                    kind: SymbolKind::Function,
                    function_name: make_symbol_name(&function.name),
                    function_base: function.address,
                    source_file: None,
                    source_line: None,
                    source_line_base: None,
                    offset: distance(address, function.address),
                    parameter_size: function.parameter_size,
                },
            };
            return Ok(info);
        }

        if let Some(symbol) = self.public_symbols.find(address) {
            trace!(module = %self.name, %address, name = %symbol.name, "resolved via PUBLIC");
            return Ok(SourceLineInfo {
                kind: SymbolKind::PublicSymbol,
                function_name: make_symbol_name(&symbol.name),
                function_base: symbol.address,
                source_file: None,
                source_line: None,
                source_line_base: None,
                offset: distance(address, symbol.address),
                parameter_size: symbol.parameter_size,
            });
        }

        Err(SymbolError::AddressUnresolved {
            module: self.name.clone(),
            address,
        })
    }
}

/// Offset of `address` from a record start that a floor-query returned, so
/// `base <= address` always holds.
fn distance(address: Address, base: Address) -> u64
{
    address.offset_from(base).unwrap_or_default()
}
