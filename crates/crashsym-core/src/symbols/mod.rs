//! # Symbols
//!
//! Per-module symbol storage built from text map files.
//!
//! A map file is parsed by [`MapFileParser`] into a [`Module`], which holds
//! three tables:
//!
//! - [`FunctionTable`]: `FUNC` records with a size, each owning the `LINE`
//!   records that followed it
//! - [`PublicSymbolTable`]: `PUBLIC` records, which only have a start address
//! - [`FileTable`]: `FILE` id to source path
//!
//! Both address tables are [`AddressRangeIndex`] instances, so every lookup
//! is a floor-query over a sorted tree rather than a scan.

mod demangle;
pub mod module;
pub mod parser;
pub mod range_index;
pub mod tables;

pub use module::Module;
pub use parser::{LoadStats, MapFileParser};
pub use range_index::AddressRangeIndex;
pub use tables::{FileTable, Function, FunctionTable, Line, LineTable, PublicSymbol, PublicSymbolTable};
