//! Record types and the per-module tables that hold them.

use std::collections::HashMap;

use super::range_index::AddressRangeIndex;
use crate::types::Address;

/// `true` if `address` falls in `[start, start + size)`.
///
/// A zero size means the extent is unknown and the record reaches up to
/// whatever comes next, so any address at or above `start` is covered.
/// Measured as a distance from `start` so a range ending past `u64::MAX`
/// still covers the top address.
fn covers(start: Address, size: u64, address: Address) -> bool
{
    match address.offset_from(start) {
        Some(offset) => size == 0 || offset < size,
        None => false,
    }
}

/// One `LINE` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line
{
    pub address: Address,
    pub size: u64,
    pub file_id: u32,
    pub line: u32,
}

impl Line
{
    pub fn contains(&self, address: Address) -> bool
    {
        covers(self.address, self.size, address)
    }
}

/// Lines of a single function, keyed by start address.
pub type LineTable = AddressRangeIndex<Line>;

/// One `FUNC` record and the `LINE` records that followed it.
#[derive(Debug, Clone)]
pub struct Function
{
    pub address: Address,
    pub size: u64,
    pub parameter_size: u32,
    pub name: String,
    pub lines: LineTable,
}

impl Function
{
    pub fn new(address: Address, size: u64, parameter_size: u32, name: String) -> Self
    {
        Self {
            address,
            size,
            parameter_size,
            name,
            lines: LineTable::new(),
        }
    }

    /// `true` if `address` lies inside the function's recorded extent.
    pub fn contains(&self, address: Address) -> bool
    {
        covers(self.address, self.size, address)
    }

    /// Line record covering `address`, if any.
    ///
    /// Overlapping line ranges resolve to the one that starts closest below
    /// `address`.
    pub fn line_for(&self, address: Address) -> Option<&Line>
    {
        self.lines
            .retrieve(address)
            .map(|(_, line)| line)
            .filter(|line| line.contains(address))
    }
}

/// One `PUBLIC` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicSymbol
{
    pub address: Address,
    pub parameter_size: u32,
    pub name: String,
}

/// Functions of a module, keyed by start address.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable
{
    index: AddressRangeIndex<Function>,
}

impl FunctionTable
{
    pub fn insert(&mut self, function: Function) -> Option<Function>
    {
        self.index.insert(function.address, function)
    }

    /// Function whose extent covers `address`.
    pub fn find(&self, address: Address) -> Option<&Function>
    {
        self.index
            .retrieve(address)
            .map(|(_, function)| function)
            .filter(|function| function.contains(address))
    }

    pub fn len(&self) -> usize
    {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.index.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Function>
    {
        self.index.iter().map(|(_, function)| function)
    }
}

/// Public symbols of a module, keyed by address.
#[derive(Debug, Clone, Default)]
pub struct PublicSymbolTable
{
    index: AddressRangeIndex<PublicSymbol>,
}

impl PublicSymbolTable
{
    pub fn insert(&mut self, symbol: PublicSymbol) -> Option<PublicSymbol>
    {
        self.index.insert(symbol.address, symbol)
    }

    /// Closest public symbol at or below `address`, however far away.
    pub fn find(&self, address: Address) -> Option<&PublicSymbol>
    {
        self.index.retrieve(address).map(|(_, symbol)| symbol)
    }

    pub fn len(&self) -> usize
    {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.index.is_empty()
    }
}

/// Source file names keyed by the id `LINE` records refer to.
#[derive(Debug, Clone, Default)]
pub struct FileTable
{
    names: HashMap<u32, String>,
}

impl FileTable
{
    pub fn insert(&mut self, id: u32, name: String) -> Option<String>
    {
        self.names.insert(id, name)
    }

    pub fn name(&self, id: u32) -> Option<&str>
    {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize
    {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn function(address: u64, size: u64) -> Function
    {
        Function::new(Address::new(address), size, 0, format!("f_{address:x}"))
    }

    fn line(address: u64, size: u64, number: u32) -> Line
    {
        Line {
            address: Address::new(address),
            size,
            file_id: 1,
            line: number,
        }
    }

    #[test]
    fn test_function_extent()
    {
        let f = function(0x1000, 0x10);
        assert!(f.contains(Address::new(0x1000)));
        assert!(f.contains(Address::new(0x100f)));
        assert!(!f.contains(Address::new(0x1010)));
        assert!(!f.contains(Address::new(0xfff)));
    }

    #[test]
    fn test_zero_size_extends_forward()
    {
        let f = function(0x1000, 0);
        assert!(f.contains(Address::new(0x1000)));
        assert!(f.contains(Address::new(0xffff_ffff)));
    }

    #[test]
    fn test_extent_past_top_of_address_space()
    {
        let f = function(u64::MAX - 4, 0x100);
        assert!(f.contains(Address::new(u64::MAX - 1)));
        assert!(f.contains(Address::new(u64::MAX)));
        assert!(!f.contains(Address::new(u64::MAX - 5)));

        let exact = function(u64::MAX - 4, 5);
        assert!(exact.contains(Address::new(u64::MAX)));
    }

    #[test]
    fn test_zero_size_line_extends_forward()
    {
        let mut f = function(0x1000, 0x100);
        f.lines.insert(Address::new(0x1010), line(0x1010, 0, 7));

        assert!(f.line_for(Address::new(0x100f)).is_none());
        assert_eq!(f.line_for(Address::new(0x1010)).map(|l| l.line), Some(7));
        assert_eq!(f.line_for(Address::new(0x10ff)).map(|l| l.line), Some(7));

        // A later line takes over from its own start.
        f.lines.insert(Address::new(0x1080), line(0x1080, 4, 8));
        assert_eq!(f.line_for(Address::new(0x107f)).map(|l| l.line), Some(7));
        assert_eq!(f.line_for(Address::new(0x1082)).map(|l| l.line), Some(8));
    }

    #[test]
    fn test_function_table_gap_between_functions()
    {
        let mut table = FunctionTable::default();
        table.insert(function(0x1000, 0x10));
        table.insert(function(0x2000, 0x10));

        assert_eq!(table.find(Address::new(0x1008)).map(|f| f.address.value()), Some(0x1000));
        assert!(table.find(Address::new(0x1800)).is_none());
        assert_eq!(table.find(Address::new(0x2000)).map(|f| f.address.value()), Some(0x2000));
        assert!(table.find(Address::new(0x2010)).is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_line_for_respects_line_extent()
    {
        let mut f = function(0x1000, 0x20);
        f.lines.insert(Address::new(0x1004), line(0x1004, 4, 10));
        f.lines.insert(Address::new(0x1010), line(0x1010, 4, 12));

        assert!(f.line_for(Address::new(0x1000)).is_none());
        assert_eq!(f.line_for(Address::new(0x1006)).map(|l| l.line), Some(10));
        assert!(f.line_for(Address::new(0x100a)).is_none());
        assert_eq!(f.line_for(Address::new(0x1013)).map(|l| l.line), Some(12));
    }

    #[test]
    fn test_overlapping_lines_prefer_closest_start()
    {
        let mut f = function(0x1000, 0x20);
        f.lines.insert(Address::new(0x1000), line(0x1000, 0x10, 1));
        f.lines.insert(Address::new(0x1004), line(0x1004, 0x2, 2));

        assert_eq!(f.line_for(Address::new(0x1005)).map(|l| l.line), Some(2));
        // Past the inner line: the floor hit no longer covers it.
        assert!(f.line_for(Address::new(0x1008)).is_none());
    }

    #[test]
    fn test_public_symbol_any_distance()
    {
        let mut table = PublicSymbolTable::default();
        table.insert(PublicSymbol {
            address: Address::new(0x1000),
            parameter_size: 0,
            name: "start".to_string(),
        });

        assert!(table.find(Address::new(0xfff)).is_none());
        assert_eq!(table.find(Address::new(0x10_0000)).map(|p| p.name.as_str()), Some("start"));
    }

    #[test]
    fn test_file_table()
    {
        let mut files = FileTable::default();
        assert!(files.is_empty());
        files.insert(3, "src/main.c".to_string());
        assert_eq!(files.name(3), Some("src/main.c"));
        assert_eq!(files.name(4), None);
        assert_eq!(files.insert(3, "other.c".to_string()).as_deref(), Some("src/main.c"));
        assert_eq!(files.len(), 1);
    }
}
