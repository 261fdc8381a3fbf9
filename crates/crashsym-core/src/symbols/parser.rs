//! # Map File Parser
//!
//! Turns the text output of a symbol-extraction tool into a [`Module`].
//!
//! ## Record Format
//!
//! One record per line, selected by the first token:
//!
//! ```text
//! FILE <id> <name>
//! FUNC <address> <size> <param_size> <name>
//! LINE <address> <size> <line> <file_id>
//! PUBLIC <address> <param_size> <name>
//! ```
//!
//! Addresses, sizes and parameter sizes are hexadecimal; line numbers and
//! file ids are decimal. Names run to the end of the line and may contain
//! spaces. `LINE` records belong to the most recent `FUNC`.
//!
//! Any other tag (`MODULE`, `STACK`, ...) is skipped. A line that has a known
//! tag but doesn't parse is counted as malformed and skipped; one bad line
//! never aborts the load.

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use super::module::Module;
use super::tables::{FileTable, Function, FunctionTable, Line, PublicSymbol, PublicSymbolTable};
use crate::error::{SymbolError, SymbolResult};
use crate::types::Address;

/// Malformed lines past this count are logged at `trace` instead of `warn`.
const MALFORMED_WARN_LIMIT: usize = 16;

/// Counters collected while parsing one map file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats
{
    /// Non-blank lines seen.
    pub lines: usize,
    /// `FILE` records accepted.
    pub files: usize,
    /// `FUNC` records accepted.
    pub functions: usize,
    /// `LINE` records accepted.
    pub line_records: usize,
    /// `PUBLIC` records accepted.
    pub public_symbols: usize,
    /// Lines with a tag this parser doesn't handle.
    pub skipped: usize,
    /// Lines with a known tag that failed to parse.
    pub malformed: usize,
}

impl LoadStats
{
    /// Fraction of non-blank lines that were malformed (0.0 for an empty file).
    #[allow(clippy::cast_precision_loss)]
    pub fn malformed_ratio(&self) -> f64
    {
        if self.lines == 0 {
            0.0
        } else {
            self.malformed as f64 / self.lines as f64
        }
    }
}

/// Streaming parser state for one map file.
pub struct MapFileParser<'a>
{
    module_name: &'a str,
    functions: FunctionTable,
    public_symbols: PublicSymbolTable,
    files: FileTable,
    /// Function that `LINE` records currently attach to. Inserted into
    /// `functions` once the next `FUNC`/`PUBLIC` or the end of input is seen.
    current: Option<Function>,
    stats: LoadStats,
}

impl<'a> MapFileParser<'a>
{
    pub fn new(module_name: &'a str) -> Self
    {
        Self {
            module_name,
            functions: FunctionTable::default(),
            public_symbols: PublicSymbolTable::default(),
            files: FileTable::default(),
            current: None,
            stats: LoadStats::default(),
        }
    }

    /// Parse a whole buffer into a module.
    ///
    /// Bytes that aren't valid UTF-8 are replaced rather than rejected, so a
    /// stray byte in one name only affects that name.
    pub fn parse(module_name: &'a str, buffer: &[u8]) -> Module
    {
        let mut parser = Self::new(module_name);
        let text = String::from_utf8_lossy(buffer);
        for (index, line) in text.split('\n').enumerate() {
            parser.feed_line(index + 1, line);
        }
        parser.finish()
    }

    /// Handle one line. `line_number` is 1-based and only used for reporting.
    pub fn feed_line(&mut self, line_number: usize, line: &str)
    {
        let line = line.trim_end_matches('\r').trim();
        if line.is_empty() {
            return;
        }
        self.stats.lines += 1;

        if let Err(err) = self.parse_record(line_number, line) {
            self.stats.malformed += 1;
            if self.stats.malformed <= MALFORMED_WARN_LIMIT {
                warn!(module = self.module_name, error = %err, "skipping map file line");
            } else {
                trace!(module = self.module_name, error = %err, "skipping map file line");
            }
        }
    }

    /// Flush the pending function and build the module.
    pub fn finish(mut self) -> Module
    {
        self.flush_current();
        if self.stats.malformed > MALFORMED_WARN_LIMIT {
            warn!(
                module = self.module_name,
                malformed = self.stats.malformed,
                "map file had more malformed lines than were logged"
            );
        }
        debug!(
            module = self.module_name,
            functions = self.stats.functions,
            lines = self.stats.line_records,
            public_symbols = self.stats.public_symbols,
            files = self.stats.files,
            malformed = self.stats.malformed,
            "parsed map file"
        );
        Module::from_parts(
            self.module_name.to_string(),
            self.functions,
            self.public_symbols,
            self.files,
            self.stats,
        )
    }

    fn parse_record(&mut self, line_number: usize, line: &str) -> SymbolResult<()>
    {
        let (tag, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let malformed = |reason: String| SymbolError::MalformedRecord {
            line: line_number,
            reason,
        };

        match tag {
            "FILE" => {
                let (id, name) = parse_file(rest).map_err(malformed)?;
                self.files.insert(id, name.to_string());
                self.stats.files += 1;
            }
            "FUNC" => {
                self.flush_current();
                let function = parse_func(rest).map_err(malformed)?;
                self.current = Some(function);
                self.stats.functions += 1;
            }
            "LINE" => {
                let line = parse_line(rest).map_err(malformed)?;
                let function = self
                    .current
                    .as_mut()
                    .ok_or_else(|| malformed("LINE record outside of a FUNC".to_string()))?;
                function.lines.insert(line.address, line);
                self.stats.line_records += 1;
            }
            "PUBLIC" => {
                self.flush_current();
                let symbol = parse_public(rest).map_err(malformed)?;
                self.public_symbols.insert(symbol);
                self.stats.public_symbols += 1;
            }
            _ => {
                self.stats.skipped += 1;
            }
        }

        Ok(())
    }

    fn flush_current(&mut self)
    {
        if let Some(function) = self.current.take() {
            if let Some(previous) = self.functions.insert(function) {
                trace!(
                    module = self.module_name,
                    address = %previous.address,
                    name = %previous.name,
                    "FUNC redefined, keeping the later record"
                );
            }
        }
    }
}

type Fields<'a> = SmallVec<[&'a str; 4]>;

/// Split `count` whitespace-delimited fields off the front of `text`.
///
/// Returns the fields and whatever remains, trimmed.
fn take_fields(text: &str, count: usize) -> Result<(Fields<'_>, &str), String>
{
    let mut fields = Fields::new();
    let mut rest = text.trim_start();
    while fields.len() < count {
        if rest.is_empty() {
            return Err(format!("expected {count} fields, found {}", fields.len()));
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        fields.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    Ok((fields, rest.trim_end()))
}

/// `count` fields followed by a non-empty name.
fn take_fields_and_name(text: &str, count: usize) -> Result<(Fields<'_>, &str), String>
{
    let (fields, name) = take_fields(text, count)?;
    if name.is_empty() {
        return Err("missing name".to_string());
    }
    Ok((fields, name))
}

fn hex_u64(field: &str, what: &str) -> Result<u64, String>
{
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("invalid {what} {field:?}"));
    }
    u64::from_str_radix(digits, 16).map_err(|err| format!("invalid {what} {field:?}: {err}"))
}

fn hex_u32(field: &str, what: &str) -> Result<u32, String>
{
    let value = hex_u64(field, what)?;
    u32::try_from(value).map_err(|_| format!("{what} {field:?} out of range"))
}

fn decimal_u32(field: &str, what: &str) -> Result<u32, String>
{
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid {what} {field:?}"));
    }
    field.parse().map_err(|err| format!("invalid {what} {field:?}: {err}"))
}

/// `FILE <id> <name>`
fn parse_file(rest: &str) -> Result<(u32, &str), String>
{
    let (fields, name) = take_fields_and_name(rest, 1)?;
    Ok((decimal_u32(fields[0], "file id")?, name))
}

/// `FUNC <address> <size> <param_size> <name>`
fn parse_func(rest: &str) -> Result<Function, String>
{
    let (fields, name) = take_fields_and_name(rest, 3)?;
    Ok(Function::new(
        Address::new(hex_u64(fields[0], "address")?),
        hex_u64(fields[1], "size")?,
        hex_u32(fields[2], "parameter size")?,
        name.to_string(),
    ))
}

/// `LINE <address> <size> <line> <file_id>`
fn parse_line(rest: &str) -> Result<Line, String>
{
    let (fields, trailing) = take_fields(rest, 4)?;
    if !trailing.is_empty() {
        return Err(format!("unexpected trailing data {trailing:?}"));
    }
    Ok(Line {
        address: Address::new(hex_u64(fields[0], "address")?),
        size: hex_u64(fields[1], "size")?,
        line: decimal_u32(fields[2], "line number")?,
        file_id: decimal_u32(fields[3], "file id")?,
    })
}

/// `PUBLIC <address> <param_size> <name>`
fn parse_public(rest: &str) -> Result<PublicSymbol, String>
{
    let (fields, name) = take_fields_and_name(rest, 2)?;
    Ok(PublicSymbol {
        address: Address::new(hex_u64(fields[0], "address")?),
        parameter_size: hex_u32(fields[1], "parameter size")?,
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn parse(text: &str) -> Module
    {
        MapFileParser::parse("test.so", text.as_bytes())
    }

    #[test]
    fn test_take_fields_keeps_spaces_in_name()
    {
        let (fields, name) = take_fields_and_name("1000 10 4 foo(int, char*) const", 3).unwrap();
        assert_eq!(fields.as_slice(), &["1000", "10", "4"]);
        assert_eq!(name, "foo(int, char*) const");
    }

    #[test]
    fn test_take_fields_reports_missing()
    {
        let err = take_fields("1000 10", 4).unwrap_err();
        assert!(err.contains("expected 4 fields, found 2"), "{err}");
    }

    #[test]
    fn test_hex_and_decimal_fields()
    {
        assert_eq!(hex_u64("1f", "x"), Ok(0x1f));
        assert_eq!(hex_u64("0x1F", "x"), Ok(0x1f));
        assert!(hex_u64("+1f", "x").is_err());
        assert!(hex_u64("0x", "x").is_err());
        assert!(hex_u64("12345678901234567", "x").is_err());
        assert!(hex_u32("100000000", "x").is_err());
        assert_eq!(decimal_u32("42", "x"), Ok(42));
        assert!(decimal_u32("0x2a", "x").is_err());
        assert!(decimal_u32("-1", "x").is_err());
    }

    #[test]
    fn test_parse_all_record_kinds()
    {
        let module = parse(
            "MODULE Linux x86_64 0123456789ABCDEF0 test.so\n\
             FILE 1 src/a.c\n\
             FILE 2 src/dir with space/b.c\n\
             FUNC 1000 10 4 foo\n\
             LINE 1000 5 42 1\n\
             LINE 1005 5 43 2\n\
             PUBLIC 2000 8 bar\n\
             STACK WIN 4 1000 10 0 0 4 0 0 0 0 0\n",
        );

        let stats = module.stats();
        assert_eq!(stats.lines, 8);
        assert_eq!(stats.files, 2);
        assert_eq!(stats.functions, 1);
        assert_eq!(stats.line_records, 2);
        assert_eq!(stats.public_symbols, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.malformed, 0);

        assert_eq!(module.files().name(2), Some("src/dir with space/b.c"));
        let foo = module.functions().find(Address::new(0x1000)).unwrap();
        assert_eq!(foo.parameter_size, 4);
        assert_eq!(foo.lines.len(), 2);
        assert_eq!(module.public_symbols().find(Address::new(0x2000)).unwrap().parameter_size, 8);
    }

    #[test]
    fn test_crlf_and_blank_lines()
    {
        let module = parse("FILE 1 a.c\r\n\r\n\nFUNC 1000 10 0 foo\r\nLINE 1000 10 7 1\r\n");
        assert_eq!(module.stats().lines, 3);
        assert_eq!(module.stats().malformed, 0);
        assert_eq!(module.files().name(1), Some("a.c"));
        assert_eq!(module.functions().find(Address::new(0x1000)).unwrap().name, "foo");
    }

    #[test]
    fn test_line_before_any_func_is_malformed()
    {
        let module = parse("LINE 1000 5 42 1\nFUNC 1000 10 0 foo\n");
        assert_eq!(module.stats().malformed, 1);
        assert_eq!(module.stats().line_records, 0);
        assert!(module.functions().find(Address::new(0x1000)).unwrap().lines.is_empty());
    }

    #[test]
    fn test_public_ends_current_function()
    {
        let module = parse("FUNC 1000 10 0 foo\nPUBLIC 3000 0 bar\nLINE 1000 5 42 1\n");
        assert_eq!(module.stats().malformed, 1);
        assert!(module.functions().find(Address::new(0x1000)).unwrap().lines.is_empty());
    }

    #[test]
    fn test_malformed_lines_are_counted_and_skipped()
    {
        let module = parse(
            "FUNC 1000 10 0 foo\n\
             LINE 1000 5 42\n\
             LINE 1005 zz 43 1\n\
             LINE 1005 5 43 1 extra\n\
             LINE 1008 8 44 1\n\
             FUNC 2000 10 0\n\
             FILE x a.c\n\
             PUBLIC 3000\n\
             LINE 1008 8 45 1\n",
        );

        let stats = module.stats();
        assert_eq!(stats.malformed, 7);
        assert_eq!(stats.functions, 1);
        assert_eq!(stats.line_records, 1);
        let foo = module.functions().find(Address::new(0x1008)).unwrap();
        assert_eq!(foo.line_for(Address::new(0x1009)).unwrap().line, 44);
        assert!(module.functions().find(Address::new(0x2000)).is_none());
    }

    #[test]
    fn test_bad_func_ends_previous_function()
    {
        let module = parse("FILE 1 a.c\nFUNC 1000 100 0 foo\nFUNC 1050 zz 0 bar\nLINE 1050 10 99 1\n");
        let stats = module.stats();
        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.line_records, 0);

        let info = module.symbol_info(Address::new(0x1055)).unwrap();
        assert_eq!(info.function_name.to_string(), "foo");
        assert_eq!(info.source_line, None);
        assert_eq!(info.source_file, None);
    }

    #[test]
    fn test_bad_public_ends_previous_function()
    {
        let module = parse("FUNC 1000 10 0 foo\nPUBLIC zz 0 bar\nLINE 1000 5 42 1\n");
        assert_eq!(module.stats().malformed, 2);
        assert!(module.functions().find(Address::new(0x1000)).unwrap().lines.is_empty());
    }

    #[test]
    fn test_duplicate_func_later_wins()
    {
        let module = parse("FUNC 1000 10 0 first\nFUNC 1000 20 0 second\n");
        assert_eq!(module.functions().len(), 1);
        let function = module.functions().find(Address::new(0x1018)).unwrap();
        assert_eq!(function.name, "second");
    }

    #[test]
    fn test_unsorted_input()
    {
        let module = parse("FUNC 3000 10 0 c\nFUNC 1000 10 0 a\nFUNC 2000 10 0 b\n");
        let names: Vec<&str> = module.functions().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced()
    {
        let mut buffer = b"FUNC 1000 10 0 bad".to_vec();
        buffer.push(0xff);
        buffer.extend_from_slice(b"name\n");
        let module = MapFileParser::parse("test.so", &buffer);
        assert_eq!(module.stats().malformed, 0);
        assert_eq!(module.functions().find(Address::new(0x1000)).unwrap().name, "bad\u{fffd}name");
    }

    #[test]
    fn test_malformed_ratio()
    {
        assert!((LoadStats::default().malformed_ratio() - 0.0).abs() < f64::EPSILON);
        let stats = LoadStats {
            lines: 4,
            malformed: 1,
            ..LoadStats::default()
        };
        assert!((stats.malformed_ratio() - 0.25).abs() < f64::EPSILON);
    }
}
