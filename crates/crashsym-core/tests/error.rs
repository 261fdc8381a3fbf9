//! Tests for error handling

use std::error::Error;
use std::io;
use std::path::PathBuf;

use crashsym_core::error::{SymbolError, SymbolResult};
use crashsym_core::types::Address;

#[test]
fn test_io_error_display_and_source()
{
    let error = SymbolError::Io {
        path: PathBuf::from("/symbols/app.sym"),
        source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
    };
    let message = format!("{}", error);
    assert!(message.contains("/symbols/app.sym"));
    assert!(message.contains("no such file"));
    assert!(error.source().is_some());
}

#[test]
fn test_module_already_loaded_display()
{
    let error = SymbolError::ModuleAlreadyLoaded("libc.so.6".to_string());
    let message = format!("{}", error);
    assert!(message.contains("libc.so.6"));
    assert!(message.contains("already loaded"));
}

#[test]
fn test_too_many_malformed_display()
{
    let error = SymbolError::TooManyMalformedLines {
        module: "app".to_string(),
        malformed: 7,
        total: 10,
    };
    assert_eq!(format!("{}", error), "Module app: 7 of 10 lines malformed");
}

#[test]
fn test_resolution_errors_are_distinguishable()
{
    let not_loaded = SymbolError::ModuleNotLoaded("app".to_string());
    assert!(not_loaded.is_module_not_loaded());
    assert!(!not_loaded.is_unresolved());
    assert!(format!("{}", not_loaded).contains("not loaded"));

    let unresolved = SymbolError::AddressUnresolved {
        module: "app".to_string(),
        address: Address::new(0x42),
    };
    assert!(unresolved.is_unresolved());
    assert!(!unresolved.is_module_not_loaded());
    assert!(format!("{}", unresolved).contains("0x0000000000000042"));
}

#[test]
fn test_malformed_record_display()
{
    let error = SymbolError::MalformedRecord {
        line: 12,
        reason: "expected 4 fields, found 3".to_string(),
    };
    let message = format!("{}", error);
    assert!(message.contains("line 12"));
    assert!(message.contains("expected 4 fields"));
}

#[test]
fn test_result_type()
{
    fn lookup(found: bool) -> SymbolResult<u32>
    {
        if found {
            Ok(42)
        } else {
            Err(SymbolError::ModuleNotLoaded("app".to_string()))
        }
    }

    assert_eq!(lookup(true).unwrap(), 42);
    assert!(lookup(false).unwrap_err().is_module_not_loaded());
}
