//! # Source Line Resolver
//!
//! Maps `(module, address)` pairs from a captured stack to function names and
//! source lines.
//!
//! ## Why use a trait?
//!
//! Stack walkers only need the four operations on [`SourceLineResolver`].
//! Keeping them behind a trait lets a walker be tested against a fake
//! resolver, and leaves room for resolvers backed by other storage.
//!
//! ## Lifecycle
//!
//! 1. Create a resolver: `BasicSourceLineResolver::new()`
//! 2. Load symbols: `load_module(name, path)` once per module
//! 3. Resolve frames: `fill_source_line_info(&mut frame)`
//!
//! Loading takes `&mut self` and resolving takes `&self`, so the borrow checker
//! already enforces "one writer or many readers". Share a fully loaded
//! resolver across threads behind an `Arc`, or wrap it in a `RwLock` to keep
//! loading while others resolve.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info, trace, warn};

use crate::config::ResolverOptions;
use crate::error::{SymbolError, SymbolResult};
use crate::symbols::{LoadStats, MapFileParser, Module};
use crate::types::{SourceLineInfo, StackFrame};

/// Operations a stack walker needs from a symbol source.
pub trait SourceLineResolver
{
    /// Read the map file at `map_file` and load it as `module_name`.
    ///
    /// ## Errors
    ///
    /// - `Io`: the file couldn't be read
    /// - everything [`load_module_from_buffer`](Self::load_module_from_buffer) returns
    fn load_module(&mut self, module_name: &str, map_file: &Path) -> SymbolResult<LoadStats>;

    /// Parse `map_buffer` and load it as `module_name`.
    ///
    /// Malformed lines are skipped and counted in the returned stats; they
    /// don't fail the load. An empty buffer loads an empty module.
    ///
    /// ## Errors
    ///
    /// - `ModuleAlreadyLoaded`: `module_name` is taken; the loaded module is
    ///   left untouched and `map_buffer` is discarded
    /// - `TooManyMalformedLines`: only with a configured threshold
    fn load_module_from_buffer(&mut self, module_name: &str, map_buffer: &[u8]) -> SymbolResult<LoadStats>;

    /// Returns `true` if symbols for `module_name` are loaded.
    fn has_module(&self, module_name: &str) -> bool;

    /// Resolve `frame.instruction` inside `frame.module_name`.
    ///
    /// On success the result is stored in `frame.source` and also returned.
    /// On failure `frame` is left unchanged.
    ///
    /// ## Errors
    ///
    /// - `ModuleNotLoaded`: no symbols for the frame's module
    /// - `AddressUnresolved`: the module has no symbol at or below the address
    fn fill_source_line_info(&self, frame: &mut StackFrame) -> SymbolResult<SourceLineInfo>;
}

/// Resolver that keeps every loaded module in memory.
#[derive(Debug, Default)]
pub struct BasicSourceLineResolver
{
    modules: HashMap<String, Module>,
    options: ResolverOptions,
}

impl BasicSourceLineResolver
{
    /// Create a resolver with default options.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Create a resolver with explicit options.
    pub fn with_options(options: ResolverOptions) -> Self
    {
        Self {
            modules: HashMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &ResolverOptions
    {
        &self.options
    }

    /// Loaded module by name.
    pub fn module(&self, module_name: &str) -> Option<&Module>
    {
        self.modules.get(module_name)
    }

    /// Names of every loaded module, in no particular order.
    pub fn module_names(&self) -> impl Iterator<Item = &str>
    {
        self.modules.keys().map(String::as_str)
    }

    /// Drop the symbols for `module_name`.
    ///
    /// Returns `false` if it wasn't loaded. This is the only way to replace a
    /// module's symbols.
    pub fn unload_module(&mut self, module_name: &str) -> bool
    {
        let removed = self.modules.remove(module_name).is_some();
        if removed {
            debug!(module = module_name, "unloaded module");
        }
        removed
    }

    fn check_malformed_ratio(&self, module: &Module) -> SymbolResult<()>
    {
        let Some(limit) = self.options.max_malformed_ratio() else {
            return Ok(());
        };
        let stats = module.stats();
        if stats.malformed_ratio() > limit {
            return Err(SymbolError::TooManyMalformedLines {
                module: module.name().to_string(),
                malformed: stats.malformed,
                total: stats.lines,
            });
        }
        Ok(())
    }
}

impl SourceLineResolver for BasicSourceLineResolver
{
    fn load_module(&mut self, module_name: &str, map_file: &Path) -> SymbolResult<LoadStats>
    {
        // Checked before reading so a rejected reload doesn't touch the disk.
        if self.has_module(module_name) {
            warn!(module = module_name, "symbols for module already loaded");
            return Err(SymbolError::ModuleAlreadyLoaded(module_name.to_string()));
        }

        info!(module = module_name, path = %map_file.display(), "loading symbols");
        let buffer = fs::read(map_file).map_err(|source| SymbolError::Io {
            path: map_file.to_path_buf(),
            source,
        })?;
        self.load_module_from_buffer(module_name, &buffer)
    }

    fn load_module_from_buffer(&mut self, module_name: &str, map_buffer: &[u8]) -> SymbolResult<LoadStats>
    {
        if self.has_module(module_name) {
            warn!(module = module_name, "symbols for module already loaded");
            return Err(SymbolError::ModuleAlreadyLoaded(module_name.to_string()));
        }

        let module = MapFileParser::parse(module_name, map_buffer);
        self.check_malformed_ratio(&module)?;

        let stats = module.stats();
        debug!(
            module = module_name,
            functions = module.functions().len(),
            public_symbols = module.public_symbols().len(),
            files = module.files().len(),
            malformed = stats.malformed,
            "loaded module"
        );
        self.modules.insert(module_name.to_string(), module);
        Ok(stats)
    }

    fn has_module(&self, module_name: &str) -> bool
    {
        self.modules.contains_key(module_name)
    }

    fn fill_source_line_info(&self, frame: &mut StackFrame) -> SymbolResult<SourceLineInfo>
    {
        let module = self
            .modules
            .get(&frame.module_name)
            .ok_or_else(|| SymbolError::ModuleNotLoaded(frame.module_name.clone()))?;

        let info = module.symbol_info(frame.instruction)?;
        trace!(
            module = %frame.module_name,
            address = %frame.instruction,
            language = %info.function_name.language(),
            "resolved {}",
            info.function_name
        );
        frame.source = Some(info.clone());
        Ok(info)
    }
}
