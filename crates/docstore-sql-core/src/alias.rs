//! Table alias and parameter name generation.
//!
//! Generators are owned by whoever builds a query tree and are never
//! process-global, so queries built concurrently on different threads do not
//! influence each other's names.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Prefix of generated table aliases.
pub const GENERATED_ALIAS_PREFIX: &str = "ALIAS_GENERATED_";

/// Generates `ALIAS_GENERATED_1`, `ALIAS_GENERATED_2`, ...
#[derive(Debug, Default)]
pub struct TableAliasGenerator {
    issued: AtomicUsize,
}

impl TableAliasGenerator {
    /// Creates a generator starting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: AtomicUsize::new(0),
        }
    }

    /// Returns the next alias.
    pub fn generate(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{GENERATED_ALIAS_PREFIX}{n}")
    }
}

/// Generates unique parameter names from field names.
///
/// The first request for a field yields its cleaned name (`name`); later
/// requests yield `name_1`, `name_2`, ... in call order.
#[derive(Debug, Default)]
pub struct UniqueParameterNameGenerator {
    issued: Mutex<HashSet<String>>,
}

impl UniqueParameterNameGenerator {
    /// Creates an empty generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a parameter name unique within this generator.
    pub fn generate(&self, field: &str) -> String {
        let base = clean_parameter_name(field);
        let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        if issued.insert(base.clone()) {
            return base;
        }
        let mut suffix = 1_usize;
        loop {
            let candidate = format!("{base}_{suffix}");
            if issued.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Lower-cases a field name and drops characters that cannot appear in a
/// parameter name. `[Order].[Total Price]` becomes `ordertotalprice`.
#[must_use]
pub fn clean_parameter_name(field: &str) -> String {
    let cleaned: String = field
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect();
    if cleaned.is_empty() {
        String::from("p")
    } else {
        cleaned
    }
}

/// The alias and parameter-name generators for one unit of work.
#[derive(Debug, Default)]
pub struct QueryGenerators {
    aliases: TableAliasGenerator,
    parameter_names: UniqueParameterNameGenerator,
}

impl QueryGenerators {
    /// Creates fresh generators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next table alias.
    pub fn alias(&self) -> String {
        self.aliases.generate()
    }

    /// Returns a unique parameter name for `field`.
    pub fn parameter_name(&self, field: &str) -> String {
        self.parameter_names.generate(field)
    }
}
