//! Query hints: `OPTION (...)`.

use super::GenerateSql;

/// A single query hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionClause {
    /// `RECOMPILE`
    Recompile,
    /// `OPTIMIZE FOR UNKNOWN`
    OptimizeForUnknown,
    /// `MAXDOP n`
    MaxDop(u32),
    /// `FAST n`
    Fast(u32),
    /// `HASH JOIN`
    HashJoin,
    /// `LOOP JOIN`
    LoopJoin,
    /// `MERGE JOIN`
    MergeJoin,
    /// `FORCE ORDER`
    ForceOrder,
    /// Any other hint, verbatim.
    Custom(String),
}

impl GenerateSql for OptionClause {
    fn generate_sql(&self) -> String {
        match self {
            Self::Recompile => String::from("RECOMPILE"),
            Self::OptimizeForUnknown => String::from("OPTIMIZE FOR UNKNOWN"),
            Self::MaxDop(n) => format!("MAXDOP {n}"),
            Self::Fast(n) => format!("FAST {n}"),
            Self::HashJoin => String::from("HASH JOIN"),
            Self::LoopJoin => String::from("LOOP JOIN"),
            Self::MergeJoin => String::from("MERGE JOIN"),
            Self::ForceOrder => String::from("FORCE ORDER"),
            Self::Custom(hint) => hint.clone(),
        }
    }
}

/// `\nOPTION (A, B)`; empty when no hints are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionClauses(Vec<OptionClause>);

impl OptionClauses {
    /// Creates a hint list.
    #[must_use]
    pub const fn new(clauses: Vec<OptionClause>) -> Self {
        Self(clauses)
    }

    /// Returns whether no hints are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl GenerateSql for OptionClauses {
    fn generate_sql(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let hints: Vec<String> = self.0.iter().map(GenerateSql::generate_sql).collect();
        format!("\nOPTION ({})", hints.join(", "))
    }
}
