use super::GenerateSql;

/// The row-limiting prefix of a select list.
///
/// Each variant renders with its own trailing space so it can be placed
/// directly in front of the column list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowSelection {
    /// No prefix.
    #[default]
    AllRows,
    /// `TOP n `
    Top(u64),
    /// `DISTINCT `
    Distinct,
    /// Several prefixes, rendered in order.
    Composite(Vec<RowSelection>),
}

impl GenerateSql for RowSelection {
    fn generate_sql(&self) -> String {
        match self {
            Self::AllRows => String::new(),
            Self::Top(n) => format!("TOP {n} "),
            Self::Distinct => String::from("DISTINCT "),
            Self::Composite(parts) => parts.iter().map(GenerateSql::generate_sql).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_selection_rendering() {
        assert_eq!(RowSelection::AllRows.generate_sql(), "");
        assert_eq!(RowSelection::Top(10).generate_sql(), "TOP 10 ");
        assert_eq!(
            RowSelection::Composite(vec![RowSelection::Distinct, RowSelection::Top(5)])
                .generate_sql(),
            "DISTINCT TOP 5 "
        );
    }
}
