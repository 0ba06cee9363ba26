//! Property tests for cloning, parameter naming and paging.

mod common;
use common::*;

use docstore_sql_core::ast::{GenerateSql, OrderByField, UnaryOperand, WhereClause};
use docstore_sql_core::statements::{paged_select, paged_select_with_count};
use docstore_sql_core::{Parameter, QueryGenerators, SqlValue};
use proptest::prelude::*;

fn field_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Name", "Total", "Region", "Created"]).prop_map(String::from)
}

proptest! {
    #[test]
    fn clone_renders_identically_and_independently(
        fields in prop::collection::vec(field_name(), 0..6),
        extra in field_name(),
    ) {
        let generators = QueryGenerators::new();
        let mut original = table("Orders");
        for field in &fields {
            let name = generators.parameter_name(field);
            original.add_where(WhereClause::unary(
                field.as_str(),
                UnaryOperand::Equal,
                Parameter::new(name),
            ));
        }
        let before = sql(&original);

        let mut branch = original.clone();
        prop_assert_eq!(sql(&branch), before.clone());

        branch.add_where(WhereClause::is_null(extra.as_str()));
        branch.add_order(OrderByField::descending(extra.as_str()));
        prop_assert_eq!(sql(&original), before);
    }

    #[test]
    fn repeated_fields_get_unique_parameter_names(
        fields in prop::collection::vec(field_name(), 1..12),
    ) {
        let generators = QueryGenerators::new();
        let mut builder = table("Orders");
        for field in &fields {
            let name = generators.parameter_name(field);
            builder.add_where(WhereClause::unary(
                field.as_str(),
                UnaryOperand::GreaterThan,
                Parameter::new(name),
            ));
        }
        let names = placeholders(&sql(&builder));
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(names.len(), fields.len());
        prop_assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn paging_bounds_match_skip_and_take(skip in 0_u64..10_000, take in 1_u64..500) {
        let paged = paged_select(&table("Accounts"), skip, Some(take), &QueryGenerators::new());
        let min = i64::try_from(skip + 1).unwrap();
        let max = i64::try_from(skip + take).unwrap();
        prop_assert_eq!(paged.parameter_values.get("_minrow"), Some(&SqlValue::Int(min)));
        prop_assert_eq!(paged.parameter_values.get("_maxrow"), Some(&SqlValue::Int(max)));

        let sql = paged.statement.generate_sql();
        for name in placeholders(&sql) {
            prop_assert!(paged.parameter_values.contains_key(&name));
        }
    }

    #[test]
    fn page_with_count_binds_the_same_bounds(skip in 0_u64..10_000, take in 1_u64..500) {
        let plain = paged_select(&table("Accounts"), skip, Some(take), &QueryGenerators::new());
        let with_count =
            paged_select_with_count(&table("Accounts"), skip, Some(take), &QueryGenerators::new());
        prop_assert_eq!(plain.parameter_values, with_count.parameter_values);
    }
}
