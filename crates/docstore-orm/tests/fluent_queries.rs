//! End-to-end tests for the fluent builder: rendered text, bound values and
//! the commands handed to the executor.

mod common;
use common::*;

use std::time::Duration;

use docstore_orm::{OrmError, QueryType, StoreConfiguration};
use docstore_sql_core::ast::{FieldReference, UnaryOperand};
use docstore_sql_core::SqlValue;
use pretty_assertions::assert_eq;

#[test]
fn take_renders_top() {
    let (session, recorder) = session();
    let accounts = session.query::<Account>().take(100).unwrap();
    assert!(accounts.is_empty());
    assert_eq!(
        recorder.sql(),
        vec!["SELECT TOP 100 *\nFROM [dbo].[Accounts]\nORDER BY [Id]"]
    );
}

#[test]
fn paged_list_binds_row_bounds() {
    let (session, recorder) = session();
    recorder.result_set(vec![account(11, "Kim", 10.0)]);
    let page = session
        .query::<Account>()
        .where_("Region", UnaryOperand::Equal, "EU")
        .to_list_paged(10, 20)
        .unwrap();
    assert_eq!(page.len(), 1);

    let command = &recorder.commands()[0];
    assert_eq!(command.query_type, QueryType::SelectMany);
    assert_eq!(
        command.parameter_values.get("_minrow"),
        Some(&SqlValue::Int(11))
    );
    assert_eq!(
        command.parameter_values.get("_maxrow"),
        Some(&SqlValue::Int(30))
    );
    assert!(command
        .sql
        .contains("ROW_NUMBER() OVER (ORDER BY [Id]) AS RowNum"));
    assert!(command
        .sql
        .ends_with("WHERE ([RowNum] >= @_minrow)\nAND ([RowNum] <= @_maxrow)\nORDER BY [RowNum]"));
}

#[test]
fn any_renders_exists_and_reads_flags() {
    let (session, recorder) = session();
    recorder.scalar(SqlValue::Int(1)).scalar(SqlValue::Int(0));
    let query = session
        .query::<Account>()
        .where_("Region", UnaryOperand::Equal, "EU");
    assert!(query.any().unwrap());
    assert!(!query.any().unwrap());

    let command = &recorder.commands()[0];
    assert_eq!(command.query_type, QueryType::Exists);
    assert_eq!(
        command.sql,
        "IF EXISTS(SELECT *\nFROM [dbo].[Accounts]\nWHERE ([Region] = @region))\n    SELECT @true\nELSE\n    SELECT @false"
    );
    assert_eq!(command.parameter_values.get("true"), Some(&SqlValue::Int(1)));
    assert_eq!(command.parameter_values.get("false"), Some(&SqlValue::Int(0)));
}

#[test]
fn any_rejects_other_scalars() {
    let (session, recorder) = session();
    recorder.scalar(SqlValue::Int(2));
    assert!(matches!(
        session.query::<Account>().any(),
        Err(OrmError::UnexpectedScalar(SqlValue::Int(2)))
    ));
}

#[test]
fn empty_membership_lists_render_literals() {
    let (session, _) = session();
    let none: Vec<i64> = Vec::new();
    let sql = session
        .query::<Account>()
        .where_in("Id", none.clone())
        .where_not_in("Id", none)
        .debug_view_raw_query();
    assert_eq!(
        sql,
        "SELECT *\nFROM [dbo].[Accounts]\nWHERE (0 = 1)\nAND (1 = 1)\nORDER BY [Id]"
    );
}

#[test]
fn count_drops_ordering() {
    let (session, recorder) = session();
    recorder.scalar(SqlValue::Int(12));
    let total = session
        .query::<Account>()
        .where_("Balance", UnaryOperand::GreaterThan, 100.0)
        .order_by_descending("Balance")
        .count()
        .unwrap();
    assert_eq!(total, 12);
    assert_eq!(
        recorder.sql(),
        vec!["SELECT COUNT(*)\nFROM [dbo].[Accounts]\nWHERE ([Balance] > @balance)"]
    );
}

#[test]
fn list_with_count_uses_two_queries_by_default() {
    let (session, recorder) = session();
    recorder.scalar(SqlValue::Int(3));
    recorder.result_set(vec![account(1, "Ada", 5.0), account(2, "Bob", 7.5)]);
    let (page, total) = session
        .query::<Account>()
        .to_list_with_count(0, 2)
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(total, 3);
    let kinds: Vec<_> = recorder
        .commands()
        .iter()
        .map(|command| command.query_type)
        .collect();
    assert_eq!(kinds, vec![QueryType::Count, QueryType::SelectMany]);
}

#[test]
fn cte_list_with_count_reads_total_from_rows() {
    let (session, recorder) =
        session_with(StoreConfiguration::new().with_cte_based_list_with_count(true));
    recorder.result_set(vec![
        account(1, "Ada", 5.0).with("CrossJoinCount", 42_i64),
        account(2, "Bob", 7.5).with("CrossJoinCount", 42_i64),
    ]);
    let (page, total) = session
        .query::<Account>()
        .to_list_with_count(0, 2)
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(total, 42);

    let commands = recorder.commands();
    assert_eq!(commands.len(), 1);
    assert!(commands[0].sql.starts_with("WITH ALIAS_GENERATED_1 AS ("));
    assert!(commands[0].sql.contains("COUNT(*) AS CrossJoinCount"));
}

#[test]
fn cte_list_with_count_orders_by_an_unselected_column() {
    let (session, recorder) =
        session_with(StoreConfiguration::new().with_cte_based_list_with_count(true));
    recorder.result_set(vec![account(1, "Ada", 5.0).with("CrossJoinCount", 1_i64)]);
    let (page, total) = session
        .query::<Account>()
        .column("Name")
        .order_by("Balance")
        .to_list_with_count(0, 10)
        .unwrap();
    assert_eq!((page.len(), total), (1, 1));

    let sql = recorder.sql().remove(0);
    assert!(sql.starts_with(
        "WITH ALIAS_GENERATED_1 AS (\n    SELECT [Name], ROW_NUMBER() OVER (ORDER BY [Balance]) AS RowNum\n    FROM [dbo].[Accounts]\n)\nSELECT *\nFROM ALIAS_GENERATED_1\nCROSS JOIN ("
    ));
}

#[test]
fn cte_list_with_count_counts_an_empty_page() {
    let (session, recorder) =
        session_with(StoreConfiguration::new().with_cte_based_list_with_count(true));
    recorder.scalar(SqlValue::Int(40));
    let (page, total) = session
        .query::<Account>()
        .to_list_with_count(40, 10)
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(total, 40);
    assert_eq!(recorder.commands()[1].query_type, QueryType::Count);
}

#[test]
fn union_renders_bare_until_customized() {
    let (session, _) = session();
    let eu = session
        .query::<Account>()
        .where_("Region", UnaryOperand::Equal, "EU");
    let us = session
        .query::<Account>()
        .where_("Region", UnaryOperand::Equal, "US");
    let union = session.union(eu, us);
    assert_eq!(
        union.debug_view_raw_query(),
        "SELECT *\nFROM [dbo].[Accounts]\nWHERE ([Region] = @region)\nUNION\nSELECT *\nFROM [dbo].[Accounts]\nWHERE ([Region] = @region_1)"
    );
    assert_eq!(union.parameter_values().len(), 2);

    let filtered = union.where_("Balance", UnaryOperand::LessThan, 0);
    let sql = filtered.debug_view_raw_query();
    assert!(sql.starts_with("SELECT *\nFROM (\n"));
    assert!(sql.contains(") ALIAS_GENERATED_1\nWHERE ([Balance] < @balance)"));
}

#[test]
fn join_uses_document_schema() {
    let (session, _) = session();
    let sql = session
        .query::<Account>()
        .alias("a")
        .inner_join(session.query::<Invoice>().alias("i"))
        .on_columns("Id", "AccountId")
        .where_(
            FieldReference::table_column("i", "Amount"),
            UnaryOperand::GreaterThan,
            100,
        )
        .debug_view_raw_query();
    assert!(sql.contains("FROM [dbo].[Accounts] a\nINNER JOIN [billing].[Invoices] i\nON a.[Id] = i.[AccountId]"));
    assert!(sql.contains("WHERE (i.[Amount] > @amount)"));
    assert!(sql.ends_with("ORDER BY a.[Id]"));
}

#[test]
fn load_selects_one_row_by_id() {
    let (session, recorder) = session();
    recorder.result_set(vec![account(7, "Eve", 1.5)]);
    let loaded = session.load::<Account>(7).unwrap();
    assert_eq!(loaded.map(|account| account.name), Some(String::from("Eve")));
    let command = &recorder.commands()[0];
    assert_eq!(
        command.sql,
        "SELECT TOP 1 *\nFROM [dbo].[Accounts]\nWHERE ([Id] = @id)\nORDER BY [Id]"
    );
    assert_eq!(command.query_type, QueryType::SelectSingle);
}

#[test]
fn rendering_is_idempotent() {
    let (session, _) = session();
    let query = session
        .query::<Account>()
        .where_("Name", UnaryOperand::Like, "A%")
        .order_by("Name");
    let first = query.debug_view_raw_query();
    assert_eq!(query.debug_view_raw_query(), first);
    assert_eq!(query.to_command().unwrap().sql, first);
}

#[test]
fn commands_carry_the_configured_timeout() {
    let (session, recorder) =
        session_with(StoreConfiguration::new().with_command_timeout(Duration::from_secs(5)));
    session.query::<Account>().to_list().unwrap();
    assert_eq!(
        recorder.commands()[0].command_timeout,
        Some(Duration::from_secs(5))
    );
}

#[test]
fn dictionary_keys_ignore_case() {
    let (session, recorder) = session();
    recorder.result_set(vec![account(1, "Ada", 1.0), account(2, "ADA", 2.0)]);
    let by_name = session
        .query::<Account>()
        .to_dictionary(|account| account.name.clone())
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name.get("ada").map(|account| account.id), Some(2));
}

#[test]
fn raw_queries_bypass_the_builder() {
    let (session, recorder) = session();
    recorder.result_set(vec![account(9, "Raw", 0.0)]);
    let rows: Vec<Account> = session
        .raw_query(
            "SELECT * FROM [dbo].[Accounts] WHERE [Id] = @id",
            docstore_orm::CommandParameterValues::new().with("id", 9),
        )
        .unwrap();
    assert_eq!(rows[0].id, 9);
    session
        .execute_non_query("DELETE FROM [dbo].[Accounts]", Default::default())
        .unwrap();
    let kinds: Vec<_> = recorder
        .commands()
        .iter()
        .map(|command| command.query_type)
        .collect();
    assert_eq!(kinds, vec![QueryType::SelectMany, QueryType::NonQuery]);
}
