//! Translation of [`QueryExpr`] chains into prepared commands.
//!
//! The translator walks the operator chain innermost first and edits one
//! [`SelectBuilder`], then hands it to the same statement shapes the fluent
//! builder uses. Predicates are translated recursively with a `negated`
//! flag so that `!(a == b)` becomes `<>` and `!(a && b)` becomes
//! `!a || !b` instead of a wrapping `NOT (...)`.

use docstore_sql_core::ast::{
    ArrayOperand, FieldReference, GenerateSql, JsonPath, OrderByField, Statement, TableSource,
    UnaryOperand, WhereClause,
};
use docstore_sql_core::statements::{count_select, exists_statement, paged_select};
use docstore_sql_core::{
    CommandParameterValues, Parameter, QueryGenerators, SelectBuilder, SqlValue, ValueKind,
};
use tracing::debug;

use super::expression::{BinaryOperator, Expr, Method, QueryExpr, QueryMethod};
use crate::config::StoreConfiguration;
use crate::error::{OrmError, Result};
use crate::executor::{PreparedCommand, QueryType};
use crate::mapping::DocumentMap;
use crate::query_builder::{
    ensure_bound, normalize_casing, select_builder_for, QuerySource, SourceMetadata,
};

/// Which terminal operator ended the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminal {
    Single,
    Any,
    Count,
}

/// Translates operator chains over one document type.
#[derive(Debug)]
pub struct QueryTranslator<'a> {
    map: DocumentMap,
    configuration: &'a StoreConfiguration,
    generators: &'a QueryGenerators,
}

/// Mutable state of one translation.
struct Translation {
    select: SelectBuilder,
    values: CommandParameterValues,
    skip: u64,
    take: Option<u64>,
    ordered: bool,
    terminal: Option<Terminal>,
}

impl Translation {
    const fn is_paged(&self) -> bool {
        self.skip > 0 || self.take.is_some()
    }
}

impl<'a> QueryTranslator<'a> {
    /// Creates a translator for documents mapped by `map`. Parameter names
    /// and aliases come from `generators`.
    #[must_use]
    pub const fn new(
        map: DocumentMap,
        configuration: &'a StoreConfiguration,
        generators: &'a QueryGenerators,
    ) -> Self {
        Self {
            map,
            configuration,
            generators,
        }
    }

    /// Translates `query` into one command.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::NotSupported`] for operators, orderings or
    /// predicate shapes without a SQL translation.
    /// [`OrmError::UnknownMember`] means a member maps to neither a column
    /// nor a JSON path. [`OrmError::MissingParameterValue`] means a raw
    /// predicate names a placeholder without a value.
    pub fn translate(&self, query: &QueryExpr) -> Result<PreparedCommand> {
        let mut translation = Translation {
            select: self.base_select(),
            values: CommandParameterValues::new(),
            skip: 0,
            take: None,
            ordered: false,
            terminal: None,
        };
        for method in query.methods() {
            if translation.terminal.is_some() {
                return Err(not_supported("operators after First, Any or Count"));
            }
            self.apply(&mut translation, method)?;
        }
        let (statement, query_type) = self.finish(&mut translation);
        let sql = statement.generate_sql();
        ensure_bound(&sql, &translation.values)?;
        debug!(
            table = %self.map.table(),
            query_type = ?query_type,
            sql = %sql,
            "Translated expression query"
        );
        Ok(PreparedCommand::new(sql, translation.values, query_type))
    }

    fn base_select(&self) -> SelectBuilder {
        let schema = self
            .map
            .schema()
            .unwrap_or(&self.configuration.default_schema);
        let source = QuerySource::Table(TableSource::new(
            Some(schema.to_string()),
            self.map.table().to_string(),
        ));
        select_builder_for(
            &source,
            &SourceMetadata::for_document(&self.map, self.configuration),
        )
    }

    fn apply(&self, translation: &mut Translation, method: &QueryMethod) -> Result<()> {
        match method {
            QueryMethod::Where(predicate) => self.filter(translation, predicate),
            QueryMethod::RawWhere(sql, values) => {
                if translation.is_paged() {
                    return Err(not_supported("Where after Skip or Take"));
                }
                translation.values.extend(values.clone());
                let sql = normalize_casing(sql, |name| translation.values.key(name));
                translation.select.add_where(WhereClause::custom(sql));
                Ok(())
            }
            QueryMethod::OrderBy(key) => self.order(translation, key, true, false),
            QueryMethod::OrderByDescending(key) => self.order(translation, key, true, true),
            QueryMethod::ThenBy(key) => self.order(translation, key, false, false),
            QueryMethod::ThenByDescending(key) => self.order(translation, key, false, true),
            QueryMethod::Take(n) => {
                translation.take = Some(translation.take.map_or(*n, |take| take.min(*n)));
                Ok(())
            }
            QueryMethod::Skip(n) => {
                if translation.take.is_some() {
                    return Err(not_supported("Skip after Take"));
                }
                translation.skip = translation.skip.saturating_add(*n);
                Ok(())
            }
            QueryMethod::First(predicate) | QueryMethod::FirstOrDefault(predicate) => {
                self.terminal(translation, predicate.as_ref(), Terminal::Single)
            }
            QueryMethod::Any(predicate) => {
                self.terminal(translation, predicate.as_ref(), Terminal::Any)
            }
            QueryMethod::Count(predicate) => {
                self.terminal(translation, predicate.as_ref(), Terminal::Count)
            }
            QueryMethod::Unsupported(name) => Err(not_supported(name)),
        }
    }

    fn terminal(
        &self,
        translation: &mut Translation,
        predicate: Option<&Expr>,
        terminal: Terminal,
    ) -> Result<()> {
        if terminal != Terminal::Single && translation.is_paged() {
            return Err(not_supported("Any or Count after Skip or Take"));
        }
        if let Some(predicate) = predicate {
            self.filter(translation, predicate)?;
        }
        translation.terminal = Some(terminal);
        Ok(())
    }

    fn filter(&self, translation: &mut Translation, predicate: &Expr) -> Result<()> {
        if translation.is_paged() {
            return Err(not_supported("Where after Skip or Take"));
        }
        // Top-level conjunctions become separate clauses, as chained
        // `where_` calls do.
        let mut conjuncts = Vec::new();
        split_conjunction(predicate, &mut conjuncts);
        for conjunct in conjuncts {
            let clause = self.predicate(translation, conjunct, false)?;
            translation.select.add_where(clause);
        }
        Ok(())
    }

    fn order(
        &self,
        translation: &mut Translation,
        key: &Expr,
        primary: bool,
        descending: bool,
    ) -> Result<()> {
        if translation.is_paged() {
            return Err(not_supported("ordering after Skip or Take"));
        }
        if !primary && !translation.ordered {
            return Err(not_supported("ThenBy without OrderBy"));
        }
        let path = key
            .member_path()
            .ok_or_else(|| not_supported("ordering by anything but a member"))?;
        let field = self.field_for(&path, ValueKind::Null)?;
        if primary {
            translation.select.remove_order_by();
        }
        translation.select.add_order(if descending {
            OrderByField::descending(field)
        } else {
            OrderByField::ascending(field)
        });
        translation.ordered = true;
        Ok(())
    }

    fn finish(&self, translation: &mut Translation) -> (Statement, QueryType) {
        match translation.terminal {
            Some(Terminal::Count) => (
                count_select(&translation.select, self.generators).into(),
                QueryType::Count,
            ),
            Some(Terminal::Any) => {
                let bound = exists_statement(&translation.select);
                translation.values.extend(bound.parameter_values);
                (bound.statement, QueryType::Exists)
            }
            Some(Terminal::Single) => {
                let take = translation.take.map_or(1, |take| take.min(1));
                (self.rows(translation, Some(take)), QueryType::SelectSingle)
            }
            None => {
                let take = translation.take;
                (self.rows(translation, take), QueryType::SelectMany)
            }
        }
    }

    fn rows(&self, translation: &mut Translation, take: Option<u64>) -> Statement {
        if translation.skip > 0 {
            let bound = paged_select(&translation.select, translation.skip, take, self.generators);
            translation.values.extend(bound.parameter_values);
            return bound.statement;
        }
        if let Some(take) = take {
            translation.select.add_top(take);
        }
        translation.select.generate_select().into()
    }

    fn predicate(
        &self,
        translation: &mut Translation,
        expr: &Expr,
        negated: bool,
    ) -> Result<WhereClause> {
        match expr {
            Expr::Not(operand) => self.predicate(translation, operand, !negated),
            Expr::Binary {
                op: op @ (BinaryOperator::AndAlso | BinaryOperator::OrElse),
                left,
                right,
            } => {
                let left = self.predicate(translation, left, negated)?;
                let right = self.predicate(translation, right, negated)?;
                let conjunction = (*op == BinaryOperator::AndAlso) != negated;
                Ok(if conjunction {
                    WhereClause::And(vec![left, right])
                } else {
                    WhereClause::Or(vec![left, right])
                })
            }
            Expr::Binary { op, left, right } if op.is_comparison() => {
                self.comparison(translation, *op, left, right, negated)
            }
            Expr::Member { .. } => {
                let path = member_path(expr)?;
                let field = self.field_for(&path, ValueKind::Bool)?;
                let parameter = self.bind(translation, &field, SqlValue::Bool(!negated));
                Ok(WhereClause::unary(field, UnaryOperand::Equal, parameter))
            }
            Expr::Constant(SqlValue::Bool(value)) => Ok(WhereClause::custom(
                if *value == negated { "0 = 1" } else { "1 = 1" },
            )),
            Expr::Call {
                method,
                target,
                arguments,
            } => self.call(translation, method, target, arguments, negated),
            other => Err(not_supported(&format!("predicate {other:?}"))),
        }
    }

    fn comparison(
        &self,
        translation: &mut Translation,
        op: BinaryOperator,
        left: &Expr,
        right: &Expr,
        negated: bool,
    ) -> Result<WhereClause> {
        let (member, value, op) = match (left, right) {
            (Expr::Member { .. }, Expr::Constant(value)) => (left, value, op),
            (Expr::Constant(value), Expr::Member { .. }) => (right, value, op.flipped()),
            _ => {
                return Err(not_supported(
                    "comparisons other than between a member and a constant",
                ))
            }
        };
        let path = member_path(member)?;
        let field = self.field_for(&path, value.kind())?;
        if value.is_null() {
            let is_null = match op {
                BinaryOperator::Equal => !negated,
                BinaryOperator::NotEqual => negated,
                _ => return Err(not_supported("ordering comparison with null")),
            };
            return Ok(if is_null {
                WhereClause::is_null(field)
            } else {
                WhereClause::is_not_null(field)
            });
        }
        let mut operand = unary_operand(op)?;
        if negated {
            operand = operand.negate();
        }
        let parameter = self.bind(translation, &field, value.clone());
        Ok(WhereClause::unary(field, operand, parameter))
    }

    fn call(
        &self,
        translation: &mut Translation,
        method: &Method,
        target: &Expr,
        arguments: &[Expr],
        negated: bool,
    ) -> Result<WhereClause> {
        let [argument] = arguments else {
            return Err(not_supported("method calls without exactly one argument"));
        };
        match (method, target, argument) {
            (
                Method::StringContains | Method::StartsWith | Method::EndsWith,
                Expr::Member { .. },
                Expr::Constant(SqlValue::Text(text)),
            ) => {
                let path = member_path(target)?;
                let field = self.field_for(&path, ValueKind::Text)?;
                let escaped = escape_like(text);
                let pattern = match method {
                    Method::StartsWith => format!("{escaped}%"),
                    Method::EndsWith => format!("%{escaped}"),
                    _ => format!("%{escaped}%"),
                };
                let operand = if negated {
                    UnaryOperand::NotLike
                } else {
                    UnaryOperand::Like
                };
                let parameter = self.bind(translation, &field, SqlValue::Text(pattern));
                Ok(WhereClause::unary(field, operand, parameter))
            }
            (Method::Contains, Expr::Collection(items), Expr::Member { .. }) => {
                let path = member_path(argument)?;
                let kind = items.first().map_or(ValueKind::Null, SqlValue::kind);
                let field = self.field_for(&path, kind)?;
                let parameters = items
                    .iter()
                    .map(|item| self.bind(translation, &field, item.clone()))
                    .collect();
                let operand = if negated {
                    ArrayOperand::NotIn
                } else {
                    ArrayOperand::In
                };
                Ok(WhereClause::array(field, operand, parameters))
            }
            (Method::Contains, Expr::Member { .. }, Expr::Constant(value)) => {
                let path = member_path(target)?;
                let json = self.json_array_path(&path)?;
                let field = FieldReference::Json(json.clone());
                let parameter = self.bind(translation, &field, value.clone());
                Ok(WhereClause::JsonArrayContains {
                    parameter,
                    path: json,
                    negated,
                })
            }
            (method, _, _) => Err(not_supported(&format!("method {method:?}"))),
        }
    }

    /// Resolves a member path. A single segment naming a mapped property of
    /// a compatible kind is a column; anything else reads the JSON payload.
    fn field_for(&self, path: &[String], kind: ValueKind) -> Result<FieldReference> {
        if let [property] = path {
            if let Some(column) = self.map.resolve_property(property) {
                if column.kind().accepts(kind) {
                    return Ok(FieldReference::column(column.column_name()));
                }
            }
        }
        if self.map.has_json_column() {
            return Ok(FieldReference::Json(JsonPath::new(
                self.configuration.json_column_name.clone(),
                path.to_vec(),
            )));
        }
        Err(self.unknown_member(path))
    }

    /// Collections only live in the JSON payload.
    fn json_array_path(&self, path: &[String]) -> Result<JsonPath> {
        let mapped = matches!(path, [property] if self.map.resolve_property(property).is_some());
        if mapped || !self.map.has_json_column() {
            return Err(self.unknown_member(path));
        }
        Ok(JsonPath::new(
            self.configuration.json_column_name.clone(),
            path.to_vec(),
        ))
    }

    fn unknown_member(&self, path: &[String]) -> OrmError {
        OrmError::UnknownMember {
            table: self.map.table().to_string(),
            member: path.join("."),
        }
    }

    fn bind(
        &self,
        translation: &mut Translation,
        field: &FieldReference,
        value: SqlValue,
    ) -> Parameter {
        let name = self.generators.parameter_name(field.parameter_base_name());
        translation.values.insert(name.clone(), value);
        Parameter::new(name)
    }
}

fn split_conjunction<'e>(expr: &'e Expr, out: &mut Vec<&'e Expr>) {
    match expr {
        Expr::Binary {
            op: BinaryOperator::AndAlso,
            left,
            right,
        } => {
            split_conjunction(left, out);
            split_conjunction(right, out);
        }
        other => out.push(other),
    }
}

fn member_path(expr: &Expr) -> Result<Vec<String>> {
    expr.member_path()
        .ok_or_else(|| not_supported(&format!("member access on {expr:?}")))
}

fn unary_operand(op: BinaryOperator) -> Result<UnaryOperand> {
    Ok(match op {
        BinaryOperator::Equal => UnaryOperand::Equal,
        BinaryOperator::NotEqual => UnaryOperand::NotEqual,
        BinaryOperator::LessThan => UnaryOperand::LessThan,
        BinaryOperator::LessThanOrEqual => UnaryOperand::LessThanOrEqual,
        BinaryOperator::GreaterThan => UnaryOperand::GreaterThan,
        BinaryOperator::GreaterThanOrEqual => UnaryOperand::GreaterThanOrEqual,
        other => return Err(not_supported(&format!("operator {other:?}"))),
    })
}

/// Escapes `LIKE` wildcards so `text` matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '[' => escaped.push_str("[[]"),
            '%' => escaped.push_str("[%]"),
            '_' => escaped.push_str("[_]"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn not_supported(what: &str) -> OrmError {
    OrmError::NotSupported(what.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Document;
    use crate::queryable::expression::{field, value, values};
    use crate::testing::Customer;
    use pretty_assertions::assert_eq;

    fn translate(query: &QueryExpr) -> Result<PreparedCommand> {
        let configuration = StoreConfiguration::new();
        let generators = QueryGenerators::new();
        QueryTranslator::new(Customer::document_map(), &configuration, &generators)
            .translate(query)
    }

    fn filtered(predicate: Expr) -> QueryExpr {
        QueryExpr::Source.then(QueryMethod::Where(predicate))
    }

    #[test]
    fn test_plain_source() {
        let command = translate(&QueryExpr::Source).unwrap();
        assert_eq!(command.sql, "SELECT *\nFROM [dbo].[Customers]\nORDER BY [Id]");
        assert_eq!(command.query_type, QueryType::SelectMany);
    }

    #[test]
    fn test_negated_equality_becomes_not_equal() {
        let command = translate(&filtered(!field("Name").eq("Bob"))).unwrap();
        assert!(command.sql.contains("WHERE ([Name] <> @name)"));
        assert_eq!(
            command.parameter_values.get("name"),
            Some(&SqlValue::Text(String::from("Bob")))
        );
    }

    #[test]
    fn test_de_morgan_through_and() {
        let predicate = !(field("Age").gt(30).and(field("City").eq("Oslo")));
        let command = translate(&filtered(predicate)).unwrap();
        assert!(command
            .sql
            .contains("WHERE (([Age] <= @age) OR ([City] <> @city))"));
    }

    #[test]
    fn test_top_level_conjunction_splits() {
        let predicate = field("Age").ge(18).and(field("Name").ne("Bob"));
        let command = translate(&filtered(predicate)).unwrap();
        assert!(command
            .sql
            .contains("WHERE ([Age] >= @age)\nAND ([Name] <> @name)"));
    }

    #[test]
    fn test_constant_on_the_left_flips() {
        let command = translate(&filtered(value(30).lt(field("Age")))).unwrap();
        assert!(command.sql.contains("WHERE ([Age] > @age)"));
    }

    #[test]
    fn test_null_comparisons() {
        let command = translate(&filtered(field("City").eq(Expr::null()))).unwrap();
        assert!(command.sql.contains("WHERE ([City] IS NULL)"));
        let command = translate(&filtered(!field("City").eq(Expr::null()))).unwrap();
        assert!(command.sql.contains("WHERE ([City] IS NOT NULL)"));
        assert!(command.parameter_values.is_empty());
    }

    #[test]
    fn test_bare_boolean_member() {
        let command = translate(&filtered(!field("IsActive"))).unwrap();
        assert!(command.sql.contains("WHERE ([IsActive] = @isactive)"));
        assert_eq!(
            command.parameter_values.get("isactive"),
            Some(&SqlValue::Bool(false))
        );
    }

    #[test]
    fn test_like_patterns_escape_wildcards() {
        let command = translate(&filtered(field("Name").starts_with("50%_off"))).unwrap();
        assert!(command.sql.contains("WHERE ([Name] LIKE @name)"));
        assert_eq!(
            command.parameter_values.get("name"),
            Some(&SqlValue::Text(String::from("50[%][_]off%")))
        );
        let command = translate(&filtered(!field("Name").contains_text("[a]"))).unwrap();
        assert!(command.sql.contains("WHERE ([Name] NOT LIKE @name)"));
        assert_eq!(
            command.parameter_values.get("name"),
            Some(&SqlValue::Text(String::from("%[[]a]%")))
        );
    }

    #[test]
    fn test_collection_contains_member() {
        let command = translate(&filtered(values([1_i64, 2]).contains(field("Id")))).unwrap();
        assert!(command.sql.contains("WHERE ([Id] IN (@id, @id_1))"));
        let empty: Vec<i64> = Vec::new();
        let command = translate(&filtered(!values(empty).contains(field("Id")))).unwrap();
        assert!(command.sql.contains("WHERE (1 = 1)"));
    }

    #[test]
    fn test_json_member_contains_value() {
        let command = translate(&filtered(field("Tags").contains("red"))).unwrap();
        assert!(command
            .sql
            .contains("WHERE (@tags IN (SELECT [value] FROM OPENJSON([JSON], '$.Tags')))"));
    }

    #[test]
    fn test_unmapped_member_reads_json() {
        let command = translate(&filtered(field("Address.City").eq("Oslo"))).unwrap();
        assert!(command
            .sql
            .contains("WHERE (JSON_VALUE([JSON], '$.Address.City') = @city)"));
    }

    #[test]
    fn test_incompatible_kind_falls_back_to_json() {
        let command = translate(&filtered(field("Age").eq("forty"))).unwrap();
        assert!(command.sql.contains("JSON_VALUE([JSON], '$.Age') = @age"));
    }

    #[test]
    fn test_ordering_and_paging() {
        let query = QueryExpr::Source
            .then(QueryMethod::OrderByDescending(field("Age")))
            .then(QueryMethod::ThenBy(field("Name")))
            .then(QueryMethod::Skip(10))
            .then(QueryMethod::Take(20));
        let command = translate(&query).unwrap();
        assert!(command
            .sql
            .contains("ROW_NUMBER() OVER (ORDER BY [Age] DESC, [Name]) AS RowNum"));
        assert_eq!(command.parameter_values.get("_minrow"), Some(&SqlValue::Int(11)));
        assert_eq!(command.parameter_values.get("_maxrow"), Some(&SqlValue::Int(30)));
    }

    #[test]
    fn test_take_renders_top() {
        let command = translate(&QueryExpr::Source.then(QueryMethod::Take(100))).unwrap();
        assert_eq!(
            command.sql,
            "SELECT TOP 100 *\nFROM [dbo].[Customers]\nORDER BY [Id]"
        );
    }

    #[test]
    fn test_first_or_default_with_predicate() {
        let query = QueryExpr::Source
            .then(QueryMethod::FirstOrDefault(Some(field("Name").eq("Ada"))));
        let command = translate(&query).unwrap();
        assert_eq!(command.query_type, QueryType::SelectSingle);
        assert!(command.sql.starts_with("SELECT TOP 1 *"));
        assert!(command.sql.contains("WHERE ([Name] = @name)"));
    }

    #[test]
    fn test_count_and_any() {
        let command = translate(&QueryExpr::Source.then(QueryMethod::Count(None))).unwrap();
        assert_eq!(command.sql, "SELECT COUNT(*)\nFROM [dbo].[Customers]");
        assert_eq!(command.query_type, QueryType::Count);

        let command =
            translate(&QueryExpr::Source.then(QueryMethod::Any(Some(field("IsActive"))))).unwrap();
        assert_eq!(command.query_type, QueryType::Exists);
        assert!(command.sql.starts_with("IF EXISTS("));
        assert_eq!(command.parameter_values.get("true"), Some(&SqlValue::Int(1)));
    }

    #[test]
    fn test_unsupported_shapes_fail() {
        let after_take = QueryExpr::Source
            .then(QueryMethod::Take(5))
            .then(QueryMethod::Where(field("IsActive")));
        assert!(matches!(translate(&after_take), Err(OrmError::NotSupported(_))));

        let skip_after_take = QueryExpr::Source
            .then(QueryMethod::Take(5))
            .then(QueryMethod::Skip(5));
        assert!(matches!(translate(&skip_after_take), Err(OrmError::NotSupported(_))));

        let unknown = QueryExpr::Source.then(QueryMethod::Unsupported(String::from("GroupJoin")));
        assert!(matches!(translate(&unknown), Err(OrmError::NotSupported(_))));

        let method = filtered(field("Name").call_method("Trim", Vec::new()));
        assert!(matches!(translate(&method), Err(OrmError::NotSupported(_))));

        let two_members = filtered(field("Age").eq(field("Id")));
        assert!(matches!(translate(&two_members), Err(OrmError::NotSupported(_))));

        let then_by = QueryExpr::Source.then(QueryMethod::ThenBy(field("Name")));
        assert!(matches!(translate(&then_by), Err(OrmError::NotSupported(_))));
    }

    #[test]
    fn test_unknown_member_without_json_column() {
        let configuration = StoreConfiguration::new();
        let generators = QueryGenerators::new();
        let translator = QueryTranslator::new(
            crate::testing::Order::document_map(),
            &configuration,
            &generators,
        );
        let result = translator.translate(&filtered(field("Customer.Name").eq("Ada")));
        assert!(matches!(
            result,
            Err(OrmError::UnknownMember { table, member }) if table == "Orders" && member == "Customer.Name"
        ));
    }

    #[test]
    fn test_raw_where_needs_bound_placeholders() {
        let raw = |values| {
            QueryExpr::Source.then(QueryMethod::RawWhere(String::from("[City] = @CITY"), values))
        };
        assert!(matches!(
            translate(&raw(CommandParameterValues::new())),
            Err(OrmError::MissingParameterValue(name)) if name == "CITY"
        ));
        let command = translate(&raw(CommandParameterValues::new().with("city", "Oslo"))).unwrap();
        assert!(command.sql.contains("WHERE ([City] = @city)"));
    }
}
