use sqlparser::ast::{
    self, AssignmentTarget, Expr, FromTable, ObjectNamePart, SetExpr, Statement, TableFactor,
    TableObject, Value, ValueWithSpan,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use ulid::Ulid;

use crate::model::*;

/// Parsed command from SQL input.
#[derive(Debug, PartialEq)]
pub enum Command {
    InsertField {
        id: Ulid,
        name: String,
        location: Option<String>,
        manager_id: Ulid,
        base_price: i64,
    },
    UpdateField {
        id: Ulid,
        name: Option<String>,
        location: Option<String>,
        status: Option<FieldStatus>,
        base_price: Option<i64>,
    },
    DeleteField {
        id: Ulid,
    },
    InsertOverride {
        id: Ulid,
        field_id: Ulid,
        start: Ms,
        end: Ms,
        available: bool,
    },
    DeleteOverride {
        id: Ulid,
    },
    InsertBooking {
        id: Ulid,
        field_id: Ulid,
        customer_id: Ulid,
        start: Ms,
        end: Ms,
        price: i64,
        note: Option<String>,
    },
    TransitionBooking {
        id: Ulid,
        status: BookingStatus,
        actor: ActorRole,
        actioned_by: Option<Ulid>,
        reason: Option<String>,
    },
    SelectFields,
    SelectBookings {
        field_id: Ulid,
    },
    SelectOverrides {
        field_id: Ulid,
    },
    SelectAvailability {
        field_id: Ulid,
        day: Ms,
    },
    Listen {
        channel: String,
    },
    Unlisten {
        channel: Option<String>,
    },
}

pub fn parse_sql(sql: &str) -> Result<Command, SqlError> {
    let trimmed = sql.trim();
    let upper = trimmed.to_uppercase();
    if upper.starts_with("LISTEN ") {
        let channel = trimmed[7..].trim().trim_matches(';').to_string();
        return Ok(Command::Listen { channel });
    }
    if upper.starts_with("UNLISTEN") {
        let rest = trimmed[8..].trim().trim_matches(';').trim();
        let channel = match rest {
            "" | "*" => None,
            c => Some(c.to_string()),
        };
        return Ok(Command::Unlisten { channel });
    }

    let dialect = PostgreSqlDialect {};
    let stmts = Parser::parse_sql(&dialect, sql).map_err(|e| SqlError::Parse(e.to_string()))?;
    if stmts.is_empty() {
        return Err(SqlError::Empty);
    }

    match &stmts[0] {
        Statement::Insert(insert) => parse_insert(insert),
        Statement::Update {
            table,
            assignments,
            selection,
            ..
        } => parse_update(table, assignments, selection),
        Statement::Delete(delete) => parse_delete(delete),
        Statement::Query(query) => parse_select(query),
        other => Err(SqlError::Unsupported(format!("{other}"))),
    }
}

fn parse_insert(insert: &ast::Insert) -> Result<Command, SqlError> {
    let table = insert_table_name(insert)?;
    let values = extract_insert_values(insert)?;

    match table.as_str() {
        "fields" => {
            if values.len() < 5 {
                return Err(SqlError::WrongArity("fields", 5, values.len()));
            }
            Ok(Command::InsertField {
                id: parse_ulid(&values[0])?,
                name: parse_string(&values[1])?,
                location: parse_string_or_null(&values[2])?,
                manager_id: parse_ulid(&values[3])?,
                base_price: parse_i64(&values[4])?,
            })
        }
        "overrides" => {
            if values.len() < 5 {
                return Err(SqlError::WrongArity("overrides", 5, values.len()));
            }
            Ok(Command::InsertOverride {
                id: parse_ulid(&values[0])?,
                field_id: parse_ulid(&values[1])?,
                start: parse_i64(&values[2])?,
                end: parse_i64(&values[3])?,
                available: parse_bool(&values[4])?,
            })
        }
        "bookings" => {
            if values.len() < 6 {
                return Err(SqlError::WrongArity("bookings", 6, values.len()));
            }
            let note = if values.len() >= 7 {
                parse_string_or_null(&values[6])?
            } else {
                None
            };
            Ok(Command::InsertBooking {
                id: parse_ulid(&values[0])?,
                field_id: parse_ulid(&values[1])?,
                customer_id: parse_ulid(&values[2])?,
                start: parse_i64(&values[3])?,
                end: parse_i64(&values[4])?,
                price: parse_i64(&values[5])?,
                note,
            })
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn parse_update(
    table: &ast::TableWithJoins,
    assignments: &[ast::Assignment],
    selection: &Option<Expr>,
) -> Result<Command, SqlError> {
    let table = table_factor_name(&table.relation)?;
    let id = extract_where_ulid(selection, "id")?;

    match table.as_str() {
        "fields" => {
            let mut name = None;
            let mut location = None;
            let mut status = None;
            let mut base_price = None;
            for a in assignments {
                let col = assignment_column(a)?;
                match col.as_str() {
                    "name" => name = Some(parse_string(&a.value)?),
                    "location" => location = parse_string_or_null(&a.value)?,
                    "status" => {
                        let s = parse_string(&a.value)?;
                        status = Some(
                            FieldStatus::parse(&s)
                                .ok_or_else(|| SqlError::Parse(format!("bad status: {s}")))?,
                        );
                    }
                    "base_price" => base_price = Some(parse_i64(&a.value)?),
                    _ => return Err(SqlError::UnknownColumn(col)),
                }
            }
            Ok(Command::UpdateField {
                id,
                name,
                location,
                status,
                base_price,
            })
        }
        "bookings" => {
            let mut status = None;
            let mut actor = ActorRole::Manager;
            let mut actioned_by = None;
            let mut reason = None;
            for a in assignments {
                let col = assignment_column(a)?;
                match col.as_str() {
                    "status" => {
                        let s = parse_string(&a.value)?;
                        status = Some(
                            BookingStatus::parse(&s)
                                .ok_or_else(|| SqlError::Parse(format!("bad status: {s}")))?,
                        );
                    }
                    "actor" => {
                        let s = parse_string(&a.value)?;
                        actor = ActorRole::parse(&s)
                            .ok_or_else(|| SqlError::Parse(format!("bad actor: {s}")))?;
                    }
                    "actioned_by" => actioned_by = parse_ulid_or_null(&a.value)?,
                    "reason" => reason = parse_string_or_null(&a.value)?,
                    _ => return Err(SqlError::UnknownColumn(col)),
                }
            }
            let status = status.ok_or(SqlError::MissingAssignment("status"))?;
            Ok(Command::TransitionBooking {
                id,
                status,
                actor,
                actioned_by,
                reason,
            })
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn parse_delete(delete: &ast::Delete) -> Result<Command, SqlError> {
    let table = delete_table_name(delete)?;
    let id = extract_where_ulid(&delete.selection, "id")?;

    match table.as_str() {
        "fields" => Ok(Command::DeleteField { id }),
        "overrides" => Ok(Command::DeleteOverride { id }),
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn parse_select(query: &ast::Query) -> Result<Command, SqlError> {
    let select = match query.body.as_ref() {
        SetExpr::Select(s) => s,
        _ => return Err(SqlError::Unsupported("non-SELECT query".into())),
    };

    if select.from.is_empty() {
        return Err(SqlError::Parse("SELECT without FROM".into()));
    }
    let table = table_factor_name(&select.from[0].relation)?;

    match table.as_str() {
        "fields" => Ok(Command::SelectFields),
        "bookings" => Ok(Command::SelectBookings {
            field_id: extract_where_ulid(&select.selection, "field_id")?,
        }),
        "overrides" => Ok(Command::SelectOverrides {
            field_id: extract_where_ulid(&select.selection, "field_id")?,
        }),
        "availability" => {
            let (mut field_id, mut day) = (None, None);
            if let Some(selection) = &select.selection {
                extract_availability_filters(selection, &mut field_id, &mut day)?;
            }
            Ok(Command::SelectAvailability {
                field_id: field_id.ok_or(SqlError::MissingFilter("field_id"))?,
                day: day.ok_or(SqlError::MissingFilter("day"))?,
            })
        }
        _ => Err(SqlError::UnknownTable(table)),
    }
}

fn extract_availability_filters(
    expr: &Expr,
    field_id: &mut Option<Ulid>,
    day: &mut Option<Ms>,
) -> Result<(), SqlError> {
    match expr {
        Expr::BinaryOp { left, op, right } => match op {
            ast::BinaryOperator::And => {
                extract_availability_filters(left, field_id, day)?;
                extract_availability_filters(right, field_id, day)?;
            }
            ast::BinaryOperator::Eq => {
                let col = expr_column_name(left);
                if col.as_deref() == Some("field_id") {
                    *field_id = Some(parse_ulid(right)?);
                } else if col.as_deref() == Some("day") {
                    *day = Some(parse_i64(right)?);
                }
            }
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────

fn object_name_last(name: &ast::ObjectName) -> Option<String> {
    name.0.last().and_then(|part| match part {
        ObjectNamePart::Identifier(ident) => Some(ident.value.to_lowercase()),
        _ => None,
    })
}

fn insert_table_name(insert: &ast::Insert) -> Result<String, SqlError> {
    match &insert.table {
        TableObject::TableName(name) => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty table name".into()))
        }
        _ => Err(SqlError::Parse("unsupported table object in INSERT".into())),
    }
}

fn delete_table_name(delete: &ast::Delete) -> Result<String, SqlError> {
    let tables_with_joins = match &delete.from {
        FromTable::WithFromKeyword(t) | FromTable::WithoutKeyword(t) => t,
    };
    if let Some(first) = tables_with_joins.first() {
        table_factor_name(&first.relation)
    } else {
        Err(SqlError::Parse("DELETE without table".into()))
    }
}

fn table_factor_name(tf: &TableFactor) -> Result<String, SqlError> {
    match tf {
        TableFactor::Table { name, .. } => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty table name".into()))
        }
        _ => Err(SqlError::Parse("complex table expression".into())),
    }
}

fn assignment_column(a: &ast::Assignment) -> Result<String, SqlError> {
    match &a.target {
        AssignmentTarget::ColumnName(name) => {
            object_name_last(name).ok_or_else(|| SqlError::Parse("empty column name".into()))
        }
        _ => Err(SqlError::Parse("unsupported assignment target".into())),
    }
}

fn extract_insert_values(insert: &ast::Insert) -> Result<Vec<Expr>, SqlError> {
    let body = insert
        .source
        .as_ref()
        .ok_or(SqlError::Parse("no VALUES".into()))?;
    match body.body.as_ref() {
        SetExpr::Values(values) => {
            if values.rows.is_empty() {
                return Err(SqlError::Parse("empty VALUES".into()));
            }
            Ok(values.rows[0].clone())
        }
        _ => Err(SqlError::Parse("expected VALUES".into())),
    }
}

fn extract_where_ulid(selection: &Option<Expr>, col: &'static str) -> Result<Ulid, SqlError> {
    let sel = selection.as_ref().ok_or(SqlError::MissingFilter(col))?;
    match sel {
        Expr::BinaryOp {
            left,
            op: ast::BinaryOperator::Eq,
            right,
        } => {
            if expr_column_name(left).as_deref() == Some(col) {
                parse_ulid(right)
            } else {
                Err(SqlError::MissingFilter(col))
            }
        }
        _ => Err(SqlError::MissingFilter(col)),
    }
}

fn expr_column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.to_lowercase()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|i| i.value.to_lowercase()),
        _ => None,
    }
}

fn extract_value(expr: &Expr) -> Option<&Value> {
    match expr {
        Expr::Value(ValueWithSpan { value, .. }) => Some(value),
        _ => None,
    }
}

fn parse_ulid(expr: &Expr) -> Result<Ulid, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::SingleQuotedString(s) | Value::Number(s, _) => {
                Ulid::from_string(s).map_err(|e| SqlError::Parse(format!("bad ULID: {e}")))
            }
            _ => Err(SqlError::Parse(format!("expected string, got {value:?}"))),
        }
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

fn parse_ulid_or_null(expr: &Expr) -> Result<Option<Ulid>, SqlError> {
    if let Some(Value::Null) = extract_value(expr) {
        return Ok(None);
    }
    parse_ulid(expr).map(Some)
}

fn parse_i64(expr: &Expr) -> Result<i64, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::Number(s, _) => s
                .parse()
                .map_err(|e| SqlError::Parse(format!("bad i64: {e}"))),
            Value::SingleQuotedString(s) => s
                .parse()
                .map_err(|e| SqlError::Parse(format!("bad i64: {e}"))),
            _ => Err(SqlError::Parse(format!("expected number, got {value:?}"))),
        }
    } else if let Expr::UnaryOp {
        op: ast::UnaryOperator::Minus,
        expr,
    } = expr
    {
        Ok(-parse_i64(expr)?)
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

fn parse_string(expr: &Expr) -> Result<String, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::SingleQuotedString(s) => Ok(s.clone()),
            _ => Err(SqlError::Parse(format!("expected string, got {value:?}"))),
        }
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

fn parse_string_or_null(expr: &Expr) -> Result<Option<String>, SqlError> {
    if let Some(Value::Null) = extract_value(expr) {
        return Ok(None);
    }
    parse_string(expr).map(Some)
}

fn parse_bool(expr: &Expr) -> Result<bool, SqlError> {
    if let Some(value) = extract_value(expr) {
        match value {
            Value::Boolean(b) => Ok(*b),
            Value::SingleQuotedString(s) => match s.to_lowercase().as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(SqlError::Parse(format!("bad bool: {s}"))),
            },
            Value::Number(n, _) => Ok(n != "0"),
            _ => Err(SqlError::Parse(format!("expected bool, got {value:?}"))),
        }
    } else {
        Err(SqlError::Parse(format!("expected value, got {expr:?}")))
    }
}

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum SqlError {
    Parse(String),
    Empty,
    Unsupported(String),
    UnknownTable(String),
    UnknownColumn(String),
    WrongArity(&'static str, usize, usize),
    MissingFilter(&'static str),
    MissingAssignment(&'static str),
}

impl std::fmt::Display for SqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlError::Parse(s) => write!(f, "parse error: {s}"),
            SqlError::Empty => write!(f, "empty query"),
            SqlError::Unsupported(s) => write!(f, "unsupported: {s}"),
            SqlError::UnknownTable(t) => write!(f, "unknown table: {t}"),
            SqlError::UnknownColumn(c) => write!(f, "unknown column: {c}"),
            SqlError::WrongArity(t, expected, got) => {
                write!(f, "{t}: expected {expected} values, got {got}")
            }
            SqlError::MissingFilter(col) => write!(f, "missing filter: {col}"),
            SqlError::MissingAssignment(col) => write!(f, "missing assignment: {col}"),
        }
    }
}

impl std::error::Error for SqlError {}
