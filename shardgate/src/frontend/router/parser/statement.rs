//! Parsed statement model.
//!
//! Only the parts routing cares about are kept: statement kind,
//! referenced tables, predicates on columns, INSERT values and
//! UPDATE assignments. Everything else stays with the parser.

use serde::{Deserialize, Serialize};
use shardgate_types::{Datum, ShardingValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    /// CREATE, ALTER, DROP, TRUNCATE.
    Ddl(Tables),
    /// GRANT, REVOKE, CREATE USER.
    Dcl(Tables),
    /// SET, USE, SHOW and friends.
    Dal(Dal),
    /// BEGIN, COMMIT, ROLLBACK.
    Tcl,
}

impl Statement {
    /// Logic tables referenced by the statement, in order of appearance.
    pub fn tables(&self) -> Vec<&str> {
        let tables: &[String] = match self {
            Self::Select(select) => &select.tables,
            Self::Insert(insert) => std::slice::from_ref(&insert.table),
            Self::Update(update) => &update.tables,
            Self::Delete(delete) => &delete.tables,
            Self::Ddl(ddl) | Self::Dcl(ddl) => &ddl.tables,
            Self::Dal(dal) => &dal.tables,
            Self::Tcl => &[],
        };

        let mut result: Vec<&str> = vec![];
        for table in tables {
            if !result.iter().any(|t| t.eq_ignore_ascii_case(table)) {
                result.push(table.as_str());
            }
        }
        result
    }

    /// SELECT, INSERT, UPDATE or DELETE.
    pub fn is_dml(&self) -> bool {
        matches!(
            self,
            Self::Select(_) | Self::Insert(_) | Self::Update(_) | Self::Delete(_)
        )
    }

    /// INSERT, UPDATE or DELETE.
    pub fn is_modification(&self) -> bool {
        matches!(self, Self::Insert(_) | Self::Update(_) | Self::Delete(_))
    }

    pub fn is_select(&self) -> bool {
        matches!(self, Self::Select(_))
    }

    /// SELECT ... FOR UPDATE and similar.
    pub fn contains_lock(&self) -> bool {
        matches!(self, Self::Select(select) if select.lock)
    }

    pub fn contains_subquery(&self) -> bool {
        matches!(self, Self::Select(select) if !select.subqueries.is_empty())
    }

    /// Top-level WHERE clause.
    pub fn where_clause(&self) -> Option<&[AndPredicate]> {
        match self {
            Self::Select(select) => Some(&select.filter),
            Self::Update(update) => Some(&update.filter),
            Self::Delete(delete) => Some(&delete.filter),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::Insert(_) => "INSERT",
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
            Self::Ddl(_) => "DDL",
            Self::Dcl(_) => "DCL",
            Self::Dal(_) => "DAL",
            Self::Tcl => "TCL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Select {
    pub tables: Vec<String>,
    #[serde(default, rename = "where")]
    pub filter: Vec<AndPredicate>,
    /// Row lock, e.g. FOR UPDATE.
    #[serde(default)]
    pub lock: bool,
    #[serde(default)]
    pub subqueries: Vec<Subquery>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Subquery {
    #[serde(default, rename = "where")]
    pub filter: Vec<AndPredicate>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Insert {
    pub table: String,
    /// Explicit column list. When missing, values follow
    /// the table's column order.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    pub values: Vec<Vec<Expr>>,
    #[serde(default)]
    pub on_duplicate_key_update: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Update {
    pub tables: Vec<String>,
    pub assignments: Vec<Assignment>,
    #[serde(default, rename = "where")]
    pub filter: Vec<AndPredicate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub column: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Delete {
    pub tables: Vec<String>,
    #[serde(default, rename = "where")]
    pub filter: Vec<AndPredicate>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dal {
    pub kind: DalKind,
    #[serde(default)]
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DalKind {
    Use,
    Set,
    ResetParameter,
    ShowDatabases,
    Show,
    #[default]
    Other,
}

/// Predicates joined with AND. A WHERE clause is a list of these joined with OR.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AndPredicate {
    pub predicates: Vec<Predicate>,
}

impl AndPredicate {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// Owner of the column, if qualified.
    #[serde(default)]
    pub table: Option<String>,
    pub column: String,
    #[serde(flatten)]
    pub operator: Operator,
}

impl Predicate {
    pub fn eq(table: Option<&str>, column: &str, value: Expr) -> Self {
        Self {
            table: table.map(|t| t.to_string()),
            column: column.to_string(),
            operator: Operator::Eq { value },
        }
    }

    pub fn in_list(table: Option<&str>, column: &str, values: Vec<Expr>) -> Self {
        Self {
            table: table.map(|t| t.to_string()),
            column: column.to_string(),
            operator: Operator::In { values },
        }
    }

    pub fn between(table: Option<&str>, column: &str, low: Expr, high: Expr) -> Self {
        Self {
            table: table.map(|t| t.to_string()),
            column: column.to_string(),
            operator: Operator::Between { low, high },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operator {
    Eq { value: Expr },
    In { values: Vec<Expr> },
    Between { low: Expr, high: Expr },
}

/// Right-hand side of a predicate, an INSERT value or an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Literal(ShardingValue),
    /// Bound parameter, zero-based.
    Param(usize),
    Null,
    /// Functions, column references, anything else.
    Other,
}

impl Expr {
    /// Resolve to a sharding value. `Ok(None)` means the expression
    /// can't be used for routing.
    pub fn value(&self, params: &[Datum]) -> Result<Option<ShardingValue>, ExprError> {
        match self {
            Self::Literal(value) => Ok(Some(value.clone())),
            Self::Param(index) => {
                let datum = params.get(*index).ok_or(ExprError::Unbound(*index))?;
                Ok(ShardingValue::try_from(datum).ok())
            }
            Self::Null | Self::Other => Ok(None),
        }
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::Literal(ShardingValue::Integer(value))
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::Literal(ShardingValue::String(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("parameter {0} is not bound")]
    Unbound(usize),
}
