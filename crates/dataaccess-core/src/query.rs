//! Fluent WHERE grammar
//!
//! A [`Query`] is started with [`Query::source`], extended by predicate
//! calls that each consume and return it, and finally handed by value to one
//! terminal operation of the mapper. Tokens are kept in call order and
//! joined with single spaces; every comparison appends one `?` placeholder
//! and one [`QueryParameter`], so placeholders and parameters always pair up
//! in order.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::errors::DataAccessError;
use crate::model::{parse_literal, FieldKind, FieldValue, Record, RecordSchema, ID_FIELD};

/// Placeholder token for a bound parameter
pub const PLACEHOLDER: &str = "?";

/// Comparison operators and their SQL tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    GreaterThan,
    LessThan,
    Equals,
    LessThanOrEqualTo,
    GreaterThanOrEqualTo,
    NotEqualTo,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::Equals => "=",
            Operator::LessThanOrEqualTo => "<=",
            Operator::GreaterThanOrEqualTo => ">=",
            Operator::NotEqualTo => "<>",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A pending WHERE parameter: the field's tag plus the caller's literal text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParameter {
    pub kind: FieldKind,
    pub literal: String,
}

impl QueryParameter {
    pub fn new(kind: FieldKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
        }
    }

    /// Parse the literal into a bindable value
    ///
    /// # Errors
    ///
    /// `InvalidLiteral` for text the tag cannot parse, `UnsupportedType` for
    /// byte-array fields.
    pub fn to_value(&self) -> Result<FieldValue, DataAccessError> {
        parse_literal(self.kind, &self.literal)
    }
}

/// Filter state for one operation against record type `R`
pub struct Query<R> {
    tokens: Vec<String>,
    parameters: Vec<QueryParameter>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Query<R> {
    /// Start a fresh query against `R`'s table
    ///
    /// # Panics
    ///
    /// Panics if `R` declares no `Id` field.
    pub fn source() -> Self {
        let schema = R::schema();
        assert!(
            schema.has_field(ID_FIELD),
            "record type `{}` must declare an `{}` field",
            schema.type_name(),
            ID_FIELD
        );
        Self {
            tokens: Vec::new(),
            parameters: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Append `field <op> ?` and remember `literal` as its parameter
    ///
    /// An unknown field is logged and skipped; the query comes back unchanged.
    pub fn filter(mut self, field: &str, op: Operator, literal: impl ToString) -> Self {
        let schema = R::schema();
        let Some(descriptor) = schema.field(field) else {
            tracing::error!(
                table = schema.type_name(),
                field = field,
                "field does not exist in record type, where clause skipped"
            );
            return self;
        };
        self.tokens.push(descriptor.name().to_string());
        self.tokens.push(op.as_sql().to_string());
        self.tokens.push(PLACEHOLDER.to_string());
        self.parameters
            .push(QueryParameter::new(descriptor.kind(), literal.to_string()));
        self
    }

    pub fn and(mut self) -> Self {
        self.tokens.push("AND".to_string());
        self
    }

    pub fn or(mut self) -> Self {
        self.tokens.push("OR".to_string());
        self
    }

    /// Open a parenthesised group; balance is left to the database
    pub fn begin_nested(mut self) -> Self {
        self.tokens.push("(".to_string());
        self
    }

    pub fn end_nested(mut self) -> Self {
        self.tokens.push(")".to_string());
        self
    }

    pub fn table(&self) -> &'static str {
        R::schema().type_name()
    }

    pub fn schema(&self) -> &'static RecordSchema<R> {
        R::schema()
    }
}

impl<R> Query<R> {
    /// `WHERE` followed by the space-joined tokens, or empty for no tokens
    pub fn where_clause(&self) -> String {
        if self.tokens.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.tokens.join(" "))
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn parameters(&self) -> &[QueryParameter] {
        &self.parameters
    }

    pub fn placeholder_count(&self) -> usize {
        self.tokens.iter().filter(|t| *t == PLACEHOLDER).count()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<R> Clone for Query<R> {
    fn clone(&self) -> Self {
        Self {
            tokens: self.tokens.clone(),
            parameters: self.parameters.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> PartialEq for Query<R> {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens && self.parameters == other.parameters
    }
}

impl<R> fmt::Debug for Query<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("record", &std::any::type_name::<R>())
            .field("tokens", &self.tokens)
            .field("parameters", &self.parameters)
            .finish()
    }
}
