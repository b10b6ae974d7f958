//! Statement redirector
//!
//! Rewrites a [`Query`] template so that every whole-word occurrence of the
//! placeholder table designator names a concrete table. Text inside quoted
//! literals is left alone.

use thiserror::Error;

use crate::query::Query;
use crate::types::{TABLE_PLACEHOLDER, Value};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RedirectError {
    /// No table to redirect to
    #[error("No table selected to run the statement against")]
    NoTarget,
    /// Target is not a plain identifier
    #[error("Invalid target table name: {0:?}")]
    InvalidTarget(String),
    /// Template never names the placeholder
    #[error("Statement does not reference the table placeholder: {0}")]
    MissingPlaceholder(String),
}

pub type RedirectResult<T> = Result<T, RedirectError>;

/// A statement bound to a concrete table, ready to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundStatement {
    sql: String,
    params: Vec<Value>,
    table: String,
}

impl BoundStatement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Table the statement now targets
    pub fn table(&self) -> &str {
        &self.table
    }
}

/// Bind `query` to `target`
pub fn redirect(query: &Query, target: Option<&str>) -> RedirectResult<BoundStatement> {
    let target = match target {
        Some(name) if !name.is_empty() => name,
        _ => return Err(RedirectError::NoTarget),
    };
    if !is_identifier(target) {
        return Err(RedirectError::InvalidTarget(target.to_string()));
    }

    let (sql, replaced) = substitute(query.sql(), TABLE_PLACEHOLDER, target);
    if replaced == 0 {
        return Err(RedirectError::MissingPlaceholder(query.sql().to_string()));
    }

    Ok(BoundStatement {
        sql,
        params: query.params().to_vec(),
        table: target.to_string(),
    })
}

/// Replace whole identifiers equal to `placeholder` outside quotes
///
/// Returns the rewritten text and the number of replacements.
pub fn substitute(template: &str, placeholder: &str, target: &str) -> (String, usize) {
    let mut out = String::with_capacity(template.len() + target.len());
    let mut replaced = 0;
    let mut chars = template.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c == '\'' || c == '"' {
            out.push(c);
            // Copy through the closing quote; doubled quotes stay inside
            while let Some((_, q)) = chars.next() {
                out.push(q);
                if q == c {
                    if chars.peek().is_some_and(|&(_, n)| n == c) {
                        if let Some((_, n)) = chars.next() {
                            out.push(n);
                        }
                    } else {
                        break;
                    }
                }
            }
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut end = start + c.len_utf8();
            while let Some(&(idx, n)) = chars.peek() {
                if n.is_ascii_alphanumeric() || n == '_' {
                    end = idx + n.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let word = &template[start..end];
            if word == placeholder {
                out.push_str(target);
                replaced += 1;
            } else {
                out.push_str(word);
            }
        } else {
            out.push(c);
        }
    }

    (out, replaced)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
