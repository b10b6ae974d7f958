//! SQL Parser module
//!
//! Provides SQL parsing for the DDL and DML statements the storage engine
//! executes. Values are either literals or positional `?` parameters that
//! are bound at execution time.

use crate::types::{ColumnType, Value};
use thiserror::Error;

/// SQL result type
pub type SqlResult<T> = Result<T, SqlError>;

/// SQL error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    #[error("Syntax error: {0}")]
    SyntaxError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// SQL AST nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateTable(CreateTableStmt),
    DropTable(DropTableStmt),
    Insert(InsertStmt),
    Select(SelectStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
}

impl Statement {
    /// Name of the table the statement targets
    pub fn table_name(&self) -> &str {
        match self {
            Statement::CreateTable(s) => &s.table_name,
            Statement::DropTable(s) => &s.table_name,
            Statement::Insert(s) => &s.table_name,
            Statement::Select(s) => &s.from,
            Statement::Update(s) => &s.table_name,
            Statement::Delete(s) => &s.table_name,
        }
    }

    /// Number of `?` parameters the statement expects
    pub fn param_count(&self) -> usize {
        let exprs: Vec<&Expr> = match self {
            Statement::CreateTable(_) | Statement::DropTable(_) => Vec::new(),
            Statement::Insert(s) => s.values.iter().collect(),
            Statement::Select(s) => s.where_clause.iter().map(|c| &c.value).collect(),
            Statement::Update(s) => s
                .set
                .iter()
                .map(|(_, e)| e)
                .chain(s.where_clause.iter().map(|c| &c.value))
                .collect(),
            Statement::Delete(s) => s.where_clause.iter().map(|c| &c.value).collect(),
        };
        exprs.iter().filter(|e| matches!(e, Expr::Param(_))).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableStmt {
    pub table_name: String,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTableStmt {
    pub table_name: String,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStmt {
    pub table_name: String,
    pub columns: Vec<String>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    All,
    CountAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStmt {
    pub projection: Projection,
    pub from: String,
    pub where_clause: Option<Condition>,
    pub order_by: Vec<OrderItem>,
}

/// Equality filter `column = value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStmt {
    pub table_name: String,
    pub set: Vec<(String, Expr)>,
    pub where_clause: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteStmt {
    pub table_name: String,
    pub where_clause: Option<Condition>,
}

/// Scalar expression in a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(Value),
    /// Zero-based positional parameter
    Param(usize),
}

impl Expr {
    /// Resolve against bound parameters
    pub fn eval(&self, params: &[Value]) -> SqlResult<Value> {
        match self {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Param(idx) => params
                .get(*idx)
                .cloned()
                .ok_or_else(|| SqlError::ParseError(format!("Missing parameter {}", idx + 1))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Number(i64),
    Str(String),
    Param,
    LParen,
    RParen,
    Comma,
    Semicolon,
    Eq,
    Star,
}

fn tokenize(sql: &str) -> SqlResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = sql.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' | ',' | ';' | '=' | '*' | '?' => {
                chars.next();
                tokens.push(match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    ';' => Token::Semicolon,
                    '=' => Token::Eq,
                    '*' => Token::Star,
                    _ => Token::Param,
                });
            }
            '\'' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('\'') if chars.peek() == Some(&'\'') => {
                            chars.next();
                            text.push('\'');
                        }
                        Some('\'') => break,
                        Some(ch) => text.push(ch),
                        None => {
                            return Err(SqlError::SyntaxError(
                                "Unterminated string literal".to_string(),
                            ));
                        }
                    }
                }
                tokens.push(Token::Str(text));
            }
            '-' | '0'..='9' => {
                let mut digits = String::new();
                digits.push(c);
                chars.next();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n = digits
                    .parse::<i64>()
                    .map_err(|_| SqlError::ParseError(format!("Invalid number: {}", digits)))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(SqlError::SyntaxError(format!(
                    "Unexpected character: {}",
                    other
                )));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    params: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            params: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(word)) if word.eq_ignore_ascii_case(keyword))
    }

    fn accept_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> SqlResult<()> {
        if self.accept_keyword(keyword) {
            Ok(())
        } else {
            Err(SqlError::SyntaxError(format!(
                "Expected {}, found {}",
                keyword,
                self.describe_next()
            )))
        }
    }

    fn accept(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> SqlResult<()> {
        if self.accept(&token) {
            Ok(())
        } else {
            Err(SqlError::SyntaxError(format!(
                "Expected {}, found {}",
                what,
                self.describe_next()
            )))
        }
    }

    fn identifier(&mut self) -> SqlResult<String> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name),
            other => Err(SqlError::SyntaxError(format!(
                "Expected identifier, found {:?}",
                other
            ))),
        }
    }

    fn describe_next(&self) -> String {
        match self.peek() {
            Some(token) => format!("{:?}", token),
            None => "end of input".to_string(),
        }
    }

    fn expr(&mut self) -> SqlResult<Expr> {
        match self.advance() {
            Some(Token::Param) => {
                let idx = self.params;
                self.params += 1;
                Ok(Expr::Param(idx))
            }
            Some(Token::Number(n)) => Ok(Expr::Literal(Value::Integer(n))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Text(s))),
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("NULL") => {
                Ok(Expr::Literal(Value::Null))
            }
            other => Err(SqlError::SyntaxError(format!(
                "Expected value, found {:?}",
                other
            ))),
        }
    }

    fn condition(&mut self) -> SqlResult<Option<Condition>> {
        if !self.accept_keyword("WHERE") {
            return Ok(None);
        }
        let column = self.identifier()?;
        self.expect(Token::Eq, "=")?;
        let value = self.expr()?;
        Ok(Some(Condition { column, value }))
    }

    fn finish(&mut self) -> SqlResult<()> {
        self.accept(&Token::Semicolon);
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(SqlError::SyntaxError(format!(
                "Unexpected trailing input: {}",
                self.describe_next()
            ))),
        }
    }
}

/// Parse SQL string into AST
pub fn parse(sql: &str) -> SqlResult<Statement> {
    let mut parser = Parser::new(tokenize(sql)?);

    let stmt = if parser.accept_keyword("CREATE") {
        parse_create_table(&mut parser)?
    } else if parser.accept_keyword("DROP") {
        parse_drop_table(&mut parser)?
    } else if parser.accept_keyword("INSERT") {
        parse_insert(&mut parser)?
    } else if parser.accept_keyword("SELECT") {
        parse_select(&mut parser)?
    } else if parser.accept_keyword("UPDATE") {
        parse_update(&mut parser)?
    } else if parser.accept_keyword("DELETE") {
        parse_delete(&mut parser)?
    } else {
        return Err(SqlError::SyntaxError("Unknown SQL statement".to_string()));
    };

    parser.finish()?;
    Ok(stmt)
}

fn parse_create_table(p: &mut Parser) -> SqlResult<Statement> {
    p.expect_keyword("TABLE")?;
    let if_not_exists = if p.accept_keyword("IF") {
        p.expect_keyword("NOT")?;
        p.expect_keyword("EXISTS")?;
        true
    } else {
        false
    };
    let table_name = p.identifier()?;
    p.expect(Token::LParen, "(")?;

    let mut columns = Vec::new();
    loop {
        columns.push(parse_column_def(p)?);
        if p.accept(&Token::Comma) {
            continue;
        }
        p.expect(Token::RParen, ")")?;
        break;
    }

    Ok(Statement::CreateTable(CreateTableStmt {
        table_name,
        if_not_exists,
        columns,
    }))
}

fn parse_column_def(p: &mut Parser) -> SqlResult<ColumnDef> {
    let name = p.identifier()?;
    let type_name = p.identifier()?;
    // VARCHAR(n) style length is accepted and ignored
    if p.accept(&Token::LParen) {
        match p.advance() {
            Some(Token::Number(_)) => {}
            other => {
                return Err(SqlError::ParseError(format!(
                    "Invalid type length: {:?}",
                    other
                )));
            }
        }
        p.expect(Token::RParen, ")")?;
    }
    let data_type = parse_type(&type_name)?;

    let mut def = ColumnDef {
        name,
        data_type,
        nullable: true,
        primary_key: false,
        auto_increment: false,
    };

    loop {
        if p.accept_keyword("PRIMARY") {
            p.expect_keyword("KEY")?;
            def.primary_key = true;
            def.nullable = false;
        } else if p.accept_keyword("AUTO_INCREMENT") {
            def.auto_increment = true;
        } else if p.accept_keyword("NOT") {
            p.expect_keyword("NULL")?;
            def.nullable = false;
        } else if p.accept_keyword("NULL") {
            def.nullable = true;
        } else {
            break;
        }
    }

    Ok(def)
}

fn parse_type(type_str: &str) -> SqlResult<ColumnType> {
    match type_str.to_ascii_uppercase().as_str() {
        "BIGINT" | "INT64" => Ok(ColumnType::BigInt),
        "INT" | "INTEGER" | "INT32" => Ok(ColumnType::Integer),
        "TEXT" | "VARCHAR" => Ok(ColumnType::Text),
        other => Err(SqlError::ParseError(format!("Unknown type: {}", other))),
    }
}

fn parse_drop_table(p: &mut Parser) -> SqlResult<Statement> {
    p.expect_keyword("TABLE")?;
    let if_exists = if p.accept_keyword("IF") {
        p.expect_keyword("EXISTS")?;
        true
    } else {
        false
    };
    let table_name = p.identifier()?;
    Ok(Statement::DropTable(DropTableStmt {
        table_name,
        if_exists,
    }))
}

fn parse_insert(p: &mut Parser) -> SqlResult<Statement> {
    p.expect_keyword("INTO")?;
    let table_name = p.identifier()?;

    let mut columns = Vec::new();
    if p.accept(&Token::LParen) {
        loop {
            columns.push(p.identifier()?);
            if !p.accept(&Token::Comma) {
                break;
            }
        }
        p.expect(Token::RParen, ")")?;
    }

    p.expect_keyword("VALUES")?;
    p.expect(Token::LParen, "(")?;
    let mut values = Vec::new();
    loop {
        values.push(p.expr()?);
        if !p.accept(&Token::Comma) {
            break;
        }
    }
    p.expect(Token::RParen, ")")?;

    if !columns.is_empty() && columns.len() != values.len() {
        return Err(SqlError::SyntaxError(format!(
            "{} columns but {} values",
            columns.len(),
            values.len()
        )));
    }

    Ok(Statement::Insert(InsertStmt {
        table_name,
        columns,
        values,
    }))
}

fn parse_select(p: &mut Parser) -> SqlResult<Statement> {
    let projection = if p.accept(&Token::Star) {
        Projection::All
    } else if p.accept_keyword("COUNT") {
        p.expect(Token::LParen, "(")?;
        p.expect(Token::Star, "*")?;
        p.expect(Token::RParen, ")")?;
        if p.accept_keyword("AS") {
            p.identifier()?;
        }
        Projection::CountAll
    } else {
        return Err(SqlError::SyntaxError(
            "Expected * or COUNT(*) projection".to_string(),
        ));
    };

    p.expect_keyword("FROM")?;
    let from = p.identifier()?;
    let where_clause = p.condition()?;

    let mut order_by = Vec::new();
    if p.accept_keyword("ORDER") {
        p.expect_keyword("BY")?;
        loop {
            let column = p.identifier()?;
            let descending = if p.accept_keyword("DESC") {
                true
            } else {
                p.accept_keyword("ASC");
                false
            };
            order_by.push(OrderItem { column, descending });
            if !p.accept(&Token::Comma) {
                break;
            }
        }
    }

    Ok(Statement::Select(SelectStmt {
        projection,
        from,
        where_clause,
        order_by,
    }))
}

fn parse_update(p: &mut Parser) -> SqlResult<Statement> {
    let table_name = p.identifier()?;
    p.expect_keyword("SET")?;

    let mut set = Vec::new();
    loop {
        let column = p.identifier()?;
        p.expect(Token::Eq, "=")?;
        set.push((column, p.expr()?));
        if !p.accept(&Token::Comma) {
            break;
        }
    }

    let where_clause = p.condition()?;

    Ok(Statement::Update(UpdateStmt {
        table_name,
        set,
        where_clause,
    }))
}

fn parse_delete(p: &mut Parser) -> SqlResult<Statement> {
    p.expect_keyword("FROM")?;
    let table_name = p.identifier()?;
    let where_clause = p.condition()?;

    Ok(Statement::Delete(DeleteStmt {
        table_name,
        where_clause,
    }))
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
