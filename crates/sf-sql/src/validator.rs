//! Offline validation of generated statements with sqlparser

use crate::error::{SqlError, SqlResult};
use crate::statement::Statement;
use sf_core::DialectProfile;
use sqlparser::ast;
use sqlparser::dialect::{dialect_from_str, Dialect};
use sqlparser::parser::Parser;

/// Parses generated SQL with the profile's sqlparser dialect
pub struct StatementValidator {
    dialect: Box<dyn Dialect>,
    numbered_placeholders: bool,
}

impl StatementValidator {
    /// Validator for the profile's `parser_dialect`
    pub fn for_profile(profile: &DialectProfile) -> SqlResult<Self> {
        let dialect = dialect_from_str(&profile.parser_dialect)
            .ok_or_else(|| SqlError::UnknownParserDialect(profile.parser_dialect.clone()))?;
        // The PostgreSQL tokenizer reads `?` as a JSON operator
        let numbered_placeholders = matches!(
            profile.parser_dialect.to_ascii_lowercase().as_str(),
            "postgres" | "postgresql"
        );
        Ok(Self {
            dialect,
            numbered_placeholders,
        })
    }

    /// Parse one generated statement; it must hold exactly one SQL statement
    pub fn parse(&self, statement: &Statement) -> SqlResult<ast::Statement> {
        let sql = if self.numbered_placeholders {
            number_placeholders(&statement.sql)
        } else {
            statement.sql.clone()
        };
        let mut parsed = Parser::parse_sql(self.dialect.as_ref(), &sql).map_err(|e| {
            let msg = e.to_string();
            let (line, column) = parse_location_from_error(&msg);
            SqlError::ParseError {
                message: msg,
                line,
                column,
            }
        })?;
        if parsed.len() != 1 {
            return Err(SqlError::ParseError {
                message: format!("expected one statement, found {}", parsed.len()),
                line: 0,
                column: 0,
            });
        }
        Ok(parsed.remove(0))
    }

    /// Parse every statement, stopping at the first failure
    pub fn validate_all(&self, statements: &[Statement]) -> SqlResult<()> {
        for statement in statements {
            self.parse(statement)?;
            log::debug!("validated: {}", statement.sql);
        }
        Ok(())
    }
}

/// Rewrite `?` placeholders outside string literals as `$1`, `$2`, ...
fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut in_literal = false;
    let mut n = 0;
    for c in sql.chars() {
        match c {
            '\'' => {
                in_literal = !in_literal;
                out.push(c);
            }
            '?' if !in_literal => {
                n += 1;
                out.push_str(&format!("${}", n));
            }
            _ => out.push(c),
        }
    }
    out
}

/// Extract "Line: N, Column: M" from a sqlparser error message.
///
/// `ParserError` carries no structured location, only message text.
fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let Some(line_idx) = msg.find("Line: ") else {
        return (0, 0);
    };
    let line_start = line_idx + 6;
    let Some(comma_idx) = msg[line_start..].find(',') else {
        return (0, 0);
    };
    let Ok(line) = msg[line_start..line_start + comma_idx].trim().parse::<usize>() else {
        return (0, 0);
    };
    let Some(col_idx) = msg.find("Column: ") else {
        return (0, 0);
    };
    let col_start = col_idx + 8;
    let col_end = msg[col_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map(|i| col_start + i)
        .unwrap_or(msg.len());
    let Ok(column) = msg[col_start..col_end].parse::<usize>() else {
        return (0, 0);
    };
    (line, column)
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
