//! Statement and settings extraction from migration files
//!
//! A migration file is a `;`-separated script. `SET name = value` lines are
//! not executed; they become settings applied to every other statement of
//! the file. Comments are dropped and whitespace between tokens is
//! collapsed; the text of every token is kept verbatim.

use crate::dialect::SqlDialect;
use crate::error::{SqlError, SqlResult};
use sqlparser::tokenizer::{Location, Token, TokenWithSpan, Tokenizer};
use std::collections::BTreeMap;

/// Session settings extracted from a migration file
pub type Settings = BTreeMap<String, String>;

/// Executable content of one migration file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMigration {
    /// Statements in execution order
    pub statements: Vec<String>,

    /// Settings applied to every statement
    pub settings: Settings,
}

/// Split `content` into statements and settings using `dialect`'s tokenizer.
///
/// Statement text is cut from the source at token boundaries, so literals
/// reach the database exactly as written.
pub fn extract(content: &str, dialect: &dyn SqlDialect) -> SqlResult<ExtractedMigration> {
    let source = strip_hash_comments(content, dialect);
    let tokens = Tokenizer::new(dialect.parser_dialect(), &source)
        .with_unescape(false)
        .tokenize_with_location()
        .map_err(|e| SqlError::Tokenize(e.to_string()))?;

    let mut extracted = ExtractedMigration::default();
    for statement in split_statements(lexemes(&source, tokens)) {
        if is_set_statement(&statement) {
            parse_settings(&statement, &mut extracted.settings)?;
        } else {
            extracted.statements.push(render(&statement));
        }
    }
    Ok(extracted)
}

/// A token together with the exact source text it was read from
#[derive(Debug, Clone)]
struct Lexeme<'a> {
    token: Token,
    text: &'a str,
}

/// Blank out lines starting with `#`, which the tokenizer does not treat as
/// comments for every dialect. Lines inside a multi-line string literal or
/// block comment are kept.
fn strip_hash_comments(content: &str, dialect: &dyn SqlDialect) -> String {
    let mut source = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        if line.trim_start().starts_with('#') && !ends_inside_literal(&source, dialect) {
            // Keep the line break so later lines keep their numbers
            if line.ends_with('\n') {
                source.push('\n');
            }
            continue;
        }
        source.push_str(line);
    }
    source
}

/// Whether `prefix` stops inside an unterminated string, quoted identifier
/// or block comment
fn ends_inside_literal(prefix: &str, dialect: &dyn SqlDialect) -> bool {
    Tokenizer::new(dialect.parser_dialect(), prefix)
        .with_unescape(false)
        .tokenize()
        .is_err()
}

/// Pair every token with its slice of `source`.
///
/// Token spans are contiguous and use 1-based line/column positions counted
/// in characters, so a single forward walk over `source` maps them to bytes.
fn lexemes(source: &str, tokens: Vec<TokenWithSpan>) -> Vec<Lexeme<'_>> {
    let mut cursor = SourceCursor::new(source);
    tokens
        .into_iter()
        .filter(|t| t.token != Token::EOF)
        .map(|t| {
            let start = cursor.advance_to(t.span.start);
            let end = cursor.advance_to(t.span.end);
            Lexeme {
                token: t.token,
                text: &source[start..end],
            }
        })
        .collect()
}

/// Forward-only mapping from tokenizer locations to byte offsets
struct SourceCursor<'a> {
    source: &'a str,
    offset: usize,
    line: u64,
    column: u64,
}

impl<'a> SourceCursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn advance_to(&mut self, target: Location) -> usize {
        while (self.line, self.column) < (target.line, target.column) {
            let Some(ch) = self.source[self.offset..].chars().next() else {
                break;
            };
            self.offset += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset
    }
}

fn is_whitespace(lexeme: &Lexeme<'_>) -> bool {
    matches!(lexeme.token, Token::Whitespace(_))
}

/// Group lexemes into statements on top-level `;`. Comments count as
/// whitespace, surrounding whitespace is trimmed and empty statements are
/// dropped.
fn split_statements(lexemes: Vec<Lexeme<'_>>) -> Vec<Vec<Lexeme<'_>>> {
    let mut statements = Vec::new();
    let mut current: Vec<Lexeme<'_>> = Vec::new();

    for lexeme in lexemes {
        if lexeme.token == Token::SemiColon {
            finish_statement(&mut current, &mut statements);
        } else {
            current.push(lexeme);
        }
    }
    finish_statement(&mut current, &mut statements);
    statements
}

fn finish_statement<'a>(current: &mut Vec<Lexeme<'a>>, statements: &mut Vec<Vec<Lexeme<'a>>>) {
    let lexemes = std::mem::take(current);
    let Some(start) = lexemes.iter().position(|l| !is_whitespace(l)) else {
        return;
    };
    let end = lexemes
        .iter()
        .rposition(|l| !is_whitespace(l))
        .map_or(lexemes.len(), |i| i + 1);
    statements.push(lexemes[start..end].to_vec());
}

/// Join the source text of non-whitespace lexemes, with every run of
/// whitespace and comments between them collapsed to a single space.
fn render(lexemes: &[Lexeme<'_>]) -> String {
    let mut sql = String::new();
    let mut pending_space = false;
    for lexeme in lexemes {
        if is_whitespace(lexeme) {
            pending_space = true;
            continue;
        }
        if pending_space && !sql.is_empty() {
            sql.push(' ');
        }
        pending_space = false;
        sql.push_str(lexeme.text);
    }
    sql
}

fn is_set_statement(lexemes: &[Lexeme<'_>]) -> bool {
    matches!(
        lexemes.first().map(|l| &l.token),
        Some(Token::Word(word)) if word.quote_style.is_none() && word.value.eq_ignore_ascii_case("SET")
    )
}

/// Parse `SET a = 1, b = 'x'` into `settings`. Later values win.
fn parse_settings(lexemes: &[Lexeme<'_>], settings: &mut Settings) -> SqlResult<()> {
    let invalid = || SqlError::InvalidSetting {
        statement: render(lexemes),
    };

    let body: Vec<&Lexeme<'_>> = lexemes[1..].iter().filter(|l| !is_whitespace(l)).collect();
    if body.is_empty() {
        return Err(invalid());
    }

    for assignment in body.split(|l| l.token == Token::Comma) {
        let eq = assignment
            .iter()
            .position(|l| l.token == Token::Eq)
            .ok_or_else(invalid)?;
        let (name, value) = (&assignment[..eq], &assignment[eq + 1..]);
        if name.is_empty() || value.is_empty() {
            return Err(invalid());
        }

        let name: String = name.iter().map(|l| l.text).collect();
        let value = match value {
            [lexeme] => match &lexeme.token {
                Token::SingleQuotedString(s) => unquote(s),
                Token::Word(w) => w.value.clone(),
                _ => lexeme.text.to_string(),
            },
            other => other.iter().map(|l| l.text).collect(),
        };
        log::debug!("Migration setting {} = {}", name, value);
        settings.insert(name, value);
    }
    Ok(())
}

/// Undo quote escaping in a raw single-quoted string body
fn unquote(raw: &str) -> String {
    raw.replace("''", "'").replace("\\'", "'")
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
