//! Template scanner
//!
//! Walks the template text once, splitting it into header directives
//! (`@import`, `@option`, `@args`) and body units. Java fragments inside
//! directive parentheses are handed to the chumsky grammar.

use crate::error::ParseError;
use crate::model::*;
use crate::parser::grammar::{self, FragmentError};

/// Brace kinds that are currently open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    /// A literal `{` in plain text
    Text,
    For,
    If { has_else: bool },
    With,
}

#[derive(Debug, Clone, Copy)]
struct Block {
    kind: BlockKind,
    /// Offset of the directive (or brace) that opened the block
    open: usize,
}

/// Everything the scanner extracted from one template
#[derive(Debug, Default)]
pub(crate) struct ScannedTemplate {
    pub imports: Vec<JavaImport>,
    pub arguments: Vec<Argument>,
    pub units: Vec<TemplateUnit>,
    /// Set by `@option contentType=...`
    pub content_type: Option<ContentType>,
}

pub(crate) struct Scanner<'s> {
    src: &'s str,
    source_id: &'s str,
    index: LineIndex,
    pos: usize,
    text: String,
    text_start: Option<usize>,
    body_started: bool,
    args_seen: bool,
    blocks: Vec<Block>,
    out: ScannedTemplate,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

impl<'s> Scanner<'s> {
    pub fn new(src: &'s str, source_id: &'s str) -> Self {
        Self {
            src,
            source_id,
            index: LineIndex::new(src),
            pos: 0,
            text: String::new(),
            text_start: None,
            body_started: false,
            args_seen: false,
            blocks: Vec::new(),
            out: ScannedTemplate::default(),
        }
    }

    pub fn scan(mut self) -> Result<ScannedTemplate, ParseError> {
        while let Some(ch) = self.char_at(self.pos) {
            match ch {
                '@' => self.at_sign()?,
                '{' => {
                    self.blocks.push(Block {
                        kind: BlockKind::Text,
                        open: self.pos,
                    });
                    self.push_text(ch, 1);
                }
                '}' => self.close_brace()?,
                _ => self.push_text(ch, ch.len_utf8()),
            }
        }
        self.flush_text();

        if let Some(block) = self.blocks.iter().rev().find(|b| b.kind != BlockKind::Text) {
            let name = match block.kind {
                BlockKind::For => "@for",
                BlockKind::If { .. } => "@if",
                BlockKind::With => "@with",
                BlockKind::Text => "text",
            };
            return Err(self.error(block.open, format!("Unclosed {} block: missing '}}'", name)));
        }

        tracing::debug!(
            source = self.source_id,
            imports = self.out.imports.len(),
            arguments = self.out.arguments.len(),
            units = self.out.units.len(),
            "scanned template"
        );
        Ok(self.out)
    }

    // ---- text -------------------------------------------------------------

    /// Append `ch` to the pending plain text, consuming `len` source bytes
    fn push_text(&mut self, ch: char, len: usize) {
        if self.text_start.is_none() {
            self.text_start = Some(self.pos);
        }
        self.text.push(ch);
        self.pos += len;
    }

    /// Emit pending plain text; whitespace before the body is dropped
    fn flush_text(&mut self) {
        let Some(start) = self.text_start.take() else {
            return;
        };
        let text = std::mem::take(&mut self.text);
        if !self.body_started && text.trim().is_empty() {
            return;
        }
        self.body_started = true;
        let source_ref = self.source_ref(start..self.pos);
        self.out
            .units
            .push(TemplateUnit::PlainText(PlainText { text, source_ref }));
    }

    /// Flush text and mark the body as started before a body unit
    fn begin_body_unit(&mut self) {
        self.flush_text();
        self.body_started = true;
    }

    // ---- directives -------------------------------------------------------

    fn at_sign(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        match self.char_at(start + 1) {
            Some(c @ ('@' | '{' | '}')) => {
                self.push_text(c, 2);
                Ok(())
            }
            Some('*') => self.comment(start),
            Some('(') => self.paren_expression(start),
            Some(c) if is_ident_start(c) => self.keyword_or_value(start),
            _ => Err(self.error(start, "Expected an expression or directive after '@'")),
        }
    }

    fn comment(&mut self, start: usize) -> Result<(), ParseError> {
        let body = start + 2;
        let Some(len) = self.src[body..].find("*@") else {
            return Err(self.error(start, "Unclosed comment: missing '*@'"));
        };
        let end = body + len + 2;
        self.flush_text();
        let source_ref = self.source_ref(start..end);
        self.out.units.push(TemplateUnit::Comment(Comment {
            text: self.src[body..body + len].to_string(),
            source_ref,
        }));
        self.pos = end;
        Ok(())
    }

    fn paren_expression(&mut self, start: usize) -> Result<(), ParseError> {
        let open = start + 1;
        let close = self.matching_close(open)?;
        let inner = &self.src[open + 1..close];
        if inner.trim().is_empty() {
            return Err(self.error(open, "Empty expression"));
        }
        let expr = grammar::parse_expression(inner)
            .map_err(|errs| self.fragment_error(open + 1, errs))?;

        self.begin_body_unit();
        let source_ref = self.source_ref(start..close + 1);
        let unit = match expr.right {
            None => TemplateUnit::ValueExpression(ValueExpression {
                expression: inner[expr.left].to_string(),
                source_ref,
            }),
            Some(right) => TemplateUnit::NullTernaryExpression(NullTernaryExpression {
                left_expression: inner[expr.left].to_string(),
                right_expression: inner[right].to_string(),
                source_ref,
            }),
        };
        self.out.units.push(unit);
        self.pos = close + 1;
        Ok(())
    }

    fn keyword_or_value(&mut self, start: usize) -> Result<(), ParseError> {
        let word_end = self.ident_end(start + 1);
        let word = &self.src[start + 1..word_end];
        match word {
            "import" => self.import(start, word_end),
            "option" => self.option(start, word_end),
            "args" => self.args(start, word_end),
            "for" | "if" => self.block_begin(start, word_end, word == "for"),
            "with" => self.with_begin(start, word_end),
            "break" | "continue" => self.loop_statement(start, word_end, word == "break"),
            "else" => Err(self.error(
                start,
                "Unexpected '@else': an else branch follows the closing '}' of an @if block",
            )),
            _ => self.value_expression(start, word_end),
        }
    }

    /// Common checks for `@import`, `@option` and `@args`
    fn header_directive(&mut self, start: usize, name: &str) -> Result<(), ParseError> {
        self.flush_text();
        if self.body_started {
            return Err(self.error(
                start,
                format!("@{} must appear before any template content", name),
            ));
        }
        Ok(())
    }

    /// Byte range of the rest of the line after `from`, trimmed
    fn rest_of_line(&self, from: usize) -> (usize, usize) {
        let line_end = self.src[from..]
            .find('\n')
            .map(|i| from + i)
            .unwrap_or(self.src.len());
        let line = &self.src[from..line_end];
        let trimmed_start = from + (line.len() - line.trim_start().len());
        let trimmed_end = from + line.trim_end().len();
        (trimmed_start, trimmed_end.max(trimmed_start))
    }

    fn import(&mut self, start: usize, word_end: usize) -> Result<(), ParseError> {
        self.header_directive(start, "import")?;
        if self.args_seen {
            return Err(self.error(start, "@import must appear before @args"));
        }
        let (from, to) = self.rest_of_line(word_end);
        let statement = self.src[from..to].trim_end_matches(';').trim_end();
        if statement.is_empty() {
            return Err(self.error(word_end, "Expected an import statement after @import"));
        }
        let import = JavaImport {
            statement: statement.to_string(),
            source_ref: self.source_ref(start..to),
        };
        tracing::trace!(statement = %import.statement, "import");
        self.out.imports.push(import);
        self.pos = to;
        Ok(())
    }

    fn option(&mut self, start: usize, word_end: usize) -> Result<(), ParseError> {
        self.header_directive(start, "option")?;
        let (from, to) = self.rest_of_line(word_end);
        let Some((key, value)) = self.src[from..to].split_once('=') else {
            return Err(self.error(word_end, "Expected an option in the form key=value"));
        };
        match key.trim() {
            "contentType" => {
                let value = value.trim();
                let content_type = ContentType::from_name(value).ok_or_else(|| {
                    self.error(from, format!("Unknown content type '{}'", value))
                })?;
                self.out.content_type = Some(content_type);
            }
            other => {
                return Err(self.error(from, format!("Unsupported option '{}'", other)));
            }
        }
        self.pos = to;
        Ok(())
    }

    fn args(&mut self, start: usize, word_end: usize) -> Result<(), ParseError> {
        self.header_directive(start, "args")?;
        if self.args_seen {
            return Err(self.error(start, "Duplicate @args declaration"));
        }
        let open = self.expect_char(word_end, '(', "after @args")?;
        let close = self.matching_close(open)?;
        let inner_start = open + 1;
        let inner = &self.src[inner_start..close];
        let decls = grammar::parse_arguments(inner)
            .map_err(|errs| self.fragment_error(inner_start, errs))?;

        for decl in decls {
            let source_ref =
                self.source_ref(inner_start + decl.span.start..inner_start + decl.span.end);
            self.out.arguments.push(Argument {
                type_name: inner[decl.type_span].to_string(),
                name: decl.name,
                source_ref,
            });
        }
        self.args_seen = true;
        self.pos = close + 1;
        Ok(())
    }

    /// `@for (...) {` or `@if (...) {`
    fn block_begin(
        &mut self,
        start: usize,
        word_end: usize,
        is_for: bool,
    ) -> Result<(), ParseError> {
        let name = if is_for { "@for" } else { "@if" };
        let open = self.expect_char(word_end, '(', &format!("after {}", name))?;
        let close = self.matching_close(open)?;
        let expression = self.src[open + 1..close].trim().to_string();
        if expression.is_empty() {
            let what = if is_for { "a loop expression" } else { "a condition" };
            return Err(self.error(open, format!("Expected {} in {} (...)", what, name)));
        }
        let brace = self.expect_char(close + 1, '{', &format!("after {} (...)", name))?;

        self.begin_body_unit();
        let source_ref = self.source_ref(start..brace + 1);
        let (unit, kind) = if is_for {
            (
                TemplateUnit::ForBlockBegin(ForBlockBegin {
                    expression,
                    source_ref,
                }),
                BlockKind::For,
            )
        } else {
            (
                TemplateUnit::IfBlockBegin(IfBlockBegin {
                    expression,
                    source_ref,
                }),
                BlockKind::If { has_else: false },
            )
        };
        self.out.units.push(unit);
        self.blocks.push(Block { kind, open: start });
        self.pos = brace + 1;
        Ok(())
    }

    /// `@with (...) {` or `@with? (...) {`
    fn with_begin(&mut self, start: usize, word_end: usize) -> Result<(), ParseError> {
        let null_safe = self.char_at(word_end) == Some('?');
        let after = if null_safe { word_end + 1 } else { word_end };
        let open = self.expect_char(after, '(', "after @with")?;
        let close = self.matching_close(open)?;
        let inner_start = open + 1;
        let inner = &self.src[inner_start..close];
        let decls = grammar::parse_bindings(inner)
            .map_err(|errs| self.fragment_error(inner_start, errs))?;
        let brace = self.expect_char(close + 1, '{', "after @with (...)")?;

        let variables = decls
            .into_iter()
            .map(|decl| WithVariable {
                type_name: decl.type_span.map(|span| inner[span].to_string()),
                name: decl.name,
                value_expression: inner[decl.value_span].to_string(),
            })
            .collect();

        self.begin_body_unit();
        let source_ref = self.source_ref(start..brace + 1);
        self.out.units.push(TemplateUnit::WithBlockBegin(WithBlockBegin {
            statement: WithStatement {
                null_safe,
                variables,
            },
            source_ref,
        }));
        self.blocks.push(Block {
            kind: BlockKind::With,
            open: start,
        });
        self.pos = brace + 1;
        Ok(())
    }

    fn loop_statement(
        &mut self,
        start: usize,
        word_end: usize,
        is_break: bool,
    ) -> Result<(), ParseError> {
        if !self.blocks.iter().any(|b| b.kind == BlockKind::For) {
            let name = if is_break { "@break" } else { "@continue" };
            return Err(self.error(start, format!("{} is only valid inside a @for block", name)));
        }
        self.begin_body_unit();
        let source_ref = self.source_ref(start..word_end);
        let unit = if is_break {
            TemplateUnit::BreakStatement(BreakStatement { source_ref })
        } else {
            TemplateUnit::ContinueStatement(ContinueStatement { source_ref })
        };
        self.out.units.push(unit);
        self.pos = word_end;
        Ok(())
    }

    /// `@name` followed by any chain of `.member`, `(...)` and `[...]`
    fn value_expression(&mut self, start: usize, word_end: usize) -> Result<(), ParseError> {
        let mut end = word_end;
        loop {
            match self.char_at(end) {
                Some('.') if self.char_at(end + 1).is_some_and(is_ident_start) => {
                    end = self.ident_end(end + 1);
                }
                Some('(') | Some('[') => {
                    end = self.matching_close(end)? + 1;
                }
                _ => break,
            }
        }

        self.begin_body_unit();
        let source_ref = self.source_ref(start..end);
        self.out
            .units
            .push(TemplateUnit::ValueExpression(ValueExpression {
                expression: self.src[start + 1..end].to_string(),
                source_ref,
            }));
        self.pos = end;
        Ok(())
    }

    // ---- closing braces ---------------------------------------------------

    fn close_brace(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let Some(block) = self.blocks.pop() else {
            // Unbalanced at top level: literal text
            self.push_text('}', 1);
            return Ok(());
        };

        match block.kind {
            BlockKind::Text => {
                self.push_text('}', 1);
                return Ok(());
            }
            BlockKind::If { has_else } => return self.close_if(start, has_else),
            BlockKind::For | BlockKind::With => {}
        }

        self.begin_body_unit();
        let source_ref = self.source_ref(start..start + 1);
        let unit = if block.kind == BlockKind::For {
            TemplateUnit::ForBlockEnd(ForBlockEnd { source_ref })
        } else {
            TemplateUnit::WithBlockEnd(WithBlockEnd { source_ref })
        };
        self.out.units.push(unit);
        self.pos = start + 1;
        Ok(())
    }

    /// `}` of an if block, possibly continuing with `else if (...) {` or `else {`
    fn close_if(&mut self, start: usize, has_else: bool) -> Result<(), ParseError> {
        self.begin_body_unit();

        let else_at = self.skip_whitespace(start + 1);
        if self.keyword_at(else_at, "else") {
            let next = self.skip_whitespace(else_at + 4);

            if self.keyword_at(next, "if") {
                if has_else {
                    return Err(self.error(else_at, "'else if' after 'else'"));
                }
                let open = self.expect_char(next + 2, '(', "after 'else if'")?;
                let close = self.matching_close(open)?;
                let expression = self.src[open + 1..close].trim().to_string();
                if expression.is_empty() {
                    return Err(self.error(open, "Expected a condition in 'else if (...)'"));
                }
                let brace = self.expect_char(close + 1, '{', "after 'else if (...)'")?;
                let source_ref = self.source_ref(start..brace + 1);
                self.out.units.push(TemplateUnit::IfBlockElseIf(IfBlockElseIf {
                    expression,
                    source_ref,
                }));
                self.blocks.push(Block {
                    kind: BlockKind::If { has_else: false },
                    open: start,
                });
                self.pos = brace + 1;
                return Ok(());
            }

            if self.char_at(next) == Some('{') {
                if has_else {
                    return Err(self.error(else_at, "Duplicate 'else' in @if block"));
                }
                let source_ref = self.source_ref(start..next + 1);
                self.out
                    .units
                    .push(TemplateUnit::IfBlockElse(IfBlockElse { source_ref }));
                self.blocks.push(Block {
                    kind: BlockKind::If { has_else: true },
                    open: start,
                });
                self.pos = next + 1;
                return Ok(());
            }
        }

        let source_ref = self.source_ref(start..start + 1);
        self.out
            .units
            .push(TemplateUnit::IfBlockEnd(IfBlockEnd { source_ref }));
        self.pos = start + 1;
        Ok(())
    }

    // ---- helpers ----------------------------------------------------------

    fn char_at(&self, offset: usize) -> Option<char> {
        self.src.get(offset..)?.chars().next()
    }

    fn ident_end(&self, from: usize) -> usize {
        self.src[from..]
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(i, _)| from + i)
            .unwrap_or(self.src.len())
    }

    fn skip_whitespace(&self, from: usize) -> usize {
        self.src[from..]
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(i, _)| from + i)
            .unwrap_or(self.src.len())
    }

    /// `word` at `offset`, not followed by an identifier character
    fn keyword_at(&self, offset: usize, word: &str) -> bool {
        self.src[offset..].starts_with(word)
            && !self
                .char_at(offset + word.len())
                .is_some_and(is_ident_char)
    }

    /// Skip whitespace from `from` and require `expected`; returns its offset
    fn expect_char(&self, from: usize, expected: char, context: &str) -> Result<usize, ParseError> {
        let at = self.skip_whitespace(from);
        if self.char_at(at) == Some(expected) {
            Ok(at)
        } else {
            Err(self.error(at, format!("Expected '{}' {}", expected, context)))
        }
    }

    /// Offset of the bracket closing the one at `open`
    ///
    /// Brackets inside string and character literals are ignored.
    fn matching_close(&self, open: usize) -> Result<usize, ParseError> {
        let mut stack = Vec::new();
        let mut quote: Option<char> = None;
        let mut escaped = false;

        for (i, c) in self.src[open..].char_indices() {
            let at = open + i;
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' => quote = Some(c),
                '(' | '[' | '{' => stack.push(c),
                ')' | ']' | '}' => {
                    let expected = match stack.pop() {
                        Some('(') => ')',
                        Some('[') => ']',
                        _ => '}',
                    };
                    if c != expected {
                        return Err(self.error(
                            at,
                            format!("Unexpected '{}', expected '{}'", c, expected),
                        ));
                    }
                    if stack.is_empty() {
                        return Ok(at);
                    }
                }
                _ => {}
            }
        }

        let opener = self.char_at(open).unwrap_or('(');
        Err(self.error(open, format!("Unclosed '{}'", opener)))
    }

    fn source_ref(&self, span: Span) -> SourceRef {
        let (line, column) = self.index.location(self.src, span.start);
        SourceRef::new(self.source_id, line, column, span.clone(), &self.src[span])
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ParseError {
        self.error_span(offset..offset + 1, message.into(), vec![])
    }

    fn error_span(&self, span: Span, message: String, expected: Vec<String>) -> ParseError {
        let start = span.start.min(self.src.len());
        let end = span.end.clamp(start, self.src.len());
        let (line, column) = self.index.location(self.src, start);
        ParseError::Syntax {
            source_id: self.source_id.to_string(),
            line,
            column,
            message,
            span: start..end,
            expected,
        }
    }

    /// Map the first grammar error of a fragment starting at `base` back
    /// into template coordinates
    fn fragment_error(&self, base: usize, errs: Vec<FragmentError>) -> ParseError {
        match errs.into_iter().next() {
            Some(err) => self.error_span(
                base + err.span.start..base + err.span.end,
                err.message,
                err.expected,
            ),
            None => self.error(base, "Invalid syntax"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> ScannedTemplate {
        Scanner::new(src, "t.rocker.html").scan().expect("Should scan")
    }

    fn scan_err(src: &str) -> (usize, usize, String) {
        match Scanner::new(src, "t.rocker.html").scan() {
            Err(ParseError::Syntax {
                line,
                column,
                message,
                ..
            }) => (line, column, message),
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    fn kinds(src: &str) -> Vec<UnitKind> {
        scan(src).units.iter().map(|u| u.kind()).collect()
    }

    #[test]
    fn test_plain_text_only() {
        let out = scan("Hello world\n");
        assert_eq!(out.units.len(), 1);
        match &out.units[0] {
            TemplateUnit::PlainText(t) => {
                assert_eq!(t.text, "Hello world\n");
                assert_eq!(t.source_ref.line(), 1);
                assert_eq!(t.source_ref.column(), 1);
            }
            other => panic!("Expected plain text, got {:?}", other),
        }
    }

    #[test]
    fn test_escapes() {
        let out = scan("a@@b @{ @}");
        assert_eq!(out.units.len(), 1);
        match &out.units[0] {
            TemplateUnit::PlainText(t) => {
                assert_eq!(t.text, "a@b { }");
                assert_eq!(t.source_ref.text(), "a@@b @{ @}");
            }
            other => panic!("Expected plain text, got {:?}", other),
        }
    }

    #[test]
    fn test_header() {
        let src = "@import java.util.List\n\
                   @import com.example.Foo;\n\
                   @args (String title, List<Foo> items)\n\
                   <h1>@title</h1>\n";
        let out = scan(src);
        let imports: Vec<_> = out.imports.iter().map(|i| i.statement.as_str()).collect();
        assert_eq!(imports, vec!["java.util.List", "com.example.Foo"]);
        assert_eq!(out.imports[1].source_ref.line(), 2);
        assert_eq!(out.imports[1].source_ref.text(), "@import com.example.Foo;");

        assert_eq!(out.arguments.len(), 2);
        assert_eq!(out.arguments[1].type_name, "List<Foo>");
        assert_eq!(out.arguments[1].name, "items");
        assert_eq!(out.arguments[1].source_ref.text(), "List<Foo> items");
        assert_eq!(out.arguments[1].source_ref.line(), 3);
        assert_eq!(out.arguments[1].source_ref.column(), 22);

        let kinds: Vec<_> = out.units.iter().map(|u| u.kind()).collect();
        assert_eq!(
            kinds,
            vec![UnitKind::PlainText, UnitKind::ValueExpression, UnitKind::PlainText]
        );
    }

    #[test]
    fn test_option_content_type() {
        let out = scan("@option contentType=raw\nhello");
        assert_eq!(out.content_type, Some(ContentType::Raw));
    }

    #[test]
    fn test_option_errors() {
        assert_eq!(scan_err("@option contentType=json").2, "Unknown content type 'json'");
        assert_eq!(scan_err("@option discard=true").2, "Unsupported option 'discard'");
        assert_eq!(
            scan_err("@option contentType").2,
            "Expected an option in the form key=value"
        );
    }

    #[test]
    fn test_header_after_body_is_rejected() {
        let (line, column, message) = scan_err("<p>\n@import x.Y\n");
        assert_eq!((line, column), (2, 1));
        assert_eq!(message, "@import must appear before any template content");
    }

    #[test]
    fn test_import_after_args_is_rejected() {
        let (_, _, message) = scan_err("@args ()\n@import x.Y\n");
        assert_eq!(message, "@import must appear before @args");
    }

    #[test]
    fn test_duplicate_args() {
        let (_, _, message) = scan_err("@args ()\n@args ()\n");
        assert_eq!(message, "Duplicate @args declaration");
    }

    #[test]
    fn test_value_expression_chain() {
        let out = scan("Hi @user.getName().trim()[0]. Bye");
        match &out.units[1] {
            TemplateUnit::ValueExpression(v) => {
                assert_eq!(v.expression, "user.getName().trim()[0]");
                assert_eq!(v.source_ref.text(), "@user.getName().trim()[0]");
                assert_eq!(v.source_ref.column(), 4);
            }
            other => panic!("Expected value, got {:?}", other),
        }
        match &out.units[2] {
            TemplateUnit::PlainText(t) => assert_eq!(t.text, ". Bye"),
            other => panic!("Expected plain text, got {:?}", other),
        }
    }

    #[test]
    fn test_paren_expressions() {
        let out = scan("@(a + b)@(name ?: \"none\")");
        match &out.units[0] {
            TemplateUnit::ValueExpression(v) => assert_eq!(v.expression, "a + b"),
            other => panic!("Expected value, got {:?}", other),
        }
        match &out.units[1] {
            TemplateUnit::NullTernaryExpression(n) => {
                assert_eq!(n.left_expression, "name");
                assert_eq!(n.right_expression, "\"none\"");
                assert_eq!(n.source_ref.text(), "@(name ?: \"none\")");
            }
            other => panic!("Expected null ternary, got {:?}", other),
        }
    }

    #[test]
    fn test_comment() {
        let out = scan("@* note\n here *@text");
        match &out.units[0] {
            TemplateUnit::Comment(c) => {
                assert_eq!(c.text, " note\n here ");
                assert_eq!(c.source_ref.text(), "@* note\n here *@");
            }
            other => panic!("Expected comment, got {:?}", other),
        }
        assert_eq!(out.units.len(), 2);
    }

    #[test]
    fn test_for_block() {
        assert_eq!(
            kinds("@for (x : list) {@x}"),
            vec![
                UnitKind::ForBlockBegin,
                UnitKind::ValueExpression,
                UnitKind::ForBlockEnd
            ]
        );
        let out = scan("@for (x : list) {}");
        match &out.units[0] {
            TemplateUnit::ForBlockBegin(f) => {
                assert_eq!(f.expression, "x : list");
                assert_eq!(f.source_ref.text(), "@for (x : list) {");
            }
            other => panic!("Expected for begin, got {:?}", other),
        }
        assert_eq!(out.units[1].source_ref().text(), "}");
    }

    #[test]
    fn test_break_and_continue() {
        assert_eq!(
            kinds("@for (x : xs) {@if (x) {@break} else {@continue}}"),
            vec![
                UnitKind::ForBlockBegin,
                UnitKind::IfBlockBegin,
                UnitKind::BreakStatement,
                UnitKind::IfBlockElse,
                UnitKind::ContinueStatement,
                UnitKind::IfBlockEnd,
                UnitKind::ForBlockEnd,
            ]
        );
    }

    #[test]
    fn test_break_outside_for() {
        let (_, _, message) = scan_err("@break");
        assert_eq!(message, "@break is only valid inside a @for block");
    }

    #[test]
    fn test_if_else_chain() {
        let src = "@if (a) {\nA\n} else if (b) {\nB\n} else {\nC\n}\n";
        let out = scan(src);
        let kinds: Vec<_> = out.units.iter().map(|u| u.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                UnitKind::IfBlockBegin,
                UnitKind::PlainText,
                UnitKind::IfBlockElseIf,
                UnitKind::PlainText,
                UnitKind::IfBlockElse,
                UnitKind::PlainText,
                UnitKind::IfBlockEnd,
                UnitKind::PlainText,
            ]
        );
        match &out.units[2] {
            TemplateUnit::IfBlockElseIf(e) => {
                assert_eq!(e.expression, "b");
                assert_eq!(e.source_ref.text(), "} else if (b) {");
                assert_eq!(e.source_ref.line(), 3);
            }
            other => panic!("Expected else if, got {:?}", other),
        }
    }

    #[test]
    fn test_else_after_else() {
        let (_, _, message) = scan_err("@if (a) {} else {} else {}");
        assert_eq!(message, "Duplicate 'else' in @if block");
    }

    #[test]
    fn test_else_word_after_if_is_text() {
        let out = scan("@if (a) {x} elsewhere");
        let kinds: Vec<_> = out.units.iter().map(|u| u.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                UnitKind::IfBlockBegin,
                UnitKind::PlainText,
                UnitKind::IfBlockEnd,
                UnitKind::PlainText
            ]
        );
    }

    #[test]
    fn test_with_block() {
        let out = scan("@with? (String s = list.get(0), n = 2) {@s}");
        match &out.units[0] {
            TemplateUnit::WithBlockBegin(w) => {
                assert!(w.statement.null_safe);
                assert_eq!(w.statement.variables.len(), 2);
                assert_eq!(w.statement.variables[0].type_name.as_deref(), Some("String"));
                assert_eq!(w.statement.variables[0].value_expression, "list.get(0)");
                assert_eq!(w.statement.variables[1].type_name, None);
                assert_eq!(w.statement.variables[1].name, "n");
            }
            other => panic!("Expected with begin, got {:?}", other),
        }
        assert_eq!(out.units.last().unwrap().kind(), UnitKind::WithBlockEnd);
    }

    #[test]
    fn test_with_binding_error_maps_to_template_position() {
        let (line, column, message) = scan_err("line one\n@with (s = `x) {}");
        assert_eq!((line, column), (2, 12));
        assert_eq!(message, "Unexpected character '`'");
    }

    #[test]
    fn test_text_braces_are_balanced() {
        let out = scan("@if (a) {<style>p { x }</style>}");
        let kinds: Vec<_> = out.units.iter().map(|u| u.kind()).collect();
        assert_eq!(
            kinds,
            vec![UnitKind::IfBlockBegin, UnitKind::PlainText, UnitKind::IfBlockEnd]
        );
        match &out.units[1] {
            TemplateUnit::PlainText(t) => assert_eq!(t.text, "<style>p { x }</style>"),
            other => panic!("Expected plain text, got {:?}", other),
        }
    }

    #[test]
    fn test_stray_close_brace_is_text() {
        let out = scan("a } b");
        assert_eq!(out.units.len(), 1);
    }

    #[test]
    fn test_unclosed_block() {
        let (line, column, message) = scan_err("x\n  @for (a : b) {\n");
        assert_eq!((line, column), (2, 3));
        assert_eq!(message, "Unclosed @for block: missing '}'");
    }

    #[test]
    fn test_unclosed_comment() {
        let (line, column, message) = scan_err("ab @* never closed");
        assert_eq!((line, column), (1, 4));
        assert_eq!(message, "Unclosed comment: missing '*@'");
    }

    #[test]
    fn test_unclosed_paren() {
        let (_, _, message) = scan_err("@if (a }");
        assert_eq!(message, "Unexpected '}', expected ')'");
        let (_, _, message) = scan_err("@value(1, 2");
        assert_eq!(message, "Unclosed '('");
    }

    #[test]
    fn test_missing_brace_after_if() {
        let (_, _, message) = scan_err("@if (a) b");
        assert_eq!(message, "Expected '{' after @if (...)");
    }

    #[test]
    fn test_bare_at_sign() {
        let (line, column, message) = scan_err("mail me @ home");
        assert_eq!((line, column), (1, 9));
        assert_eq!(message, "Expected an expression or directive after '@'");
    }

    #[test]
    fn test_string_literal_brackets_ignored() {
        let out = scan("@f(\")\", '(')");
        match &out.units[0] {
            TemplateUnit::ValueExpression(v) => assert_eq!(v.expression, "f(\")\", '(')"),
            other => panic!("Expected value, got {:?}", other),
        }
    }

    #[test]
    fn test_leading_header_whitespace_dropped() {
        let out = scan("\n\n@import a.B\n\n");
        assert_eq!(out.imports.len(), 1);
        assert!(out.units.is_empty());
    }
}
