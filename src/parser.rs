use crate::ast::*;
use crate::lexer::{LexError, Lexer, Token};
use log::warn;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),
    #[error("line {0}: table block opened before the previous block was closed")]
    NestedBlock(usize),
    #[error("unterminated block: {0}")]
    UnterminatedBlock(String),
    #[error("line {0}: malformed column line, expected `<name> <type> [attributes]`")]
    MalformedColumn(usize),
    #[error("line {0}: malformed reference, expected `Ref: <table>.<column> > <table>.<column>`")]
    MalformedRef(usize),
    #[error("line {line}: unexpected token, expected {expected}")]
    Unexpected { line: usize, expected: &'static str },
}

pub struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self { tokens, pos: 0 })
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|(t, _)| t)
            .unwrap_or(&Token::Eof)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, l)| *l)
            .unwrap_or(1)
    }

    fn advance(&mut self) -> Token {
        let tok = self
            .tokens
            .get(self.pos)
            .map(|(t, _)| t.clone())
            .unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    fn check_keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), Token::Ident(s) if s.eq_ignore_ascii_case(kw))
    }

    fn next_is(&self, tok: Token) -> bool {
        matches!(self.tokens.get(self.pos + 1), Some((t, _)) if *t == tok)
    }

    fn next_is_keyword(&self, kw: &str) -> bool {
        matches!(self.tokens.get(self.pos + 1), Some((Token::Ident(s), _)) if s.eq_ignore_ascii_case(kw))
    }

    fn skip_newlines(&mut self) {
        while *self.peek() == Token::Newline {
            self.pos += 1;
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.peek(), Token::Newline | Token::Eof)
    }

    /// Table and column names may be bare identifiers or quoted strings.
    fn read_name(&mut self) -> Option<String> {
        match self.peek().clone() {
            Token::Ident(s) | Token::Str(s) => {
                self.pos += 1;
                Some(s)
            }
            _ => None,
        }
    }

    /// `Table <name> {` — the only construct that opens a table block.
    fn at_table_opener(&self) -> bool {
        self.check_keyword("Table")
            && matches!(
                self.tokens.get(self.pos + 1),
                Some((Token::Ident(_) | Token::Str(_), _))
            )
            && matches!(self.tokens.get(self.pos + 2), Some((Token::LBrace, _)))
    }

    pub fn parse(&mut self) -> Result<Document, ParseError> {
        let mut document = Document::default();
        loop {
            self.skip_newlines();
            if *self.peek() == Token::Eof {
                break;
            }
            if self.check_keyword("Table") {
                self.pos += 1;
                let table = self.parse_table(&mut document.refs)?;
                document.tables.push(table);
            } else if self.check_keyword("Ref") {
                self.pos += 1;
                let reference = self.parse_ref()?;
                document.refs.push(reference);
            } else {
                return Err(ParseError::Unexpected {
                    line: self.line(),
                    expected: "Table or Ref",
                });
            }
        }
        Ok(document)
    }

    fn parse_table(&mut self, refs: &mut Vec<RefDef>) -> Result<TableDef, ParseError> {
        let name = self.read_name().ok_or(ParseError::Unexpected {
            line: self.line(),
            expected: "table name",
        })?;
        if *self.peek() != Token::LBrace {
            return Err(ParseError::Unexpected {
                line: self.line(),
                expected: "{",
            });
        }
        self.pos += 1;

        let mut columns: Vec<ColumnDef> = Vec::new();
        let mut index_names: Vec<String> = Vec::new();
        loop {
            self.skip_newlines();
            if *self.peek() == Token::RBrace {
                self.pos += 1;
                break;
            }
            if *self.peek() == Token::Eof {
                return Err(ParseError::UnterminatedBlock(name));
            }
            if self.at_table_opener() {
                return Err(ParseError::NestedBlock(self.line()));
            }
            if self.check_keyword("indexes") && self.next_is(Token::LBrace) {
                self.pos += 2;
                self.parse_indexes_block(&mut index_names)?;
            } else {
                columns.push(self.parse_column_line(&name, refs)?);
            }
        }

        for index_name in index_names {
            match columns.iter_mut().find(|c| c.name == index_name) {
                Some(column) => column.attrs.index = true,
                None => warn!("table {name}: index names unknown column {index_name}, skipping"),
            }
        }

        Ok(TableDef { name, columns })
    }

    fn parse_indexes_block(&mut self, index_names: &mut Vec<String>) -> Result<(), ParseError> {
        loop {
            self.skip_newlines();
            match self.peek().clone() {
                Token::RBrace => {
                    self.pos += 1;
                    return Ok(());
                }
                Token::Eof => return Err(ParseError::UnterminatedBlock("indexes".into())),
                Token::Ident(s) | Token::Str(s) => {
                    self.pos += 1;
                    index_names.push(s);
                }
                Token::LParen => {
                    self.pos += 1;
                    loop {
                        match self.peek().clone() {
                            Token::RParen => {
                                self.pos += 1;
                                break;
                            }
                            Token::Ident(s) | Token::Str(s) => {
                                self.pos += 1;
                                index_names.push(s);
                            }
                            Token::Comma => self.pos += 1,
                            _ => {
                                return Err(ParseError::Unexpected {
                                    line: self.line(),
                                    expected: "column name",
                                });
                            }
                        }
                    }
                }
                Token::Comma => self.pos += 1,
                _ => {
                    return Err(ParseError::Unexpected {
                        line: self.line(),
                        expected: "index entry",
                    });
                }
            }
        }
    }

    fn parse_column_line(
        &mut self,
        table: &str,
        refs: &mut Vec<RefDef>,
    ) -> Result<ColumnDef, ParseError> {
        let line = self.line();
        let name = self.read_name().ok_or(ParseError::MalformedColumn(line))?;
        let mut typ = match self.peek().clone() {
            Token::Ident(s) => {
                self.pos += 1;
                s
            }
            _ => return Err(ParseError::MalformedColumn(line)),
        };

        // Optional size suffix: varchar(255)
        if *self.peek() == Token::LParen {
            self.pos += 1;
            let size = match self.advance() {
                Token::Num(n) => n,
                _ => return Err(ParseError::MalformedColumn(line)),
            };
            if self.advance() != Token::RParen {
                return Err(ParseError::MalformedColumn(line));
            }
            typ = format!("{typ}({size})");
        }

        let mut attrs = ColumnAttrs::default();
        if *self.peek() == Token::LBracket {
            self.pos += 1;
            self.parse_column_attrs(line, table, &name, &mut attrs, refs)?;
        }

        if !self.at_line_end() && *self.peek() != Token::RBrace {
            return Err(ParseError::MalformedColumn(line));
        }
        Ok(ColumnDef { name, typ, attrs })
    }

    fn parse_column_attrs(
        &mut self,
        line: usize,
        table: &str,
        column: &str,
        attrs: &mut ColumnAttrs,
        refs: &mut Vec<RefDef>,
    ) -> Result<(), ParseError> {
        loop {
            match self.peek().clone() {
                Token::RBracket => {
                    self.pos += 1;
                    return Ok(());
                }
                Token::Comma => self.pos += 1,
                Token::Newline | Token::Eof => return Err(ParseError::MalformedColumn(line)),
                Token::Ident(word) => {
                    if word.eq_ignore_ascii_case("pk") {
                        self.pos += 1;
                        attrs.pk = true;
                    } else if word.eq_ignore_ascii_case("increment") {
                        self.pos += 1;
                        attrs.increment = true;
                    } else if word.eq_ignore_ascii_case("unique") {
                        self.pos += 1;
                        attrs.unique = true;
                    } else if word.eq_ignore_ascii_case("index") {
                        self.pos += 1;
                        attrs.index = true;
                    } else if word.eq_ignore_ascii_case("not") && self.next_is_keyword("null") {
                        self.pos += 2;
                        attrs.not_null = true;
                    } else if word.eq_ignore_ascii_case("ref") && self.next_is(Token::Colon) {
                        self.pos += 2;
                        if *self.peek() != Token::Gt {
                            return Err(ParseError::MalformedColumn(line));
                        }
                        self.pos += 1;
                        let (to_table, to_column) = self
                            .parse_qualified()
                            .ok_or(ParseError::MalformedColumn(line))?;
                        refs.push(RefDef {
                            from_table: table.to_string(),
                            from_column: column.to_string(),
                            to_table,
                            to_column,
                            delete_cascade: false,
                            line,
                        });
                    } else {
                        // Unknown attributes are skipped, not rejected
                        warn!("line {line}: ignoring unknown column attribute: {word}");
                        self.skip_attr_item();
                    }
                }
                _ => {
                    warn!("line {line}: ignoring unknown column attribute");
                    self.skip_attr_item();
                }
            }
        }
    }

    /// Skip the remainder of one bracketed attribute item.
    fn skip_attr_item(&mut self) {
        loop {
            match self.peek() {
                Token::Comma | Token::RBracket | Token::Newline | Token::Eof => return,
                _ => self.pos += 1,
            }
        }
    }

    /// `<table>.<column>`
    fn parse_qualified(&mut self) -> Option<(String, String)> {
        let table = self.read_name()?;
        if *self.peek() != Token::Dot {
            return None;
        }
        self.pos += 1;
        let column = self.read_name()?;
        Some((table, column))
    }

    fn parse_ref(&mut self) -> Result<RefDef, ParseError> {
        let line = self.line();
        if *self.peek() != Token::Colon {
            return Err(ParseError::MalformedRef(line));
        }
        self.pos += 1;
        let (from_table, from_column) =
            self.parse_qualified().ok_or(ParseError::MalformedRef(line))?;
        if *self.peek() != Token::Gt {
            return Err(ParseError::MalformedRef(line));
        }
        self.pos += 1;
        let (to_table, to_column) =
            self.parse_qualified().ok_or(ParseError::MalformedRef(line))?;

        let mut delete_cascade = false;
        if *self.peek() == Token::LBracket {
            self.pos += 1;
            self.parse_ref_settings(line, &mut delete_cascade)?;
        }
        if !self.at_line_end() {
            return Err(ParseError::MalformedRef(line));
        }
        Ok(RefDef {
            from_table,
            from_column,
            to_table,
            to_column,
            delete_cascade,
            line,
        })
    }

    fn parse_ref_settings(
        &mut self,
        line: usize,
        delete_cascade: &mut bool,
    ) -> Result<(), ParseError> {
        loop {
            match self.peek().clone() {
                Token::RBracket => {
                    self.pos += 1;
                    return Ok(());
                }
                Token::Comma => self.pos += 1,
                Token::Newline | Token::Eof => return Err(ParseError::MalformedRef(line)),
                Token::Ident(word)
                    if word.eq_ignore_ascii_case("delete") && self.next_is(Token::Colon) =>
                {
                    self.pos += 2;
                    match self.advance() {
                        Token::Ident(action) if action.eq_ignore_ascii_case("cascade") => {
                            *delete_cascade = true;
                        }
                        Token::Ident(action) => {
                            warn!("line {line}: ignoring unknown delete action: {action}");
                        }
                        _ => return Err(ParseError::MalformedRef(line)),
                    }
                }
                _ => {
                    warn!("line {line}: ignoring unknown reference setting");
                    self.skip_attr_item();
                }
            }
        }
    }
}
