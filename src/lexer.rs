use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Num(i64),

    LBrace,   // {
    RBrace,   // }
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Comma,    // ,
    Colon,    // :
    Dot,      // .
    Gt,       // >
    Newline,  // \n (the grammar is line-oriented)

    Eof,
}

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("line {1}: unexpected character: {0}")]
    UnexpectedChar(char, usize),
    #[error("line {0}: unterminated string")]
    UnterminatedString(usize),
    #[error("line {1}: invalid number: {0}")]
    InvalidNumber(String, usize),
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.chars.peek() {
                // Newlines are tokens, never skipped
                Some('\n') => break,
                Some(c) if c.is_whitespace() => {
                    self.chars.next();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    if ahead.peek() != Some(&'/') {
                        break;
                    }
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.chars.next();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_ident(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some('"') => return Ok(s),
                Some('\\') => {
                    if let Some(c) = self.chars.next() {
                        s.push(c);
                    }
                }
                Some('\n') | None => return Err(LexError::UnterminatedString(self.line)),
                Some(c) => s.push(c),
            }
        }
    }

    fn read_number(&mut self, first: char) -> Result<i64, LexError> {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s.parse().map_err(|_| LexError::InvalidNumber(s, self.line))
    }

    pub fn next_token(&mut self) -> Result<(Token, usize), LexError> {
        self.skip_whitespace_and_comments();

        let line = self.line;
        let c = match self.chars.next() {
            Some(c) => c,
            None => return Ok((Token::Eof, line)),
        };

        let tok = match c {
            '\n' => {
                self.line += 1;
                Token::Newline
            }
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            ':' => Token::Colon,
            '.' => Token::Dot,
            '>' => Token::Gt,
            '"' => Token::Str(self.read_string()?),
            c if c.is_ascii_digit() => Token::Num(self.read_number(c)?),
            c if c.is_alphabetic() || c == '_' => Token::Ident(self.read_ident(c)),
            _ => return Err(LexError::UnexpectedChar(c, line)),
        };

        Ok((tok, line))
    }

    pub fn tokenize(mut self) -> Result<Vec<(Token, usize)>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            if tok.0 == Token::Eof {
                tokens.push(tok);
                break;
            }
            tokens.push(tok);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds("Table team { }"),
            vec![
                Token::Ident("Table".into()),
                Token::Ident("team".into()),
                Token::LBrace,
                Token::RBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_column_line() {
        assert_eq!(
            kinds("id int [pk, increment]"),
            vec![
                Token::Ident("id".into()),
                Token::Ident("int".into()),
                Token::LBracket,
                Token::Ident("pk".into()),
                Token::Comma,
                Token::Ident("increment".into()),
                Token::RBracket,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_ref_symbols() {
        assert_eq!(
            kinds("Ref: hero.team_id > team.id"),
            vec![
                Token::Ident("Ref".into()),
                Token::Colon,
                Token::Ident("hero".into()),
                Token::Dot,
                Token::Ident("team_id".into()),
                Token::Gt,
                Token::Ident("team".into()),
                Token::Dot,
                Token::Ident("id".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_newlines() {
        let toks = kinds("// header\nid int // trailing\nname string");
        assert_eq!(
            toks,
            vec![
                Token::Newline,
                Token::Ident("id".into()),
                Token::Ident("int".into()),
                Token::Newline,
                Token::Ident("name".into()),
                Token::Ident("string".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_line_numbers() {
        let tokens = Lexer::new("a\nb\nc").tokenize().unwrap();
        let lines: Vec<usize> = tokens.iter().map(|(_, l)| *l).collect();
        assert_eq!(lines, vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_quoted_name() {
        assert_eq!(
            kinds(r#"Table "user accounts" {"#),
            vec![
                Token::Ident("Table".into()),
                Token::Str("user accounts".into()),
                Token::LBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_sized_type() {
        assert_eq!(
            kinds("name varchar(255)"),
            vec![
                Token::Ident("name".into()),
                Token::Ident("varchar".into()),
                Token::LParen,
                Token::Num(255),
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("Table \"oops\n").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString(1)));
    }

    #[test]
    fn test_unexpected_char() {
        let err = Lexer::new("id int ;").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnexpectedChar(';', 1)));
    }
}
