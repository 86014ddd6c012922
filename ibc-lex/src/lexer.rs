use crate::token::{Token, TokenKind};
use ibc_util::{Error, Position, Result};

/// Word-like keyword lexemes, longest-first within a prefix family so
/// e.g. `loop while` is matched before the bare `while` it contains.
/// A match is only accepted when the following character is absent, a
/// space, or a newline — anything else (including punctuation like `(`)
/// means the candidate is lexed as an identifier instead.
const WORD_TABLE: &[(&str, TokenKind)] = &[
    ("loop while", TokenKind::While),
    ("loop for", TokenKind::For),
    ("else if", TokenKind::ElseIf),
    ("while", TokenKind::While),
    ("return", TokenKind::Return),
    ("method", TokenKind::Method),
    ("false", TokenKind::False),
    ("else", TokenKind::Else),
    ("from", TokenKind::From),
    ("true", TokenKind::True),
    ("mod", TokenKind::Mod),
    ("div", TokenKind::Div),
    ("and", TokenKind::And),
    ("not", TokenKind::Not),
    ("for", TokenKind::For),
    ("then", TokenKind::Then),
    ("to", TokenKind::To),
    ("or", TokenKind::Or),
    ("if", TokenKind::If),
];

/// Symbol lexemes, longest-first within a prefix family (`+=` before `+`,
/// `==` before `=`, etc).
const SYMBOL_TABLE: &[(&str, TokenKind)] = &[
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::LessEq),
    (">=", TokenKind::GreaterEq),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("=", TokenKind::Eq),
    ("<", TokenKind::Less),
    (">", TokenKind::Greater),
    ("!", TokenKind::Bang),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
    ("\t", TokenKind::Tab),
    ("\n", TokenKind::Newline),
];

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Single left-to-right scan over cleaned source text producing a
/// positioned token stream.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at_byte(&self, byte_offset: usize) -> Option<char> {
        self.src[self.pos + byte_offset..].chars().next()
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let Some(c) = self.peek() else {
                tokens.push(Token::new("", TokenKind::Eof, self.pos));
                break;
            };
            let start = self.pos;

            if self.rest().starts_with("//") {
                self.skip_line_comment();
                continue;
            }

            if c != '\t' && c != '\n' && c.is_whitespace() {
                self.pos += c.len_utf8();
                continue;
            }

            if let Some(tok) = self.try_word_table(start)? {
                tokens.push(tok);
                continue;
            }

            if c.is_ascii_digit() || (c == '.' && self.peek_at_byte(1).map(|d| d.is_ascii_digit()).unwrap_or(false)) {
                tokens.push(self.lex_number(start)?);
                continue;
            }

            if let Some(tok) = self.try_symbol_table(start)? {
                tokens.push(tok);
                continue;
            }

            if c == '\'' {
                tokens.push(self.lex_char_literal(start)?);
                continue;
            }

            if c == '"' {
                tokens.push(self.lex_string_literal(start)?);
                continue;
            }

            if c.is_ascii_alphabetic() || c == '_' {
                tokens.push(self.lex_identifier(start));
                continue;
            }

            self.pos += c.len_utf8();
            tokens.push(Token::new(c.to_string(), TokenKind::Unknown(c), start));
        }
        Ok(tokens)
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn try_word_table(&mut self, start: usize) -> Result<Option<Token>> {
        for (lexeme, kind) in WORD_TABLE {
            if self.rest().starts_with(lexeme) {
                let after = self.peek_at_byte(lexeme.len());
                let boundary = matches!(after, None | Some(' ') | Some('\n'));
                if boundary {
                    self.pos += lexeme.len();
                    return Ok(Some(Token::new(*lexeme, kind.clone(), start)));
                }
            }
        }
        Ok(None)
    }

    fn try_symbol_table(&mut self, start: usize) -> Result<Option<Token>> {
        for (lexeme, kind) in SYMBOL_TABLE {
            if self.rest().starts_with(lexeme) {
                self.pos += lexeme.len();
                return Ok(Some(Token::new(*lexeme, kind.clone(), start)));
            }
        }
        Ok(None)
    }

    fn lex_number(&mut self, start: usize) -> Result<Token> {
        let mut end = start;
        while self.peek_at_rel(end - start).map(|c| c.is_ascii_digit()).unwrap_or(false) {
            end += 1;
        }
        let mut is_float = false;
        if self.peek_at_rel(end - start) == Some('.') {
            let mut probe = end + 1;
            if self.src[probe..].chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                is_float = true;
                probe += 1;
                while self.src[probe..].chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                    probe += 1;
                }
                end = probe;
            }
        }
        let lexeme = &self.src[start..end];
        self.pos = end;
        if is_float {
            let value: f64 = lexeme.parse().map_err(|_| {
                Error::lexing(format!("malformed float literal '{lexeme}'"))
                    .set_pos_if_unset(Position::new(start))
            })?;
            Ok(Token::new(lexeme, TokenKind::FloatLit(value), start))
        } else {
            let value: i64 = lexeme.parse().map_err(|_| {
                Error::lexing(format!("malformed integer literal '{lexeme}'"))
                    .set_pos_if_unset(Position::new(start))
            })?;
            Ok(Token::new(lexeme, TokenKind::IntLit(value), start))
        }
    }

    fn peek_at_rel(&self, rel: usize) -> Option<char> {
        self.src[self.pos + rel..].chars().next()
    }

    fn lex_escape(&mut self, backslash_pos: usize) -> Result<char> {
        // self.pos is positioned just past the backslash.
        let c = self.peek().ok_or_else(|| {
            Error::lexing("unterminated escape sequence").set_pos_if_unset(Position::new(backslash_pos))
        })?;
        let simple = match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'a' => Some('\u{7}'),
            'b' => Some('\u{8}'),
            'f' => Some('\u{c}'),
            'r' => Some('\r'),
            'v' => Some('\u{b}'),
            '\\' => Some('\\'),
            '?' => Some('?'),
            '\'' => Some('\''),
            '"' => Some('"'),
            _ => None,
        };
        if let Some(ch) = simple {
            self.pos += c.len_utf8();
            return Ok(ch);
        }
        if c.is_digit(8) {
            let mut digits = String::new();
            for _ in 0..3 {
                match self.peek() {
                    Some(d) if d.is_digit(8) => {
                        digits.push(d);
                        self.pos += d.len_utf8();
                    }
                    _ => break,
                }
            }
            let value = u32::from_str_radix(&digits, 8).unwrap_or(0);
            return Ok(char::from_u32(value).unwrap_or('\0'));
        }
        if c == 'x' {
            self.pos += c.len_utf8();
            let mut digits = String::new();
            while let Some(d) = self.peek() {
                if d.is_ascii_hexdigit() {
                    digits.push(d);
                    self.pos += d.len_utf8();
                } else {
                    break;
                }
            }
            if digits.is_empty() {
                return Err(Error::lexing("\\x escape with no hex digits")
                    .set_pos_if_unset(Position::new(backslash_pos)));
            }
            let value = u32::from_str_radix(&digits, 16).unwrap_or(0);
            return Ok(char::from_u32(value).unwrap_or('\0'));
        }
        Err(Error::lexing(format!("unknown escape sequence '\\{c}'"))
            .set_pos_if_unset(Position::new(backslash_pos)))
    }

    fn lex_char_literal(&mut self, start: usize) -> Result<Token> {
        self.pos += 1; // opening quote
        let backslash_pos = self.pos;
        let ch = match self.peek() {
            Some('\\') => {
                self.pos += 1;
                self.lex_escape(backslash_pos)?
            }
            Some(c) if c != '\'' => {
                self.pos += c.len_utf8();
                c
            }
            _ => {
                return Err(
                    Error::lexing("unterminated character literal").set_pos_if_unset(Position::new(start))
                )
            }
        };
        if self.peek() != Some('\'') {
            return Err(
                Error::lexing("unterminated character literal").set_pos_if_unset(Position::new(start))
            );
        }
        self.pos += 1; // closing quote
        let lexeme = &self.src[start..self.pos];
        Ok(Token::new(lexeme, TokenKind::CharLit(ch), start))
    }

    fn lex_string_literal(&mut self, start: usize) -> Result<Token> {
        self.pos += 1; // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(Error::lexing("unterminated string literal")
                        .set_pos_if_unset(Position::new(start)))
                }
                Some('"') => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => {
                    let backslash_pos = self.pos;
                    self.pos += 1;
                    value.push(self.lex_escape(backslash_pos)?);
                }
                Some(c) => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
        let lexeme = self.src[start..self.pos].to_string();
        Ok(Token::new(lexeme, TokenKind::StrLit(value), start))
    }

    fn lex_identifier(&mut self, start: usize) -> Token {
        let mut end = start;
        while self.src[end..].chars().next().map(is_ident_char).unwrap_or(false) {
            end += self.src[end..].chars().next().unwrap().len_utf8();
        }
        self.pos = end;
        let lexeme = self.src[start..end].to_string();
        Token::new(lexeme.clone(), TokenKind::Identifier(lexeme), start)
    }
}

pub fn tokenize(src: &str) -> Result<Vec<Token>> {
    Lexer::new(src).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keyword_requires_word_boundary() {
        assert_eq!(kinds("while"), vec![TokenKind::While]);
        assert_eq!(
            kinds("whiletrue"),
            vec![TokenKind::Identifier("whiletrue".into())]
        );
    }

    #[test]
    fn keyword_abutting_punctuation_is_an_identifier() {
        assert_eq!(
            kinds("while(x<10)"),
            vec![
                TokenKind::Identifier("while".into()),
                TokenKind::LParen,
                TokenKind::Identifier("x".into()),
                TokenKind::Less,
                TokenKind::IntLit(10),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn loop_while_matches_before_while() {
        assert_eq!(kinds("loop while"), vec![TokenKind::While]);
    }

    #[test]
    fn else_if_matches_before_else() {
        assert_eq!(kinds("else if"), vec![TokenKind::ElseIf]);
    }

    #[test]
    fn longest_symbol_match_wins() {
        assert_eq!(kinds("+="), vec![TokenKind::PlusEq]);
        assert_eq!(kinds("++"), vec![TokenKind::PlusPlus]);
        assert_eq!(kinds("=="), vec![TokenKind::EqEq]);
    }

    #[test]
    fn integer_and_float_literals() {
        assert_eq!(kinds("42"), vec![TokenKind::IntLit(42)]);
        assert_eq!(kinds("3.5"), vec![TokenKind::FloatLit(3.5)]);
        assert_eq!(kinds(".5"), vec![TokenKind::FloatLit(0.5)]);
    }

    #[test]
    fn string_literal_with_escapes() {
        assert_eq!(
            kinds("\"a\\nb\""),
            vec![TokenKind::StrLit("a\nb".to_string())]
        );
    }

    #[test]
    fn char_literal_with_escape() {
        assert_eq!(kinds("'\\t'"), vec![TokenKind::CharLit('\t')]);
    }

    #[test]
    fn unknown_escape_is_lexing_error() {
        assert!(tokenize("\"\\q\"").is_err());
    }

    #[test]
    fn unterminated_char_literal_is_lexing_error() {
        assert!(tokenize("'a").is_err());
    }

    #[test]
    fn line_comment_consumes_rest_of_line() {
        assert_eq!(
            kinds("x // comment\ny"),
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Newline,
                TokenKind::Identifier("y".into()),
            ]
        );
    }

    #[test]
    fn stray_character_is_unknown_token() {
        assert_eq!(kinds("@"), vec![TokenKind::Unknown('@')]);
    }

    #[test]
    fn tabs_and_newlines_are_tokens() {
        assert_eq!(
            kinds("\tx\n"),
            vec![
                TokenKind::Tab,
                TokenKind::Identifier("x".into()),
                TokenKind::Newline
            ]
        );
    }

    #[quickcheck_macros::quickcheck]
    fn non_negative_int_literal_round_trips(n: u32) -> bool {
        match tokenize(&n.to_string()) {
            Ok(tokens) => matches!(tokens[0].kind, TokenKind::IntLit(v) if v == n as i64),
            Err(_) => false,
        }
    }
}
