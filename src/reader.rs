use logos::Logos;

use crate::error::{ReadErrorKind, SlinkError};


#[derive(Debug, Logos)]
#[logos(skip r"\s+")]
enum RawToken<'a> {
    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("'")]
    Quote,

    #[regex(r#""[^"]*""#, |lex| { let slice = lex.slice(); &slice[1..slice.len() - 1] })]
    Str(&'a str),

    #[regex(r#"[^\s()'"]+"#, |lex| lex.slice())]
    Word(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    LeftParen,
    RightParen,
    Quote,
    Nil,
    True,
    Number(i64),
    Symbol(&'a str),
    Str(&'a str),
    End,
}

impl<'a> Token<'a> {
    // Words are re-classified after lexing: the two reserved atoms first,
    // then anything that is entirely a base-10 integer that fits in an i64
    fn classify(word: &'a str) -> Self {
        match word {
            "nil" => Self::Nil,
            "t" => Self::True,
            word => word.parse().map_or(Self::Symbol(word), Self::Number),
        }
    }
}

/// Pull-based token stream with a single token of lookahead.
///
/// Once the input is exhausted the reader keeps producing [Token::End],
/// so callers decide when to stop pulling.
pub struct Reader<'a> {
    lexer: logos::Lexer<'a, RawToken<'a>>,
    peeked: Option<Token<'a>>,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { lexer: RawToken::lexer(input), peeked: None }
    }

    fn pull(&mut self) -> Result<Token<'a>, SlinkError> {
        match self.lexer.next() {
            None => Ok(Token::End),
            Some(Ok(RawToken::LeftParen)) => Ok(Token::LeftParen),
            Some(Ok(RawToken::RightParen)) => Ok(Token::RightParen),
            Some(Ok(RawToken::Quote)) => Ok(Token::Quote),
            Some(Ok(RawToken::Str(text))) => Ok(Token::Str(text)),
            Some(Ok(RawToken::Word(word))) => Ok(Token::classify(word)),
            // Every character other than an unmatched double quote starts a word
            Some(Err(())) => Err(SlinkError::read(
                ReadErrorKind::UnterminatedString,
                format!("end of input reached inside string literal at offset {}", self.lexer.span().start),
            )),
        }
    }

    pub fn peek(&mut self) -> Result<Token<'a>, SlinkError> {
        if let Some(token) = self.peeked {
            return Ok(token)
        }
        let token = self.pull()?;
        self.peeked = Some(token);
        Ok(token)
    }

    pub fn next_token(&mut self) -> Result<Token<'a>, SlinkError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.pull(),
        }
    }

    pub fn at_end(&mut self) -> Result<bool, SlinkError> {
        Ok(self.peek()? == Token::End)
    }
}
