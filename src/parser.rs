use crate::{
    error::{ReadErrorKind, SlinkError},
    reader::{Reader, Token},
    value::{List, Value},
};

type ParseResult<O> = Result<O, SlinkError>;


fn parse_list(reader: &mut Reader<'_>) -> ParseResult<Value> {
    let mut elements = vec![];
    loop {
        match reader.peek()? {
            Token::RightParen => break,
            Token::End => return Err(SlinkError::read(ReadErrorKind::UnterminatedList, "missing closing parenthesis")),
            _ => elements.push(parse(reader)?),
        }
    }
    reader.next_token()?;

    Ok(Value::List(elements.into_iter().collect::<List>()))
}

/// Reads one expression from the token stream
pub fn parse(reader: &mut Reader<'_>) -> ParseResult<Value> {
    match reader.next_token()? {
        Token::Symbol(name) => Ok(Value::symbol(name)),
        Token::Nil => Ok(Value::NIL),
        Token::True => Ok(Value::True),
        Token::Number(value) => Ok(Value::Integer(value)),
        Token::Str(text) => Ok(Value::string(text)),
        Token::LeftParen => parse_list(reader),
        Token::Quote => Ok(Value::quoted(parse(reader)?)),
        Token::RightParen => Err(SlinkError::read(ReadErrorKind::UnexpectedCloseParen, "unexpected ')'")),
        Token::End => Err(SlinkError::read(ReadErrorKind::UnexpectedEnd, "expected an expression but reached end of input")),
    }
}

/// Reads every expression in `input`
pub fn parse_all(input: &str) -> ParseResult<Vec<Value>> {
    let mut reader = Reader::new(input);
    let mut expressions = vec![];
    while !reader.at_end()? {
        expressions.push(parse(&mut reader)?);
    }
    Ok(expressions)
}

/// Reads exactly one expression; anything after it is an error
pub fn parse_str(input: &str) -> ParseResult<Value> {
    let mut reader = Reader::new(input);
    let expression = parse(&mut reader)?;
    match reader.next_token()? {
        Token::End => Ok(expression),
        Token::RightParen => Err(SlinkError::read(ReadErrorKind::UnexpectedCloseParen, "unexpected ')'")),
        token => Err(SlinkError::read(ReadErrorKind::TrailingInput, format!("trailing input after expression: {:?}", token))),
    }
}
