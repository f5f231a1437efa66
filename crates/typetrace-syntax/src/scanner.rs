//! Tokenizer for the type-expression language.
//!
//! Scans the whole input eagerly into a token vector. Template literals are
//! split TypeScript-style into `TemplateHead` / `TemplateMiddle` /
//! `TemplateTail` (or a single `NoSubstitutionTemplate`), with a mode stack so
//! a `}` that closes an interpolation hole is rescanned as a template
//! continuation rather than a closing brace.

use crate::parser::ParseError;

/// Token kinds recognized by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKind {
    Identifier,
    StringLiteral,
    NumericLiteral,
    /// A backtick string with no interpolation holes.
    NoSubstitutionTemplate,
    /// `` `text${ ``
    TemplateHead,
    /// `}text${`
    TemplateMiddle,
    /// `` }text` ``
    TemplateTail,

    TypeKeyword,
    ExtendsKeyword,
    InferKeyword,
    InKeyword,
    KeyofKeyword,
    ReadonlyKeyword,
    TrueKeyword,
    FalseKeyword,

    LessThan,
    GreaterThan,
    Comma,
    Bar,
    Ampersand,
    Question,
    Colon,
    Semicolon,
    Equals,
    Minus,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,

    EndOfFile,
}

/// A scanned token. `text` is the raw lexeme; for string and template tokens
/// `value` holds the cooked (unquoted) text.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: SyntaxKind,
    pub text: String,
    pub value: String,
    pub pos: usize,
}

struct Scanner<'a> {
    src: &'a [u8],
    pos: usize,
    /// One entry per open template literal; the value is the brace nesting
    /// depth inside the current interpolation hole.
    template_stack: Vec<u32>,
}

/// Tokenize `source`, returning the token list terminated by `EndOfFile`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut scanner = Scanner {
        src: source.as_bytes(),
        pos: 0,
        template_stack: Vec::new(),
    };
    let mut tokens = Vec::new();
    loop {
        let token = scanner.scan()?;
        let done = token.kind == SyntaxKind::EndOfFile;
        tokens.push(token);
        if done {
            break;
        }
    }
    tracing::trace!(count = tokens.len(), "tokenized type source");
    Ok(tokens)
}

impl<'a> Scanner<'a> {
    fn scan(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia();
        let start = self.pos;
        let Some(&ch) = self.src.get(self.pos) else {
            return Ok(self.token(SyntaxKind::EndOfFile, start));
        };

        match ch {
            b'<' => self.punct(SyntaxKind::LessThan, start),
            b'>' => self.punct(SyntaxKind::GreaterThan, start),
            b',' => self.punct(SyntaxKind::Comma, start),
            b'|' => self.punct(SyntaxKind::Bar, start),
            b'&' => self.punct(SyntaxKind::Ampersand, start),
            b'?' => self.punct(SyntaxKind::Question, start),
            b':' => self.punct(SyntaxKind::Colon, start),
            b';' => self.punct(SyntaxKind::Semicolon, start),
            b'=' => self.punct(SyntaxKind::Equals, start),
            b'-' => self.punct(SyntaxKind::Minus, start),
            b'[' => self.punct(SyntaxKind::OpenBracket, start),
            b']' => self.punct(SyntaxKind::CloseBracket, start),
            b'(' => self.punct(SyntaxKind::OpenParen, start),
            b')' => self.punct(SyntaxKind::CloseParen, start),
            b'{' => {
                if let Some(depth) = self.template_stack.last_mut() {
                    *depth += 1;
                }
                self.punct(SyntaxKind::OpenBrace, start)
            }
            b'}' => {
                match self.template_stack.last_mut() {
                    Some(0) => {
                        // Closes an interpolation hole: rescan as template part.
                        self.scan_template_continuation(start)
                    }
                    Some(depth) => {
                        *depth -= 1;
                        self.punct(SyntaxKind::CloseBrace, start)
                    }
                    None => self.punct(SyntaxKind::CloseBrace, start),
                }
            }
            b'`' => {
                self.pos += 1;
                self.scan_template_part(start, true)
            }
            b'"' | b'\'' => self.scan_string(start, ch),
            b'0'..=b'9' => Ok(self.scan_number(start)),
            _ if is_identifier_start(ch) => Ok(self.scan_identifier(start)),
            _ => Err(ParseError::new(
                format!("Unexpected character `{}`", ch as char),
                start,
            )),
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(&ch) = self.src.get(self.pos) {
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'/' if self.src.get(self.pos + 1) == Some(&b'/') => {
                    while self.pos < self.src.len() && self.src[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                b'/' if self.src.get(self.pos + 1) == Some(&b'*') => {
                    self.pos += 2;
                    while self.pos < self.src.len() {
                        if self.src[self.pos] == b'*' && self.src.get(self.pos + 1) == Some(&b'/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn punct(&mut self, kind: SyntaxKind, start: usize) -> Result<Token, ParseError> {
        self.pos += 1;
        Ok(self.token(kind, start))
    }

    fn token(&self, kind: SyntaxKind, start: usize) -> Token {
        let text = self.lexeme(start);
        Token {
            kind,
            value: text.clone(),
            text,
            pos: start,
        }
    }

    fn lexeme(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
    }

    fn scan_string(&mut self, start: usize, quote: u8) -> Result<Token, ParseError> {
        self.pos += 1;
        // Accumulate raw bytes; the input is valid UTF-8 and multi-byte
        // sequences pass through untouched.
        let mut value = Vec::new();
        loop {
            match self.src.get(self.pos) {
                None | Some(b'\n') => {
                    return Err(ParseError::new("Unterminated string literal", start));
                }
                Some(&ch) if ch == quote => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    if let Some(&escaped) = self.src.get(self.pos) {
                        value.push(unescape(escaped));
                        self.pos += 1;
                    }
                }
                Some(&ch) => {
                    value.push(ch);
                    self.pos += 1;
                }
            }
        }
        Ok(Token {
            kind: SyntaxKind::StringLiteral,
            text: self.lexeme(start),
            value: String::from_utf8_lossy(&value).into_owned(),
            pos: start,
        })
    }

    fn scan_number(&mut self, start: usize) -> Token {
        while self
            .src
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_digit() || *c == b'.' || *c == b'_')
        {
            self.pos += 1;
        }
        let text = self.lexeme(start).replace('_', "");
        Token {
            kind: SyntaxKind::NumericLiteral,
            value: text.clone(),
            text,
            pos: start,
        }
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        while self.src.get(self.pos).is_some_and(|&c| is_identifier_part(c)) {
            self.pos += 1;
        }
        let text = self.lexeme(start);
        let kind = match text.as_str() {
            "type" => SyntaxKind::TypeKeyword,
            "extends" => SyntaxKind::ExtendsKeyword,
            "infer" => SyntaxKind::InferKeyword,
            "in" => SyntaxKind::InKeyword,
            "keyof" => SyntaxKind::KeyofKeyword,
            "readonly" => SyntaxKind::ReadonlyKeyword,
            "true" => SyntaxKind::TrueKeyword,
            "false" => SyntaxKind::FalseKeyword,
            _ => SyntaxKind::Identifier,
        };
        Token {
            kind,
            value: text.clone(),
            text,
            pos: start,
        }
    }

    /// Scan template text from just after a backtick (`opening` true) or just
    /// after the `}` that closed an interpolation hole.
    fn scan_template_part(&mut self, start: usize, opening: bool) -> Result<Token, ParseError> {
        // Raw bytes, as in scan_string: multi-byte UTF-8 passes through.
        let mut value = Vec::new();
        loop {
            match self.src.get(self.pos) {
                None => return Err(ParseError::new("Unterminated template literal", start)),
                Some(b'`') => {
                    self.pos += 1;
                    if !opening {
                        self.template_stack.pop();
                    }
                    let kind = if opening {
                        SyntaxKind::NoSubstitutionTemplate
                    } else {
                        SyntaxKind::TemplateTail
                    };
                    return Ok(Token {
                        kind,
                        text: self.lexeme(start),
                        value: String::from_utf8_lossy(&value).into_owned(),
                        pos: start,
                    });
                }
                Some(b'$') if self.src.get(self.pos + 1) == Some(&b'{') => {
                    self.pos += 2;
                    if opening {
                        self.template_stack.push(0);
                    }
                    let kind = if opening {
                        SyntaxKind::TemplateHead
                    } else {
                        SyntaxKind::TemplateMiddle
                    };
                    return Ok(Token {
                        kind,
                        text: self.lexeme(start),
                        value: String::from_utf8_lossy(&value).into_owned(),
                        pos: start,
                    });
                }
                Some(b'\\') => {
                    self.pos += 1;
                    if let Some(&escaped) = self.src.get(self.pos) {
                        value.push(unescape(escaped));
                        self.pos += 1;
                    }
                }
                Some(&ch) => {
                    value.push(ch);
                    self.pos += 1;
                }
            }
        }
    }

    fn scan_template_continuation(&mut self, start: usize) -> Result<Token, ParseError> {
        debug_assert_eq!(self.src.get(self.pos), Some(&b'}'));
        self.pos += 1;
        self.scan_template_part(start, false)
    }
}

fn unescape(ch: u8) -> u8 {
    match ch {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        b'0' => b'\0',
        other => other,
    }
}

fn is_identifier_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_' || ch == b'$'
}

fn is_identifier_part(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_conditional_type_tokens() {
        assert_eq!(
            kinds("T extends string ? 1 : 2"),
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::ExtendsKeyword,
                SyntaxKind::Identifier,
                SyntaxKind::Question,
                SyntaxKind::NumericLiteral,
                SyntaxKind::Colon,
                SyntaxKind::NumericLiteral,
                SyntaxKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn scans_template_with_hole() {
        let tokens = tokenize("`get${K}`").unwrap();
        assert_eq!(tokens[0].kind, SyntaxKind::TemplateHead);
        assert_eq!(tokens[0].value, "get");
        assert_eq!(tokens[1].kind, SyntaxKind::Identifier);
        assert_eq!(tokens[2].kind, SyntaxKind::TemplateTail);
        assert_eq!(tokens[2].value, "");
    }

    #[test]
    fn scans_no_substitution_template() {
        let tokens = tokenize("`hello`").unwrap();
        assert_eq!(tokens[0].kind, SyntaxKind::NoSubstitutionTemplate);
        assert_eq!(tokens[0].value, "hello");
    }

    #[test]
    fn template_hole_may_contain_braced_type() {
        let tokens = tokenize("`a${{ x: 1 }}b`").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert!(kinds.contains(&SyntaxKind::TemplateHead));
        assert!(kinds.contains(&SyntaxKind::OpenBrace));
        assert!(kinds.contains(&SyntaxKind::CloseBrace));
        assert!(kinds.contains(&SyntaxKind::TemplateTail));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize("\"abc").is_err());
    }

    #[test]
    fn string_values_keep_multibyte_text() {
        let tokens = tokenize("\"café\"").unwrap();
        assert_eq!(tokens[0].kind, SyntaxKind::StringLiteral);
        assert_eq!(tokens[0].value, "café");
    }

    #[test]
    fn template_values_keep_multibyte_text() {
        let tokens = tokenize("`pre-日${K}`").unwrap();
        assert_eq!(tokens[0].kind, SyntaxKind::TemplateHead);
        assert_eq!(tokens[0].value, "pre-日");
    }
}
