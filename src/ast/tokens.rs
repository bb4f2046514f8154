use chrono::NaiveDateTime;

use crate::lexer::Position;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Integer literal, kept as written
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0
    /// ```
    Integer(String),

    /// Decimal literal, kept as written so the scale survives printing
    ///
    /// # Examples
    /// ```text
    /// 1.2
    /// 3.50
    /// ```
    Decimal(String),

    /// String literal enclosed in single quotes
    ///
    /// # Examples
    /// ```text
    /// 'hello'
    /// 'fish%'
    /// ```
    String(String),

    /// Single-quoted literal matching `YYYY-MM-DD HH:MM:SS.mmm`
    ///
    /// # Examples
    /// ```text
    /// '2003-04-30 14:12:30.333'
    /// ```
    DateTime(NaiveDateTime),

    /// Boolean values
    ///
    /// # Examples
    /// ```text
    /// true
    /// FALSE
    /// ```
    Boolean(bool),

    // Identifiers
    /// Alias, class or field name
    ///
    /// Must start with letter or underscore, followed by letters, digits, or underscores.
    /// Dotted paths are separate identifier and dot tokens.
    ///
    /// # Examples
    /// ```text
    /// Company
    /// c_
    /// vatNumber
    /// ```
    Identifier(String),

    // Keywords (matched case-insensitively)
    Select,
    From,
    Where,
    As,
    And,
    Or,
    Not,
    /// `CONTAINS`
    Contains,
    /// `DOES`, first word of `DOES NOT CONTAIN`
    Does,
    /// `CONTAIN`, last word of `DOES NOT CONTAIN`
    Contain,
    Like,
    In,
    Is,
    Null,
    Group,
    Order,
    By,

    // Function names
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Substr,

    // Comparison
    /// `=`
    Eq,
    /// `!=` or `<>`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,

    // Arithmetic
    Plus,
    Minus,
    /// Multiplication, or the `COUNT(*)` wildcard
    Star,
    Slash,

    // Delimiters
    LParen,
    RParen,
    Comma,
    Dot,

    /// End of input
    Eof,
}

impl Token {
    /// Map a word to its keyword token, if it is one.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word.to_ascii_lowercase().as_str() {
            "select" => Token::Select,
            "from" => Token::From,
            "where" => Token::Where,
            "as" => Token::As,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "contains" => Token::Contains,
            "does" => Token::Does,
            "contain" => Token::Contain,
            "like" => Token::Like,
            "in" => Token::In,
            "is" => Token::Is,
            "null" => Token::Null,
            "group" => Token::Group,
            "order" => Token::Order,
            "by" => Token::By,
            "count" => Token::Count,
            "sum" => Token::Sum,
            "avg" => Token::Avg,
            "min" => Token::Min,
            "max" => Token::Max,
            "substr" => Token::Substr,
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            _ => return None,
        };
        Some(token)
    }

    /// How the token is named when the parser says it expected one.
    pub fn describe(&self) -> String {
        match self {
            Token::Integer(_) => "integer".to_string(),
            Token::Decimal(_) => "decimal".to_string(),
            Token::String(_) => "string".to_string(),
            Token::DateTime(_) => "date".to_string(),
            Token::Boolean(_) => "boolean".to_string(),
            Token::Identifier(_) => "identifier".to_string(),
            Token::Select => "SELECT".to_string(),
            Token::From => "FROM".to_string(),
            Token::Where => "WHERE".to_string(),
            Token::As => "AS".to_string(),
            Token::And => "AND".to_string(),
            Token::Or => "OR".to_string(),
            Token::Not => "NOT".to_string(),
            Token::Contains => "CONTAINS".to_string(),
            Token::Does => "DOES".to_string(),
            Token::Contain => "CONTAIN".to_string(),
            Token::Like => "LIKE".to_string(),
            Token::In => "IN".to_string(),
            Token::Is => "IS".to_string(),
            Token::Null => "NULL".to_string(),
            Token::Group => "GROUP".to_string(),
            Token::Order => "ORDER".to_string(),
            Token::By => "BY".to_string(),
            Token::Count => "COUNT".to_string(),
            Token::Sum => "SUM".to_string(),
            Token::Avg => "AVG".to_string(),
            Token::Min => "MIN".to_string(),
            Token::Max => "MAX".to_string(),
            Token::Substr => "SUBSTR".to_string(),
            Token::Eq => "'='".to_string(),
            Token::NotEq => "'!='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::LtEq => "'<='".to_string(),
            Token::GtEq => "'>='".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// A token with the text it was read from and where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub text: String,
    pub position: Position,
}

impl Spanned {
    /// The token as it appears in a "found ..." diagnostic.
    pub fn found(&self) -> String {
        match self.token {
            Token::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}
