use std::mem;

use crate::{
    ast::{ArithOp, CompareOp, Constraint, Expr, FromItem, Function, Query, SelectItem, Spanned, Token},
    error::CompileError,
    lexer::Lexer,
};

/// Default bound on nested parentheses, function calls, subqueries and NOT prefixes.
pub const DEFAULT_MAX_DEPTH: usize = 32;

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self, CompileError> {
        let tokens = lexer.tokenize()?;
        Ok(Parser {
            tokens,
            pos: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Number of tokens read, including the end marker.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn current(&self) -> &Spanned {
        &self.tokens[self.pos]
    }

    fn peek(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index].token
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current().token) == mem::discriminant(token)
    }

    fn error(&self, expected: impl Into<String>) -> CompileError {
        let current = self.current();
        CompileError::syntax(current.position, expected, current.found())
    }

    fn expect(&mut self, expected: Token) -> Result<(), CompileError> {
        if !self.check(&expected) {
            return Err(self.error(expected.describe()));
        }
        self.advance();
        Ok(())
    }

    fn expect_identifier(&mut self) -> Result<String, CompileError> {
        match &self.current().token {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("identifier")),
        }
    }

    /// Field names and column aliases may be spelled like keywords, e.g. `count`.
    fn expect_word(&mut self) -> Result<String, CompileError> {
        let current = self.current();
        if Token::keyword(&current.text).is_some() {
            let name = current.text.clone();
            self.advance();
            return Ok(name);
        }
        self.expect_identifier()
    }

    fn enter(&mut self) -> Result<(), CompileError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(CompileError::RecursionLimit {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Parse a complete query; nothing may follow it.
    pub fn parse_query(&mut self) -> Result<Query, CompileError> {
        let query = self.parse_select_query()?;
        self.expect(Token::Eof)?;
        Ok(query)
    }

    fn parse_select_query(&mut self) -> Result<Query, CompileError> {
        self.expect(Token::Select)?;

        let mut select = vec![self.parse_select_item()?];
        while self.check(&Token::Comma) {
            self.advance();
            select.push(self.parse_select_item()?);
        }

        self.expect(Token::From)?;

        let mut from = vec![self.parse_from_item()?];
        while self.check(&Token::Comma) {
            self.advance();
            from.push(self.parse_from_item()?);
        }

        let where_clause = if self.check(&Token::Where) {
            self.advance();
            Some(self.parse_constraint()?)
        } else {
            None
        };

        let group_by = if self.check(&Token::Group) {
            self.advance();
            self.expect(Token::By)?;
            self.parse_expression_list()?
        } else {
            vec![]
        };

        let order_by = if self.check(&Token::Order) {
            self.advance();
            self.expect(Token::By)?;
            self.parse_expression_list()?
        } else {
            vec![]
        };

        Ok(Query {
            select,
            from,
            where_clause,
            group_by,
            order_by,
        })
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expr>, CompileError> {
        let mut items = vec![self.parse_expression()?];
        while self.check(&Token::Comma) {
            self.advance();
            items.push(self.parse_expression()?);
        }
        Ok(items)
    }

    fn parse_select_item(&mut self) -> Result<SelectItem, CompileError> {
        let expr = self.parse_expression()?;

        let alias = if self.check(&Token::As) {
            self.advance();
            Some(self.expect_word()?)
        } else if self.check(&Token::Comma) || self.check(&Token::From) {
            None
        } else {
            return Err(self.error(Token::As.describe()));
        };

        Ok(SelectItem { expr, alias })
    }

    fn parse_from_item(&mut self) -> Result<FromItem, CompileError> {
        if self.check(&Token::LParen) {
            self.enter()?;
            self.advance();
            let query = self.parse_select_query()?;
            self.expect(Token::RParen)?;
            self.leave();

            self.expect(Token::As)?;
            let alias = self.expect_identifier()?;
            return Ok(FromItem::Subquery {
                query: Box::new(query),
                alias,
            });
        }

        let name = self.parse_dotted_name()?;
        let alias = if self.check(&Token::As) {
            self.advance();
            Some(self.expect_identifier()?)
        } else {
            None
        };
        Ok(FromItem::Class { name, alias })
    }

    fn parse_dotted_name(&mut self) -> Result<Vec<String>, CompileError> {
        let mut segments = vec![self.expect_identifier()?];
        while self.check(&Token::Dot) {
            self.advance(); // consume '.'
            segments.push(self.expect_word()?);
        }
        Ok(segments)
    }

    /// `term (op term)?` - one operator at most, chains need parentheses.
    pub fn parse_expression(&mut self) -> Result<Expr, CompileError> {
        let left = self.parse_term()?;

        let op = match &self.current().token {
            Token::Plus => ArithOp::Add,
            Token::Minus => ArithOp::Subtract,
            Token::Star => ArithOp::Multiply,
            Token::Slash => ArithOp::Divide,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_term()?;

        Ok(Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_term(&mut self) -> Result<Expr, CompileError> {
        let expr = match &self.current().token {
            // Literals
            Token::Integer(n) => Expr::Integer(n.clone()),
            Token::Decimal(n) => Expr::Decimal(n.clone()),
            Token::String(s) => Expr::String(s.clone()),
            Token::DateTime(d) => Expr::DateTime(*d),
            Token::Boolean(b) => Expr::Boolean(*b),

            // Negative numbers fold into the literal
            Token::Minus => {
                let expr = match self.peek(1) {
                    Token::Integer(n) => Expr::Integer(format!("-{}", n)),
                    Token::Decimal(n) => Expr::Decimal(format!("-{}", n)),
                    _ => return Err(self.error("expression")),
                };
                self.advance();
                expr
            }

            Token::Identifier(_) => return self.parse_dotted_name().map(Expr::Path),

            Token::Count => return self.parse_count(),
            Token::Sum => return self.parse_function(Function::Sum),
            Token::Avg => return self.parse_function(Function::Avg),
            Token::Min => return self.parse_function(Function::Min),
            Token::Max => return self.parse_function(Function::Max),
            Token::Substr => return self.parse_function(Function::Substr),

            Token::LParen => {
                self.enter()?;
                self.advance();
                let expr = if self.check(&Token::Select) {
                    Expr::Subquery(Box::new(self.parse_select_query()?))
                } else {
                    self.parse_expression()?
                };
                self.expect(Token::RParen)?;
                self.leave();
                return Ok(expr);
            }

            _ => return Err(self.error("expression")),
        };

        self.advance();
        Ok(expr)
    }

    /// COUNT only takes the wildcard.
    fn parse_count(&mut self) -> Result<Expr, CompileError> {
        self.advance(); // consume COUNT
        self.expect(Token::LParen)?;
        self.expect(Token::Star)?;
        self.expect(Token::RParen)?;
        Ok(Expr::Function {
            function: Function::Count,
            args: vec![],
        })
    }

    /// Arity is left to the function validator.
    fn parse_function(&mut self, function: Function) -> Result<Expr, CompileError> {
        self.advance(); // consume the function name
        self.expect(Token::LParen)?;
        self.enter()?;

        let mut args = vec![];
        if !self.check(&Token::RParen) {
            args = self.parse_expression_list()?;
        }
        self.expect(Token::RParen)?;
        self.leave();

        Ok(Expr::Function { function, args })
    }

    /// `andGroup (OR andGroup)*`
    pub fn parse_constraint(&mut self) -> Result<Constraint, CompileError> {
        let mut groups = vec![self.parse_and_group()?];

        while self.check(&Token::Or) {
            self.advance();
            groups.push(self.parse_and_group()?);
        }

        Ok(if groups.len() == 1 {
            groups.remove(0)
        } else {
            Constraint::Or(groups)
        })
    }

    fn parse_and_group(&mut self) -> Result<Constraint, CompileError> {
        let mut terms = vec![self.parse_not_term()?];

        while self.check(&Token::And) {
            self.advance();
            terms.push(self.parse_not_term()?);
        }

        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Constraint::And(terms)
        })
    }

    fn parse_not_term(&mut self) -> Result<Constraint, CompileError> {
        if !self.check(&Token::Not) {
            return self.parse_atom_constraint();
        }

        self.enter()?;
        self.advance(); // consume NOT
        let inner = self.parse_not_term()?;
        self.leave();
        Ok(Constraint::Not(Box::new(inner)))
    }

    fn parse_atom_constraint(&mut self) -> Result<Constraint, CompileError> {
        if self.check(&Token::LParen) && !self.paren_starts_expression() {
            self.enter()?;
            self.advance();
            let inner = self.parse_constraint()?;
            self.expect(Token::RParen)?;
            self.leave();
            return Ok(inner);
        }

        let start = self.current().clone();
        let left = self.parse_expression()?;

        match &self.current().token {
            Token::Eq | Token::NotEq | Token::Lt | Token::Gt | Token::LtEq | Token::GtEq => {
                let op = match &self.current().token {
                    Token::Eq => CompareOp::Equal,
                    Token::NotEq => CompareOp::NotEqual,
                    Token::Lt => CompareOp::LessThan,
                    Token::Gt => CompareOp::GreaterThan,
                    Token::LtEq => CompareOp::LessEqual,
                    _ => CompareOp::GreaterEqual,
                };
                self.advance();
                let right = self.parse_expression()?;
                Ok(Constraint::Comparison { op, left, right })
            }
            Token::Like => {
                self.advance();
                let pattern = self.parse_expression()?;
                Ok(Constraint::Like {
                    expr: left,
                    pattern,
                })
            }
            Token::Is => {
                self.advance();
                let negated = self.check(&Token::Not);
                if negated {
                    self.advance();
                }
                self.expect(Token::Null)?;
                Ok(Constraint::NullCheck {
                    expr: left,
                    negated,
                })
            }
            Token::In => {
                self.advance();
                self.enter()?;
                self.expect(Token::LParen)?;
                let query = self.parse_select_query()?;
                self.expect(Token::RParen)?;
                self.leave();
                Ok(Constraint::InSubquery {
                    expr: left,
                    query: Box::new(query),
                })
            }
            Token::Contains | Token::Does => {
                let Expr::Path(path) = left else {
                    return Err(CompileError::syntax(start.position, "path", start.found()));
                };
                let negated = self.check(&Token::Does);
                self.advance();
                if negated {
                    self.expect(Token::Not)?;
                    self.expect(Token::Contain)?;
                }
                let target = self.expect_identifier()?;
                Ok(Constraint::Contains {
                    path,
                    target,
                    negated,
                })
            }
            _ => Err(self.error("comparison operator")),
        }
    }

    /// Decide whether a `(` opens an expression (`(a + b) > 3`) rather than a
    /// nested constraint group, by looking at what follows its matching `)`.
    fn paren_starts_expression(&self) -> bool {
        let mut open = 0usize;
        for (index, spanned) in self.tokens.iter().enumerate().skip(self.pos) {
            match spanned.token {
                Token::LParen => open += 1,
                Token::RParen => {
                    open -= 1;
                    if open == 0 {
                        let after = self.tokens.get(index + 1).map(|s| &s.token);
                        return matches!(
                            after,
                            Some(
                                Token::Eq
                                    | Token::NotEq
                                    | Token::Lt
                                    | Token::Gt
                                    | Token::LtEq
                                    | Token::GtEq
                                    | Token::Like
                                    | Token::Is
                                    | Token::In
                                    | Token::Contains
                                    | Token::Does
                                    | Token::Plus
                                    | Token::Minus
                                    | Token::Star
                                    | Token::Slash
                            )
                        );
                    }
                }
                Token::Eof => break,
                _ => {}
            }
        }
        false
    }
}

/// Parse query text into an untyped [`Query`].
pub fn parse(text: &str) -> Result<Query, CompileError> {
    Parser::new(Lexer::new(text))?.parse_query()
}
