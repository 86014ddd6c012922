use crate::ast::{BinaryOp, Expr, ExprKind, Literal, PostfixOp, Program, Stmt, UnaryOp};
use crate::bp;
use ibc_lex::{Token, TokenKind};
use ibc_util::{Error, Position, Result};

/// Builds an AST from a token stream. A program is a block at block
/// level 0: statements parsed with zero leading tab tokens.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub fn parse_program(mut self) -> Result<Program> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::Eof) {
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    // --- token stream helpers -------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn offset(&self) -> usize {
        self.peek().offset
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(Error::parsing(format!(
                "expected {what}, found '{}'",
                self.peek().lexeme
            ))
            .set_pos_if_unset(Position::new(self.offset())))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(Error::parsing(format!(
                "expected {what}, found '{}'",
                self.peek().lexeme
            ))
            .set_pos_if_unset(Position::new(self.offset()))),
        }
    }

    fn expect_newline(&mut self) -> Result<()> {
        if self.check(&TokenKind::Newline) {
            self.advance();
            Ok(())
        } else if self.check(&TokenKind::Eof) {
            Ok(())
        } else {
            Err(Error::parsing(format!(
                "expected newline, found '{}'",
                self.peek().lexeme
            ))
            .set_pos_if_unset(Position::new(self.offset())))
        }
    }

    // --- blocks / indentation --------------------------------------------------

    fn count_leading_tabs(&self) -> usize {
        let mut n = 0;
        while matches!(self.tokens[(self.pos + n).min(self.tokens.len() - 1)].kind, TokenKind::Tab) {
            n += 1;
        }
        n
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        self.depth += 1;
        let mut stmts = Vec::new();
        loop {
            if self.check(&TokenKind::Eof) {
                break;
            }
            let tabs = self.count_leading_tabs();
            if tabs < self.depth {
                break;
            }
            if tabs > self.depth {
                return Err(Error::parsing(format!(
                    "unexpected indentation: expected {} tab(s), found {tabs}",
                    self.depth
                ))
                .set_pos_if_unset(Position::new(self.offset())));
            }
            for _ in 0..self.depth {
                self.advance();
            }
            stmts.push(self.parse_statement()?);
        }
        self.depth -= 1;
        Ok(stmts)
    }

    // --- statements --------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Stmt> {
        match self.peek_kind() {
            TokenKind::While => self.parse_while(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Method => self.parse_function_def(),
            _ => self.parse_expr_statement(),
        }
    }

    fn parse_condition_header(&mut self) -> Result<Expr> {
        let cond = self.parse_expr(0)?;
        if self.check(&TokenKind::Then) {
            self.advance();
        }
        self.expect_newline()?;
        Ok(cond)
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        let offset = self.offset();
        self.advance(); // while / loop while
        let cond = self.parse_condition_header()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body, offset })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let offset = self.offset();
        self.advance(); // if
        let cond = self.parse_condition_header()?;
        let body = self.parse_block()?;
        let mut cases = vec![(cond, body)];
        loop {
            if self.check(&TokenKind::ElseIf) {
                self.advance();
                let cond = self.parse_condition_header()?;
                let body = self.parse_block()?;
                cases.push((cond, body));
            } else if self.check(&TokenKind::Else) {
                self.advance();
                self.expect_newline()?;
                let body = self.parse_block()?;
                let true_lit = Expr::new(ExprKind::Literal(Literal::Bool(true)), offset);
                cases.push((true_lit, body));
                break;
            } else {
                break;
            }
        }
        Ok(Stmt::If { cases, offset })
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        let offset = self.offset();
        self.advance(); // for / loop for
        let counter = self.expect_identifier("loop counter identifier")?;
        self.expect(TokenKind::From, "'from'")?;
        let lower = self.parse_expr(bp::ASSIGN)?;
        self.expect(TokenKind::To, "'to'")?;
        let upper = self.parse_expr(bp::ASSIGN)?;
        self.expect_newline()?;
        let body = self.parse_block()?;
        Ok(Stmt::ForRange {
            counter,
            lower,
            upper,
            body,
            offset,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        let offset = self.offset();
        self.advance(); // return
        let expr = self.parse_expr(0)?;
        self.expect_newline()?;
        Ok(Stmt::Return { expr, offset })
    }

    fn parse_function_def(&mut self) -> Result<Stmt> {
        let offset = self.offset();
        self.advance(); // method
        let name = self.expect_identifier("function name")?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier("parameter name")?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.expect_newline()?;
        let body = self.parse_block()?;
        Ok(Stmt::FunctionDef {
            name,
            params,
            body,
            offset,
        })
    }

    fn parse_expr_statement(&mut self) -> Result<Stmt> {
        let expr = self.parse_expr(0)?;
        self.expect_newline()?;
        Ok(Stmt::Expr(expr))
    }

    // --- expressions (precedence climbing) ---------------------------------

    pub fn parse_expr(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_prefix()?;
        loop {
            let Some((op, l_bp, r_bp)) = self.peek_binary_op() else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            let op_offset = lhs.offset;
            self.advance();
            let rhs = self.parse_expr(r_bp)?;
            lhs = Expr::new(ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)), op_offset);
        }
        Ok(lhs)
    }

    fn peek_binary_op(&self) -> Option<(BinaryOp, u8, u8)> {
        use BinaryOp::*;
        Some(match self.peek_kind() {
            TokenKind::Comma => (Comma, bp::COMMA, bp::COMMA + 1),
            TokenKind::Eq => (Assign, bp::ASSIGN, bp::ASSIGN),
            TokenKind::PlusEq => (AddAssign, bp::ASSIGN, bp::ASSIGN),
            TokenKind::MinusEq => (SubAssign, bp::ASSIGN, bp::ASSIGN),
            TokenKind::StarEq => (MulAssign, bp::ASSIGN, bp::ASSIGN),
            TokenKind::SlashEq => (DivAssign, bp::ASSIGN, bp::ASSIGN),
            TokenKind::PercentEq => (ModAssign, bp::ASSIGN, bp::ASSIGN),
            TokenKind::OrOr | TokenKind::Or => (Or, bp::LOGICAL_OR, bp::LOGICAL_OR + 1),
            TokenKind::AndAnd | TokenKind::And => (And, bp::LOGICAL_AND, bp::LOGICAL_AND + 1),
            TokenKind::EqEq => (Eq, bp::EQUALITY, bp::EQUALITY + 1),
            TokenKind::NotEq => (NotEq, bp::EQUALITY, bp::EQUALITY + 1),
            TokenKind::Less => (Lt, bp::RELATIONAL, bp::RELATIONAL + 1),
            TokenKind::Greater => (Gt, bp::RELATIONAL, bp::RELATIONAL + 1),
            TokenKind::LessEq => (LtEq, bp::RELATIONAL, bp::RELATIONAL + 1),
            TokenKind::GreaterEq => (GtEq, bp::RELATIONAL, bp::RELATIONAL + 1),
            TokenKind::Plus => (Add, bp::ADDITIVE, bp::ADDITIVE + 1),
            TokenKind::Minus => (Sub, bp::ADDITIVE, bp::ADDITIVE + 1),
            TokenKind::Star => (Mul, bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1),
            TokenKind::Slash => (Div, bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1),
            TokenKind::Percent | TokenKind::Mod => (Mod, bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1),
            TokenKind::Div => (IDiv, bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1),
            _ => return None,
        })
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        let offset = self.offset();
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Bang | TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::PlusPlus => Some(UnaryOp::PreInc),
            TokenKind::MinusMinus => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_prefix()?;
            return Ok(Expr::new(ExprKind::Unary(op, Box::new(operand)), offset));
        }
        self.parse_postfix_chain()
    }

    fn parse_postfix_chain(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_arg_list(TokenKind::RParen)?;
                    let offset = expr.offset;
                    expr = Expr::new(ExprKind::Call(Box::new(expr), args), offset);
                }
                TokenKind::LBracket => {
                    self.advance();
                    let args = self.parse_arg_list(TokenKind::RBracket)?;
                    let offset = expr.offset;
                    expr = Expr::new(ExprKind::Subscript(Box::new(expr), args), offset);
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_identifier("member name")?;
                    let offset = expr.offset;
                    expr = Expr::new(ExprKind::Member(Box::new(expr), name), offset);
                }
                TokenKind::PlusPlus => {
                    self.advance();
                    let offset = expr.offset;
                    expr = Expr::new(ExprKind::Postfix(PostfixOp::PostInc, Box::new(expr)), offset);
                }
                TokenKind::MinusMinus => {
                    self.advance();
                    let offset = expr.offset;
                    expr = Expr::new(ExprKind::Postfix(PostfixOp::PostDec, Box::new(expr)), offset);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_arg_list(&mut self, closing: TokenKind) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(&closing) {
            loop {
                args.push(self.parse_expr(bp::ASSIGN)?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(closing, "closing bracket")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let offset = self.offset();
        match self.peek_kind().clone() {
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Bool(true)), offset))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Bool(false)), offset))
            }
            TokenKind::IntLit(v) => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Int(v)), offset))
            }
            TokenKind::FloatLit(v) => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Float(v)), offset))
            }
            TokenKind::CharLit(c) => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Char(c)), offset))
            }
            TokenKind::StrLit(s) => {
                self.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Str(s)), offset))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::new(ExprKind::Identifier(name), offset))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner.rvalue())
            }
            TokenKind::Unknown(c) => Err(Error::lexing(format!("stray character '{c}'"))
                .set_pos_if_unset(Position::new(offset))),
            _ => Err(Error::parsing(format!(
                "unexpected token '{}'",
                self.peek().lexeme
            ))
            .set_pos_if_unset(Position::new(offset))),
        }
    }
}

pub fn parse(tokens: Vec<Token>) -> Result<Program> {
    Parser::new(tokens).parse_program()
}
