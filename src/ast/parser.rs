//! Recursive descent with one-token look-ahead (§4.2). The lexer is pulled
//! lazily; accept-by-value/accept-by-tag primitives either consume the
//! current token or raise a syntax error naming expected vs. actual.

use super::nodes::{
    Binding, Expr, ExprKind, FunctionDecl, Param, PostfixOp, Program, Stmt, SwitchCase, TypeExpr,
    UnaryOp, VarKind,
};
use crate::compiler_messages::CompilerError;
use crate::position::{Position, SourceSpan};
use crate::tokenizer::{Lexer, Token, TokenKind};
use std::path::{Path, PathBuf};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    file: PathBuf,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, file: impl AsRef<Path>) -> Result<Self, CompilerError> {
        let mut lexer = Lexer::new(source, file.as_ref());
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            file: file.as_ref().to_path_buf(),
            current,
        })
    }

    pub fn parse_program(&mut self) -> Result<Program, CompilerError> {
        let mut declarations = Vec::new();
        while !self.at_eof() {
            declarations.push(self.statement()?);
        }
        Ok(Program { declarations })
    }

    // --- token primitives -------------------------------------------------

    fn err(&self, message: impl Into<String>) -> CompilerError {
        CompilerError::syntax(
            message,
            SourceSpan::new(self.file.clone(), self.current.position),
        )
    }

    fn bump(&mut self) -> Result<Token, CompilerError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn at_eof(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    fn at_symbol(&self, lexeme: &str) -> bool {
        self.current.is_symbol(lexeme)
    }

    fn at_keyword(&self, lexeme: &str) -> bool {
        self.current.is_keyword(lexeme)
    }

    fn at_identifier(&self) -> bool {
        self.current.kind == TokenKind::Identifier
    }

    fn expect_symbol(&mut self, lexeme: &str) -> Result<Position, CompilerError> {
        if self.at_symbol(lexeme) {
            Ok(self.bump()?.position)
        } else {
            Err(self.err(format!(
                "expected '{lexeme}', found {}",
                self.current.describe()
            )))
        }
    }

    fn expect_keyword(&mut self, lexeme: &str) -> Result<Position, CompilerError> {
        if self.at_keyword(lexeme) {
            Ok(self.bump()?.position)
        } else {
            Err(self.err(format!(
                "expected '{lexeme}', found {}",
                self.current.describe()
            )))
        }
    }

    fn expect_identifier(&mut self) -> Result<(String, Position), CompilerError> {
        if self.at_identifier() {
            let tok = self.bump()?;
            Ok((tok.lexeme, tok.position))
        } else {
            Err(self.err(format!("expected identifier, found {}", self.current.describe())))
        }
    }

    // --- type expressions (§4.2 baseType) ----------------------------------

    fn type_expr(&mut self) -> Result<TypeExpr, CompilerError> {
        if self.at_symbol("{") {
            self.bump()?;
            let key = self.type_expr()?;
            self.expect_symbol(":")?;
            let value = self.type_expr()?;
            self.expect_symbol("}")?;
            return Ok(TypeExpr::HashMap(Box::new(key), Box::new(value)));
        }
        if self.at_symbol("[") {
            self.bump()?;
            let element = self.type_expr()?;
            self.expect_symbol("]")?;
            return Ok(TypeExpr::Array(Box::new(element)));
        }
        if self.at_symbol("(") {
            self.bump()?;
            let mut params = Vec::new();
            let mut variadic = false;
            if !self.at_symbol(")") {
                loop {
                    if self.at_symbol("...") {
                        self.bump()?;
                        variadic = true;
                    }
                    params.push(self.type_expr()?);
                    if variadic || !self.at_symbol(",") {
                        break;
                    }
                    self.bump()?;
                }
            }
            self.expect_symbol(")")?;
            let ret = self.type_expr()?;
            let panics = if self.at_keyword("panics") {
                self.bump()?;
                true
            } else {
                false
            };
            return Ok(TypeExpr::Func {
                variadic,
                params,
                ret: Box::new(ret),
                panics,
            });
        }
        for kw in ["i8", "i16", "i32", "i64", "num", "str", "bool", "void", "error"] {
            if self.at_keyword(kw) {
                self.bump()?;
                return Ok(TypeExpr::Named(kw.to_string()));
            }
        }
        if self.at_identifier() {
            let (name, _) = self.expect_identifier()?;
            return Ok(TypeExpr::Named(name));
        }
        Err(self.err(format!("expected a type, found {}", self.current.describe())))
    }

    // --- expressions, tightest to loosest ----------------------------------

    fn primary(&mut self) -> Result<Expr, CompilerError> {
        let pos = self.current.position;
        if self.at_symbol("(") {
            self.bump()?;
            let mut elements = vec![self.expression()?];
            while self.at_symbol(",") {
                self.bump()?;
                elements.push(self.expression()?);
            }
            let end = self.expect_symbol(")")?;
            let span = pos.merge(end);
            if elements.len() == 1 {
                let mut only = elements.remove(0);
                only.position = span;
                return Ok(only);
            }
            return Ok(Expr::new(ExprKind::Tuple(elements), span));
        }
        if self.at_symbol("[") {
            self.bump()?;
            let mut elements = Vec::new();
            if !self.at_symbol("]") {
                elements.push(self.expression()?);
                while self.at_symbol(",") {
                    self.bump()?;
                    elements.push(self.expression()?);
                }
            }
            let end = self.expect_symbol("]")?;
            return Ok(Expr::new(ExprKind::ArrayLiteral(elements), pos.merge(end)));
        }
        if self.at_symbol("{") {
            self.bump()?;
            let mut keys = Vec::new();
            let mut values = Vec::new();
            if !self.at_symbol("}") {
                keys.push(self.expression()?);
                self.expect_symbol(":")?;
                values.push(self.expression()?);
                while self.at_symbol(",") {
                    self.bump()?;
                    keys.push(self.expression()?);
                    self.expect_symbol(":")?;
                    values.push(self.expression()?);
                }
            }
            let end = self.expect_symbol("}")?;
            return Ok(Expr::new(ExprKind::HashMapLiteral { keys, values }, pos.merge(end)));
        }
        if self.at_identifier() {
            let (name, ident_pos) = self.expect_identifier()?;
            if self.at_symbol("{") {
                return self.struct_literal(name, ident_pos);
            }
            return Ok(Expr::new(ExprKind::Identifier(name), ident_pos));
        }
        match self.current.kind {
            TokenKind::Integer => {
                let tok = self.bump()?;
                let value = parse_integer(&tok.lexeme)
                    .map_err(|_| self.err(format!("malformed integer literal '{}'", tok.lexeme)))?;
                Ok(Expr::new(ExprKind::IntLiteral(value), tok.position))
            }
            TokenKind::Floating => {
                let tok = self.bump()?;
                let value: f64 = tok
                    .lexeme
                    .parse()
                    .map_err(|_| self.err(format!("malformed number literal '{}'", tok.lexeme)))?;
                Ok(Expr::new(ExprKind::FloatLiteral(value), tok.position))
            }
            TokenKind::StringLit => {
                let tok = self.bump()?;
                Ok(Expr::new(ExprKind::StringLiteral(tok.lexeme), tok.position))
            }
            TokenKind::Keyword if self.current.lexeme == "true" || self.current.lexeme == "false" => {
                let tok = self.bump()?;
                Ok(Expr::new(ExprKind::BoolLiteral(tok.lexeme == "true"), tok.position))
            }
            TokenKind::Keyword if self.current.lexeme == "null" => {
                let tok = self.bump()?;
                Ok(Expr::new(ExprKind::Null, tok.position))
            }
            _ => Err(self.err(format!("expected an expression, found {}", self.current.describe()))),
        }
    }

    fn struct_literal(&mut self, name: String, start: Position) -> Result<Expr, CompilerError> {
        self.bump()?; // '{'
        let mut fields = Vec::new();
        if !self.at_symbol("}") {
            loop {
                let (field_name, _) = self.expect_identifier()?;
                self.expect_symbol(":")?;
                let value = self.expression()?;
                fields.push((field_name, value));
                if !self.at_symbol(",") {
                    break;
                }
                self.bump()?;
            }
        }
        let end = self.expect_symbol("}")?;
        Ok(Expr::new(ExprKind::StructLiteral { name, fields }, start.merge(end)))
    }

    fn postfix_chain(&mut self) -> Result<Expr, CompilerError> {
        let mut node = self.primary()?;
        loop {
            if self.at_symbol(".") {
                self.bump()?;
                let (member, member_pos) = self.expect_identifier()?;
                let span = node.position.merge(member_pos);
                node = Expr::new(ExprKind::Member(Box::new(node), member), span);
            } else if self.at_symbol("[") {
                self.bump()?;
                let index = self.expression()?;
                let end = self.expect_symbol("]")?;
                let span = node.position.merge(end);
                node = Expr::new(ExprKind::Index(Box::new(node), Box::new(index)), span);
            } else if self.at_symbol("(") {
                self.bump()?;
                let mut args = Vec::new();
                if !self.at_symbol(")") {
                    args.push(self.expression()?);
                    while self.at_symbol(",") {
                        self.bump()?;
                        args.push(self.expression()?);
                    }
                }
                let end = self.expect_symbol(")")?;
                let span = node.position.merge(end);
                node = Expr::new(ExprKind::Call(Box::new(node), args), span);
            } else {
                break;
            }
        }
        Ok(node)
    }

    fn postfix_incdec(&mut self) -> Result<Expr, CompilerError> {
        let node = self.postfix_chain()?;
        if self.at_symbol("++") || self.at_symbol("--") {
            let tok = self.bump()?;
            let op = if tok.lexeme == "++" { PostfixOp::Inc } else { PostfixOp::Dec };
            let span = node.position;
            return Ok(Expr::new(ExprKind::Postfix(op, Box::new(node)), span));
        }
        Ok(node)
    }

    /// Conditional expression binds between postfix-chain and prefix (§4.2).
    fn conditional(&mut self) -> Result<Expr, CompilerError> {
        if self.at_keyword("if") {
            let start = self.bump()?.position;
            self.expect_symbol("(")?;
            let cond = self.expression()?;
            self.expect_symbol(")")?;
            let then_branch = self.expression()?;
            self.expect_keyword("else")?;
            let else_branch = self.expression()?;
            let span = start.merge(else_branch.position);
            return Ok(Expr::new(
                ExprKind::Conditional {
                    cond: Box::new(cond),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                },
                span,
            ));
        }
        self.postfix_incdec()
    }

    fn prefix(&mut self) -> Result<Expr, CompilerError> {
        let unary_op = match self.current.lexeme.as_str() {
            "+" if self.current.kind == TokenKind::Symbol => Some(UnaryOp::Plus),
            "-" if self.current.kind == TokenKind::Symbol => Some(UnaryOp::Minus),
            "!" if self.current.kind == TokenKind::Symbol => Some(UnaryOp::Not),
            "~" if self.current.kind == TokenKind::Symbol => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(op) = unary_op {
            let start = self.bump()?.position;
            let operand = self.prefix()?;
            let span = start.merge(operand.position);
            return Ok(Expr::new(ExprKind::Unary(op, Box::new(operand)), span));
        }
        if self.at_symbol("++") || self.at_symbol("--") {
            let tok = self.bump()?;
            let op = if tok.lexeme == "++" { UnaryOp::PreInc } else { UnaryOp::PreDec };
            let operand = self.postfix_chain()?;
            let span = tok.position.merge(operand.position);
            return Ok(Expr::new(ExprKind::Unary(op, Box::new(operand)), span));
        }
        if self.at_keyword("new") {
            let start = self.bump()?.position;
            let operand = self.postfix_chain()?;
            let span = start.merge(operand.position);
            return Ok(Expr::new(ExprKind::New(Box::new(operand)), span));
        }
        self.conditional()
    }

    fn binary_level(
        &mut self,
        ops: &[&str],
        next: fn(&mut Self) -> Result<Expr, CompilerError>,
    ) -> Result<Expr, CompilerError> {
        let mut lhs = next(self)?;
        while ops.iter().any(|op| self.at_symbol(op)) {
            let op_tok = self.bump()?;
            let rhs = next(self)?;
            let span = lhs.position.merge(rhs.position);
            lhs = Expr::new(ExprKind::Binary(op_tok.lexeme, Box::new(lhs), Box::new(rhs)), span);
        }
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr, CompilerError> {
        self.binary_level(&["*", "/", "%"], Self::prefix)
    }

    fn additive(&mut self) -> Result<Expr, CompilerError> {
        self.binary_level(&["+", "-"], Self::multiplicative)
    }

    fn shift(&mut self) -> Result<Expr, CompilerError> {
        self.binary_level(&["<<", ">>"], Self::additive)
    }

    fn relational(&mut self) -> Result<Expr, CompilerError> {
        self.binary_level(&["<=", ">=", "<", ">"], Self::shift)
    }

    fn equality(&mut self) -> Result<Expr, CompilerError> {
        self.binary_level(&["==", "!="], Self::relational)
    }

    fn bitwise(&mut self) -> Result<Expr, CompilerError> {
        self.binary_level(&["&", "|", "^"], Self::equality)
    }

    fn logical(&mut self) -> Result<Expr, CompilerError> {
        self.binary_level(&["&&", "||"], Self::bitwise)
    }

    fn assignment(&mut self) -> Result<Expr, CompilerError> {
        let lhs = self.logical()?;
        if self.at_symbol("=") {
            self.bump()?;
            let rhs = self.logical()?;
            let span = lhs.position.merge(rhs.position);
            return Ok(Expr::new(
                ExprKind::Assign {
                    op: "=".to_string(),
                    target: Box::new(lhs),
                    value: Box::new(rhs),
                },
                span,
            ));
        }
        Ok(lhs)
    }

    const COMPOUND_OPS: &'static [&'static str] =
        &["*=", "/=", "%=", "+=", "-=", "<<=", ">>=", "&=", "|=", "^=", "~="];

    fn compound_assign(&mut self) -> Result<Expr, CompilerError> {
        let lhs = self.assignment()?;
        if let Some(&op) = Self::COMPOUND_OPS.iter().find(|op| self.at_symbol(op)) {
            let _ = op;
            let op_tok = self.bump()?;
            let rhs = self.assignment()?;
            let span = lhs.position.merge(rhs.position);
            return Ok(Expr::new(
                ExprKind::Assign {
                    op: op_tok.lexeme,
                    target: Box::new(lhs),
                    value: Box::new(rhs),
                },
                span,
            ));
        }
        Ok(lhs)
    }

    /// Outermost expression level: handles `:=`, the loosest-binding form.
    fn expression(&mut self) -> Result<Expr, CompilerError> {
        let lhs = self.compound_assign()?;
        if self.at_symbol(":=") {
            self.bump()?;
            let names = short_decl_names(&lhs).map_err(|()| {
                self.err("left side of ':=' must be an identifier or a tuple of identifiers")
            })?;
            let rhs = self.expression()?;
            let span = lhs.position.merge(rhs.position);
            return Ok(Expr::new(
                ExprKind::ShortDecl {
                    names,
                    value: Box::new(rhs),
                },
                span,
            ));
        }
        Ok(lhs)
    }

    fn mandatory_expression(&mut self) -> Result<Expr, CompilerError> {
        self.expression()
    }

    // --- statements (§4.2) -------------------------------------------------

    fn statement(&mut self) -> Result<Stmt, CompilerError> {
        if self.at_keyword("struct") {
            return self.struct_decl();
        }
        if self.at_keyword("function") || self.at_keyword("define") {
            return self.function_decl();
        }
        if self.at_keyword("import") {
            return self.import_decl();
        }
        if self.at_keyword("var") {
            return self.var_like_decl(VarKind::Var);
        }
        if self.at_keyword("const") {
            return self.var_like_decl(VarKind::Const);
        }
        if self.at_keyword("local") {
            return self.var_like_decl(VarKind::Local);
        }
        if self.at_keyword("for") {
            return self.for_decl();
        }
        if self.at_keyword("do") {
            return self.do_while_decl();
        }
        if self.at_keyword("while") {
            return self.while_decl();
        }
        if self.at_keyword("if") {
            return self.if_decl();
        }
        if self.at_keyword("switch") {
            return self.switch_decl();
        }
        if self.at_keyword("run") {
            return self.run_decl();
        }
        if self.at_keyword("continue") {
            let pos = self.bump()?.position;
            self.expect_symbol(";")?;
            return Ok(Stmt::Continue(pos));
        }
        if self.at_keyword("break") {
            let pos = self.bump()?.position;
            self.expect_symbol(";")?;
            return Ok(Stmt::Break(pos));
        }
        if self.at_keyword("return") {
            return self.return_decl();
        }
        if self.at_symbol("{") {
            return self.block_stmt();
        }
        if self.at_symbol(";") {
            let pos = self.bump()?.position;
            return Ok(Stmt::Empty(pos));
        }
        let expr = self.expression()?;
        self.expect_symbol(";")?;
        Ok(Stmt::Expr(expr))
    }

    fn struct_decl(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.expect_keyword("struct")?;
        let (name, _) = self.expect_identifier()?;
        self.expect_symbol("{")?;
        let mut fields = Vec::new();
        loop {
            if !self.at_identifier() {
                break;
            }
            let (field_name, _) = self.expect_identifier()?;
            let ty = self.type_expr()?;
            fields.push(Param { name: field_name, ty });
            self.expect_symbol(";")?;
        }
        if fields.is_empty() {
            return Err(self.err("struct must have at least one field"));
        }
        let end = self.expect_symbol("}")?;
        Ok(Stmt::Struct {
            name,
            fields,
            position: start.merge(end),
        })
    }

    fn function_decl(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.bump()?.position; // 'function' or 'define'
        let receiver = if self.at_symbol("(") {
            self.bump()?;
            let (recv_name, _) = self.expect_identifier()?;
            let recv_ty = self.type_expr()?;
            self.expect_symbol(")")?;
            Some(Param { name: recv_name, ty: recv_ty })
        } else {
            None
        };
        let (name, _) = self.expect_identifier()?;
        self.expect_symbol("(")?;
        let mut params = Vec::new();
        let mut variadic = false;
        if !self.at_symbol(")") {
            loop {
                if self.at_symbol("...") {
                    self.bump()?;
                    variadic = true;
                }
                let (param_name, _) = self.expect_identifier()?;
                let ty = self.type_expr()?;
                params.push(Param { name: param_name, ty });
                if variadic || !self.at_symbol(",") {
                    break;
                }
                self.bump()?;
            }
        }
        self.expect_symbol(")")?;
        let ret = self.type_expr()?;
        let panics = if self.at_keyword("panics") {
            self.bump()?;
            true
        } else {
            false
        };
        self.expect_symbol("{")?;
        let mut body = Vec::new();
        while !self.at_symbol("}") {
            body.push(self.statement()?);
        }
        let end = self.expect_symbol("}")?;
        Ok(Stmt::Function(FunctionDecl {
            receiver,
            name,
            panics,
            params,
            variadic,
            ret,
            body,
            position: start.merge(end),
        }))
    }

    fn import_decl(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.expect_keyword("import")?;
        self.expect_symbol("(")?;
        let mut names = vec![self.expect_identifier()?.0];
        while self.at_symbol(",") {
            self.bump()?;
            names.push(self.expect_identifier()?.0);
        }
        self.expect_symbol(")")?;
        self.expect_keyword("from")?;
        if self.current.kind != TokenKind::StringLit {
            return Err(self.err("missing import path"));
        }
        let path_tok = self.bump()?;
        let end = self.expect_symbol(";")?;
        Ok(Stmt::Import {
            path: path_tok.lexeme,
            names,
            position: start.merge(end),
        })
    }

    fn var_like_decl(&mut self, kind: VarKind) -> Result<Stmt, CompilerError> {
        let start = self.bump()?.position; // 'var' | 'const' | 'local'
        let mut bindings = vec![self.binding()?];
        while self.at_symbol(",") {
            self.bump()?;
            bindings.push(self.binding()?);
        }
        let end = self.expect_symbol(";")?;
        Ok(Stmt::VarDecl {
            kind,
            bindings,
            position: start.merge(end),
        })
    }

    fn binding(&mut self) -> Result<Binding, CompilerError> {
        let (name, _) = self.expect_identifier()?;
        let ty = self.type_expr()?;
        let value = if self.at_symbol("=") {
            self.bump()?;
            Some(self.mandatory_expression()?)
        } else {
            None
        };
        Ok(Binding { name, ty, value })
    }

    fn for_mode_decl(&mut self) -> Result<Option<Stmt>, CompilerError> {
        if self.at_keyword("var") || self.at_keyword("const") || self.at_keyword("local") {
            return Ok(Some(self.statement()?));
        }
        if self.at_symbol(";") {
            return Ok(None);
        }
        let expr = self.expression()?;
        Ok(Some(Stmt::Expr(expr)))
    }

    fn for_decl(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.expect_keyword("for")?;
        let has_header = self.at_symbol("(");
        let (init, cond, step) = if has_header {
            self.bump()?;
            let init = self.for_mode_decl()?;
            self.expect_symbol(";")?;
            let cond = if self.at_symbol(";") { None } else { Some(self.expression()?) };
            self.expect_symbol(";")?;
            let step = if self.at_symbol(")") { None } else { Some(Stmt::Expr(self.expression()?)) };
            self.expect_symbol(")")?;
            (init, cond, step)
        } else {
            (None, None, None)
        };
        let body = self.statement()?;
        let (cond, trailing_cond) = if self.at_keyword("if") {
            if has_header {
                return Err(self.err("ambiguous 'if' in for loop"));
            }
            self.bump()?;
            self.expect_symbol("(")?;
            let cond = self.mandatory_expression()?;
            self.expect_symbol(")")?;
            self.expect_symbol(";")?;
            (Some(cond), true)
        } else {
            if !has_header {
                return Err(self.err("invalid 'for' statement"));
            }
            (cond, false)
        };
        let end = body.position();
        Ok(Stmt::For {
            init: init.map(Box::new),
            cond,
            step: step.map(Box::new),
            body: Box::new(body),
            trailing_cond,
            position: start.merge(end),
        })
    }

    fn do_while_decl(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.expect_keyword("do")?;
        let body = self.statement()?;
        self.expect_keyword("while")?;
        self.expect_symbol("(")?;
        let cond = self.mandatory_expression()?;
        self.expect_symbol(")")?;
        let end = self.expect_symbol(";")?;
        Ok(Stmt::DoWhile {
            body: Box::new(body),
            cond,
            position: start.merge(end),
        })
    }

    fn while_decl(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.expect_keyword("while")?;
        self.expect_symbol("(")?;
        let cond = self.mandatory_expression()?;
        self.expect_symbol(")")?;
        let body = self.statement()?;
        let end = body.position();
        Ok(Stmt::While {
            cond,
            body: Box::new(body),
            position: start.merge(end),
        })
    }

    fn if_decl(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.expect_keyword("if")?;
        self.expect_symbol("(")?;
        let cond = self.mandatory_expression()?;
        self.expect_symbol(")")?;
        let then_body = self.statement()?;
        let mut end = then_body.position();
        let else_body = if self.at_keyword("else") {
            self.bump()?;
            let else_stmt = self.statement()?;
            end = else_stmt.position();
            Some(Box::new(else_stmt))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_body: Box::new(then_body),
            else_body,
            position: start.merge(end),
        })
    }

    fn switch_decl(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.expect_keyword("switch")?;
        self.expect_symbol("(")?;
        let subject = self.mandatory_expression()?;
        self.expect_symbol(")")?;
        self.expect_symbol("{")?;
        let mut cases = Vec::new();
        let mut default = None;
        while self.at_keyword("case") || self.at_keyword("default") {
            if self.at_keyword("case") {
                self.bump()?;
                let mut values = vec![self.expression()?];
                while self.at_symbol(",") {
                    self.bump()?;
                    values.push(self.expression()?);
                }
                self.expect_symbol(":")?;
                let mut body = Vec::new();
                while !self.at_keyword("case") && !self.at_keyword("default") && !self.at_symbol("}") {
                    body.push(self.statement()?);
                }
                cases.push(SwitchCase { values, body });
            } else {
                self.bump()?;
                self.expect_symbol(":")?;
                let mut body = Vec::new();
                while !self.at_keyword("case") && !self.at_symbol("}") {
                    body.push(self.statement()?);
                }
                default = Some(body);
            }
        }
        let end = self.expect_symbol("}")?;
        Ok(Stmt::Switch {
            subject,
            cases,
            default,
            position: start.merge(end),
        })
    }

    fn run_decl(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.expect_keyword("run")?;
        let expr = self.mandatory_expression()?;
        let end = self.expect_symbol(";")?;
        Ok(Stmt::Run {
            expr,
            position: start.merge(end),
        })
    }

    fn return_decl(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.expect_keyword("return")?;
        let value = if self.at_symbol(";") { None } else { Some(self.expression()?) };
        let end = self.expect_symbol(";")?;
        Ok(Stmt::Return {
            value,
            position: start.merge(end),
        })
    }

    fn block_stmt(&mut self) -> Result<Stmt, CompilerError> {
        let start = self.expect_symbol("{")?;
        let mut children = Vec::new();
        while !self.at_symbol("}") {
            children.push(self.statement()?);
        }
        let end = self.expect_symbol("}")?;
        Ok(Stmt::Block(children, start.merge(end)))
    }
}

fn short_decl_names(expr: &Expr) -> Result<Vec<String>, ()> {
    match &expr.kind {
        ExprKind::Identifier(name) => Ok(vec![name.clone()]),
        ExprKind::Tuple(elements) => elements
            .iter()
            .map(|e| match &e.kind {
                ExprKind::Identifier(name) => Ok(name.clone()),
                _ => Err(()),
            })
            .collect(),
        _ => Err(()),
    }
}

fn parse_integer(lexeme: &str) -> Result<i64, std::num::ParseIntError> {
    if let Some(hex) = lexeme.strip_prefix("0x").or_else(|| lexeme.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16);
    }
    if let Some(oct) = lexeme.strip_prefix("0o").or_else(|| lexeme.strip_prefix("0O")) {
        return i64::from_str_radix(oct, 8);
    }
    if let Some(bin) = lexeme.strip_prefix("0b").or_else(|| lexeme.strip_prefix("0B")) {
        return i64::from_str_radix(bin, 2);
    }
    lexeme.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Program {
        Parser::new(src, "test.juno").unwrap().parse_program().unwrap()
    }

    #[test]
    fn parses_hello_world() {
        let program = parse(r#"function main(args [str]) void { println("hello"); return; }"#);
        assert_eq!(program.declarations.len(), 1);
        match &program.declarations[0] {
            Stmt::Function(decl) => {
                assert_eq!(decl.name, "main");
                assert_eq!(decl.body.len(), 2);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn parses_struct_with_method() {
        let program = parse(
            "struct Point { X i32; Y i32; } \
             function(p Point) Magnitude() i32 { return p.X * p.X + p.Y * p.Y; }",
        );
        assert_eq!(program.declarations.len(), 2);
        assert!(matches!(program.declarations[0], Stmt::Struct { .. }));
        match &program.declarations[1] {
            Stmt::Function(decl) => assert!(decl.receiver.is_some()),
            other => panic!("expected method, got {other:?}"),
        }
    }

    #[test]
    fn parses_array_literal_local() {
        let program = parse("function f() void { local xs [i32] = [1, 2, 3]; return; }");
        let Stmt::Function(decl) = &program.declarations[0] else { panic!() };
        match &decl.body[0] {
            Stmt::VarDecl { bindings, .. } => {
                assert_eq!(bindings.len(), 1);
                assert!(matches!(bindings[0].value.as_ref().unwrap().kind, ExprKind::ArrayLiteral(_)));
            }
            other => panic!("expected var decl, got {other:?}"),
        }
    }

    #[test]
    fn parses_short_declaration() {
        let program = parse("function f() void { x := 1; return; }");
        let Stmt::Function(decl) = &program.declarations[0] else { panic!() };
        assert!(matches!(decl.body[0], Stmt::Expr(Expr { kind: ExprKind::ShortDecl { .. }, .. })));
    }

    #[test]
    fn accepts_define_alias_as_function() {
        let program = parse("define f() void { return; }");
        assert!(matches!(program.declarations[0], Stmt::Function(_)));
    }

    #[test]
    fn parses_cross_file_import() {
        let program = parse(r#"import (greet) from "./a.ns";"#);
        match &program.declarations[0] {
            Stmt::Import { path, names, .. } => {
                assert_eq!(path, "./a.ns");
                assert_eq!(names, &vec!["greet".to_string()]);
            }
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn position_spans_are_weakly_monotonic_across_declarations() {
        let program = parse("var x i32 = 1; var y i32 = 2;");
        let mut last = (0u32, 0u32);
        for decl in &program.declarations {
            let pos = decl.position();
            let start = (pos.start_line, pos.start_col);
            assert!(start >= last);
            last = start;
        }
    }
}
