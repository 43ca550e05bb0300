//! Parser (§4.2): recursive-descent construction of a typed AST.

mod nodes;
mod parser;

pub use nodes::{
    Binding, Expr, ExprKind, FunctionDecl, Param, PostfixOp, Program, Stmt, SwitchCase, TypeExpr,
    UnaryOp, VarKind,
};
pub use parser::Parser;
