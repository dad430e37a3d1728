//! Canonical formula printing: the minimally-parenthesized, whitespace-free
//! textual form of a parsed [`Expr`].
//!
//! A pair of parentheses is redundant when removing it would not change the
//! tree shape under standard precedence (`* /` bind tighter than `+ -`) and
//! left-to-right associativity. The precedence tiers below let each node
//! decide, independently, whether its children need wrapping.

use super::ast::Expr;

const PREC_ADD_SUB: u8 = 1;
const PREC_MUL_DIV: u8 = 2;
const PREC_UNARY: u8 = 3;
const PREC_ATOM: u8 = 4;

fn precedence(e: &Expr) -> u8 {
    match e {
        Expr::Number(_) | Expr::Ref(_) => PREC_ATOM,
        Expr::Neg(_) | Expr::Plus(_) => PREC_UNARY,
        Expr::Add(..) | Expr::Sub(..) => PREC_ADD_SUB,
        Expr::Mul(..) | Expr::Div(..) => PREC_MUL_DIV,
    }
}

/// Render `expr` in canonical form: minimal parens, no whitespace.
pub fn print(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(expr, &mut out);
    out
}

fn write_expr(expr: &Expr, out: &mut String) {
    match expr {
        Expr::Number(n) => out.push_str(&format_number(*n)),
        Expr::Ref(pos) => out.push_str(&pos.to_a1()),
        Expr::Neg(inner) => {
            out.push('-');
            write_child(inner, PREC_UNARY, out);
        }
        Expr::Plus(inner) => {
            out.push('+');
            write_child(inner, PREC_UNARY, out);
        }
        Expr::Add(a, b) => write_binary(a, b, '+', PREC_ADD_SUB, out),
        Expr::Sub(a, b) => write_binary(a, b, '-', PREC_ADD_SUB, out),
        Expr::Mul(a, b) => write_binary(a, b, '*', PREC_MUL_DIV, out),
        Expr::Div(a, b) => write_binary(a, b, '/', PREC_MUL_DIV, out),
    }
}

fn write_binary(lhs: &Expr, rhs: &Expr, op: char, prec: u8, out: &mut String) {
    // Left-associative: the left child keeps its grouping as long as its
    // precedence is no lower than ours; the right child needs parens even
    // at *equal* precedence, since `a-(b+c)` and `a-b+c` parse to different
    // trees.
    write_side(lhs, prec, precedence(lhs) < prec, out);
    out.push(op);
    write_side(rhs, prec, precedence(rhs) <= prec, out);
}

fn write_side(expr: &Expr, _prec: u8, needs_parens: bool, out: &mut String) {
    if needs_parens {
        out.push('(');
        write_expr(expr, out);
        out.push(')');
    } else {
        write_expr(expr, out);
    }
}

fn write_child(expr: &Expr, min_prec: u8, out: &mut String) {
    if precedence(expr) < min_prec {
        out.push('(');
        write_expr(expr, out);
        out.push(')');
    } else {
        write_expr(expr, out);
    }
}

fn format_number(n: f64) -> String {
    // `Display` already gives the shortest round-trippable form ("2" for
    // 2.0, "2.5" for 2.5) which is exactly what the grammar's `Number`
    // literal accepts back in.
    format!("{n}")
}
