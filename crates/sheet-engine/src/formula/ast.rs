//! The formula abstract syntax tree.

use crate::position::Position;
use std::collections::HashSet;

/// A parsed formula expression.
///
/// Binary nodes carry the operator's precedence tier in their variant name
/// (`Add`/`Sub` bind loosest, `Mul`/`Div` tighter) so [`crate::formula::print`]
/// can decide which parentheses are redundant without re-deriving precedence
/// from a separate table.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Ref(Position),
    Neg(Box<Expr>),
    /// Unary `+`. Kept distinct from a no-op so `Print` can round-trip
    /// `+1` rather than silently dropping the sign.
    Plus(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Every distinct [`Position`] referenced by this expression, in order
    /// of first occurrence.
    pub fn refs(&self) -> Vec<Position> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_refs(&mut seen, &mut out);
        out
    }

    fn collect_refs(&self, seen: &mut HashSet<Position>, out: &mut Vec<Position>) {
        match self {
            Expr::Number(_) => {}
            Expr::Ref(pos) => {
                if seen.insert(*pos) {
                    out.push(*pos);
                }
            }
            Expr::Neg(inner) | Expr::Plus(inner) => inner.collect_refs(seen, out),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
                a.collect_refs(seen, out);
                b.collect_refs(seen, out);
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::arb_expr;

    fn r(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    /// Walks the tree in the same left-to-right order as `collect_refs`
    /// without deduplicating, so the property test below can derive the
    /// expected first-occurrence order independently of `Expr::refs`.
    fn collect_all_refs(expr: &Expr, out: &mut Vec<Position>) {
        match expr {
            Expr::Number(_) => {}
            Expr::Ref(pos) => out.push(*pos),
            Expr::Neg(inner) | Expr::Plus(inner) => collect_all_refs(inner, out),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
                collect_all_refs(a, out);
                collect_all_refs(b, out);
            }
        }
    }

    proptest::proptest! {
        #[test]
        fn refs_dedup_preserves_first_occurrence_order_arbitrary(expr in arb_expr()) {
            let mut visited = Vec::new();
            collect_all_refs(&expr, &mut visited);

            let mut seen = HashSet::new();
            let mut expected = Vec::new();
            for pos in visited {
                if seen.insert(pos) {
                    expected.push(pos);
                }
            }

            proptest::prop_assert_eq!(expr.refs(), expected);
        }
    }

    #[test]
    fn refs_dedup_preserves_first_occurrence_order() {
        // A1+A2+A1+A3+A1+A2+A1
        let a1 = Expr::Ref(r(0, 0));
        let a2 = Expr::Ref(r(1, 0));
        let a3 = Expr::Ref(r(2, 0));
        let expr = Expr::Add(
            Box::new(Expr::Add(
                Box::new(Expr::Add(
                    Box::new(Expr::Add(
                        Box::new(Expr::Add(
                            Box::new(Expr::Add(Box::new(a1.clone()), Box::new(a2.clone()))),
                            Box::new(a1.clone()),
                        )),
                        Box::new(a3),
                    )),
                    Box::new(a1.clone()),
                )),
                Box::new(a2),
            )),
            Box::new(a1),
        );
        assert_eq!(expr.refs(), vec![r(0, 0), r(1, 0), r(2, 0)]);
    }
}
