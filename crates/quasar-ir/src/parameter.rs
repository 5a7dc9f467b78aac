//! Symbolic parameter expressions for parameterized circuits.
//!
//! A [`ParameterExpression`] is either a concrete constant or a small
//! arithmetic tree over named symbols. The sampler binds symbols to
//! concrete values at execution time; until then the expression stays
//! symbolic and contributes its *structure* (not its constants) to the
//! circuit signature.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use rustc_hash::FxHashMap;

/// A symbolic or concrete parameter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// A symbolic parameter.
    Symbol(String),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Subtraction.
    Sub(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Division.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// Create a constant parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create a symbolic parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// Create a π constant.
    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    /// Check if this expression contains any unbound symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Try to evaluate as a concrete f64 value.
    ///
    /// Returns `None` if any symbol remains unbound or a division by
    /// zero would occur.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Pi => Some(PI),
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Sub(a, b) => Some(a.as_f64()? - b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            ParameterExpression::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
        }
    }

    /// Collect symbol names in first-appearance order.
    ///
    /// The ordering matters: the sampler matches positional parameter
    /// values against this sequence.
    pub fn symbols_ordered(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.walk_symbols(&mut out);
        out
    }

    fn walk_symbols(&self, out: &mut Vec<String>) {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => {}
            ParameterExpression::Symbol(name) => {
                if !out.iter().any(|n| n == name) {
                    out.push(name.clone());
                }
            }
            ParameterExpression::Neg(e) => e.walk_symbols(out),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => {
                a.walk_symbols(out);
                b.walk_symbols(out);
            }
        }
    }

    /// Bind a single symbol to a value, returning a new expression.
    pub fn bind(&self, name: &str, value: f64) -> Self {
        let mut map = FxHashMap::default();
        map.insert(name.to_string(), value);
        self.bind_all(&map)
    }

    /// Bind every symbol found in `values`, returning a new expression.
    ///
    /// Symbols absent from the map are left symbolic.
    pub fn bind_all(&self, values: &FxHashMap<String, f64>) -> Self {
        match self {
            ParameterExpression::Symbol(n) => match values.get(n) {
                Some(v) => ParameterExpression::Constant(*v),
                None => self.clone(),
            },
            ParameterExpression::Constant(_) | ParameterExpression::Pi => self.clone(),
            ParameterExpression::Neg(e) => {
                ParameterExpression::Neg(Box::new(e.bind_all(values)))
            }
            ParameterExpression::Add(a, b) => ParameterExpression::Add(
                Box::new(a.bind_all(values)),
                Box::new(b.bind_all(values)),
            ),
            ParameterExpression::Sub(a, b) => ParameterExpression::Sub(
                Box::new(a.bind_all(values)),
                Box::new(b.bind_all(values)),
            ),
            ParameterExpression::Mul(a, b) => ParameterExpression::Mul(
                Box::new(a.bind_all(values)),
                Box::new(b.bind_all(values)),
            ),
            ParameterExpression::Div(a, b) => ParameterExpression::Div(
                Box::new(a.bind_all(values)),
                Box::new(b.bind_all(values)),
            ),
        }
    }

    /// Render the expression for the structural circuit signature.
    ///
    /// Concrete constants are masked to `_` so that two circuits that
    /// differ only in bound angle values share a signature, while symbol
    /// identity is preserved so that differently named parameters do not.
    pub fn structural_repr(&self) -> String {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => "_".to_string(),
            ParameterExpression::Symbol(name) => name.clone(),
            ParameterExpression::Neg(e) => format!("-({})", e.structural_repr()),
            ParameterExpression::Add(a, b) => {
                format!("({}+{})", a.structural_repr(), b.structural_repr())
            }
            ParameterExpression::Sub(a, b) => {
                format!("({}-{})", a.structural_repr(), b.structural_repr())
            }
            ParameterExpression::Mul(a, b) => {
                format!("({}*{})", a.structural_repr(), b.structural_repr())
            }
            ParameterExpression::Div(a, b) => {
                format!("({}/{})", a.structural_repr(), b.structural_repr())
            }
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "π"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Sub(a, b) => write!(f, "({a} - {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
            ParameterExpression::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<i32> for ParameterExpression {
    fn from(value: i32) -> Self {
        ParameterExpression::Constant(f64::from(value))
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Sub for ParameterExpression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        ParameterExpression::Sub(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        let p = ParameterExpression::constant(1.5);
        assert!(!p.is_symbolic());
        assert_eq!(p.as_f64(), Some(1.5));
    }

    #[test]
    fn test_symbol() {
        let p = ParameterExpression::symbol("theta");
        assert!(p.is_symbolic());
        assert_eq!(p.as_f64(), None);
        assert_eq!(p.symbols_ordered(), vec!["theta"]);
    }

    #[test]
    fn test_bind() {
        let p = ParameterExpression::symbol("theta");
        let bound = p.bind("theta", PI / 2.0);
        assert!(!bound.is_symbolic());
        assert!((bound.as_f64().unwrap() - PI / 2.0).abs() < 1e-10);
        // `p` itself is untouched
        assert!(p.is_symbolic());
    }

    #[test]
    fn test_symbols_ordered_dedups_and_preserves_order() {
        let theta = ParameterExpression::symbol("theta");
        let phi = ParameterExpression::symbol("phi");
        let expr = theta.clone() * phi + theta;
        assert_eq!(expr.symbols_ordered(), vec!["theta", "phi"]);
    }

    #[test]
    fn test_structural_repr_masks_constants() {
        let a = ParameterExpression::constant(0.25);
        let b = ParameterExpression::constant(1.75);
        assert_eq!(a.structural_repr(), b.structural_repr());

        let sym = ParameterExpression::symbol("theta");
        assert_eq!(sym.structural_repr(), "theta");

        let expr = ParameterExpression::symbol("theta") * ParameterExpression::constant(2.0);
        assert_eq!(expr.structural_repr(), "(theta*_)");
    }

    proptest::proptest! {
        #[test]
        fn prop_binding_every_symbol_makes_concrete(
            values in proptest::collection::vec(-10.0_f64..10.0, 1..4)
        ) {
            let mut expr = ParameterExpression::symbol("p0");
            for i in 1..values.len() {
                expr = expr + ParameterExpression::symbol(format!("p{i}"));
            }
            let assignment: FxHashMap<String, f64> = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("p{i}"), *v))
                .collect();

            let bound = expr.bind_all(&assignment);
            proptest::prop_assert!(!bound.is_symbolic());
            let expected: f64 = values.iter().sum();
            proptest::prop_assert!((bound.as_f64().unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bind_all_partial() {
        let expr =
            ParameterExpression::symbol("theta") + ParameterExpression::symbol("phi");
        let mut values = FxHashMap::default();
        values.insert("theta".to_string(), 1.0);

        let partial = expr.bind_all(&values);
        assert!(partial.is_symbolic());
        assert_eq!(partial.symbols_ordered(), vec!["phi"]);
    }
}
