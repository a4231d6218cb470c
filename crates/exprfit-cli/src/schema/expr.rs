use std::{fmt, iter};

use exprfit_scoring::{
    candidate::{CandidateTree, Evaluation},
    matrix::FeatureMatrix,
    options::ScoringOptions,
};
use serde::{Deserialize, Serialize};

/// A small expression tree read from JSON.
///
/// ```json
/// { "binary": { "op": "add",
///               "lhs": { "binary": { "op": "mul", "lhs": { "const": 2.0 }, "rhs": { "feature": 0 } } },
///               "rhs": { "const": 1.0 } } }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Const(f64),
    Feature(usize),
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    #[display("neg")]
    Neg,
    #[display("exp")]
    Exp,
    #[display("log")]
    Log,
    #[display("sqrt")]
    Sqrt,
    #[display("sin")]
    Sin,
    #[display("cos")]
    Cos,
}

impl UnaryOp {
    fn apply(self, v: f64) -> f64 {
        match self {
            Self::Neg => -v,
            Self::Exp => v.exp(),
            Self::Log => v.ln(),
            Self::Sqrt => v.sqrt(),
            Self::Sin => v.sin(),
            Self::Cos => v.cos(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    #[display("+")]
    Add,
    #[display("-")]
    Sub,
    #[display("*")]
    Mul,
    #[display("/")]
    Div,
    #[display("^")]
    Pow,
}

impl BinaryOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::Pow => a.powf(b),
        }
    }
}

impl Expr {
    /// Evaluates every row, or returns `None` on any non-finite value or unknown feature.
    fn eval(&self, x: &FeatureMatrix) -> Option<Vec<f64>> {
        let values = match self {
            Self::Const(c) => vec![*c; x.n_rows()],
            Self::Feature(i) => {
                if *i >= x.n_features() {
                    return None;
                }
                x.feature(*i).to_vec()
            }
            Self::Unary { op, arg } => {
                let mut values = arg.eval(x)?;
                for v in &mut values {
                    *v = op.apply(*v);
                }
                values
            }
            Self::Binary { op, lhs, rhs } => {
                let lhs = lhs.eval(x)?;
                let rhs = rhs.eval(x)?;
                iter::zip(lhs, rhs).map(|(a, b)| op.apply(a, b)).collect()
            }
        };
        values.iter().all(|v| v.is_finite()).then_some(values)
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Self::Const(_) | Self::Feature(_) => 1,
            Self::Unary { arg, .. } => 1 + arg.node_count(),
            Self::Binary { lhs, rhs, .. } => 1 + lhs.node_count() + rhs.node_count(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(c) => write!(f, "{c}"),
            Self::Feature(i) => write!(f, "x{i}"),
            Self::Unary { op, arg } => write!(f, "{op}({arg})"),
            Self::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
        }
    }
}

impl CandidateTree for Expr {
    fn evaluate(&self, x: &FeatureMatrix, _options: &ScoringOptions) -> Evaluation {
        match self.eval(x) {
            Some(prediction) => Evaluation::completed(prediction),
            None => Evaluation::failed(),
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn complexity(&self, _options: &ScoringOptions) -> f64 {
        self.node_count() as f64
    }
}
