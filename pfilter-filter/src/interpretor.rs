use pfilter_common::Verdict;

use crate::{
    frontend::{parser, Expr},
    predicate::{match_ethertype, match_ipv4, match_tcp, match_transport},
    Error, Filterable,
};

/// A compiled filter expression.
///
/// Evaluation is stateless, a single interpretor can classify frames from
/// several threads at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretor {
    ast: Expr,
}

/// Outcome of a filter over one frame, with the leaf that settled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Explanation<'a> {
    /// `None` when a header needed by the deciding leaf was truncated or
    /// malformed.
    pub outcome: Option<bool>,
    pub leaf: &'a Expr,
}

impl Explanation<'_> {
    pub fn matched(&self) -> bool {
        self.outcome.unwrap_or(false)
    }
}

impl Interpretor {
    pub fn parse(input: &str) -> Result<Self, Error> {
        parser::filter(input).map(|expr| Self { ast: expr })
    }

    pub fn new(ast: Expr) -> Self {
        Self { ast }
    }

    pub fn expr(&self) -> &Expr {
        &self.ast
    }

    /// Returns true if the frame matches the expression.
    ///
    /// Leaves are three valued: a leaf whose headers are truncated or
    /// malformed is undecided, `not` keeps it undecided and an undecided
    /// expression never matches.
    pub fn filter<F: Filterable + ?Sized>(&self, f: &F) -> bool {
        self.explain(f).matched()
    }

    /// Same as [Interpretor::filter], in socket filter terms.
    pub fn verdict<F: Filterable + ?Sized>(&self, f: &F) -> Verdict {
        self.filter(f).into()
    }

    /// Evaluates the expression and reports which leaf decided it.
    pub fn explain<F: Filterable + ?Sized>(&self, f: &F) -> Explanation<'_> {
        Self::eval(f.frame(), &self.ast)
    }

    fn eval<'a>(frame: &[u8], o: &'a Expr) -> Explanation<'a> {
        let outcome = match o {
            Expr::EtherType(t) => match_ethertype(frame, *t),
            Expr::Ipv4 => match_ipv4(frame),
            Expr::Protocol(p) => match_transport(frame, *p),
            Expr::DstPort(p) => match_tcp(frame, |tcp| tcp.destination_port == *p),
            Expr::SrcPort(p) => match_tcp(frame, |tcp| tcp.source_port == *p),
            Expr::Port(p) => match_tcp(frame, |tcp| {
                tcp.destination_port == *p || tcp.source_port == *p
            }),
            Expr::And(a, b) => return Self::and(frame, a, b),
            Expr::Or(a, b) => return Self::or(frame, a, b),
            Expr::Not(a) => return Self::not(frame, a),
        };

        Explanation { outcome, leaf: o }
    }

    /// `true` settles the disjunction even when the other side is undecided.
    fn or<'a>(frame: &[u8], a: &'a Expr, b: &'a Expr) -> Explanation<'a> {
        let left = Self::eval(frame, a);
        if left.outcome == Some(true) {
            return left;
        }

        let right = Self::eval(frame, b);
        match (left.outcome, right.outcome) {
            (None, Some(false)) => left,
            _ => right,
        }
    }

    /// `false` settles the conjunction even when the other side is undecided.
    fn and<'a>(frame: &[u8], a: &'a Expr, b: &'a Expr) -> Explanation<'a> {
        let left = Self::eval(frame, a);
        if left.outcome == Some(false) {
            return left;
        }

        let right = Self::eval(frame, b);
        match (left.outcome, right.outcome) {
            (None, Some(true)) => left,
            _ => right,
        }
    }

    #[inline]
    fn not<'a>(frame: &[u8], a: &'a Expr) -> Explanation<'a> {
        let inner = Self::eval(frame, a);
        Explanation {
            outcome: inner.outcome.map(|matched| !matched),
            ..inner
        }
    }
}

impl std::str::FromStr for Interpretor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
