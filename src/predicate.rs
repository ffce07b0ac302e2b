use crate::{
    catalog::Record,
    error::AccessError,
    parser::Constraint,
    template::Template,
};
use fiql_syntax::{ConditionKind, Expr};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};
use tracing::trace;

/// A bound expression materialized into populated record instances.
///
/// Each leaf carries a template: an instance of the target record whose
/// named field holds the comparison argument. Evaluators read the value back
/// from the template and compare it with the candidate using the leaf's
/// [`ConditionKind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate<R> {
    /// One comparison.
    Condition {
        path: String,
        kind: ConditionKind,
        template: R,
    },
    /// A flat AND of comparisons sharing a single template. A path repeated in
    /// the expression keeps its last kind and value.
    Conjunction {
        conditions: BTreeMap<String, ConditionKind>,
        template: R,
    },
    And(Vec<Predicate<R>>),
    Or(Vec<Predicate<R>>),
}

impl<R> Predicate<R> {
    /// Kind bound to `path` in a single-template node.
    pub fn kind_of(&self, path: &str) -> Option<ConditionKind> {
        match self {
            Predicate::Condition { path: own, kind, .. } => (own == path).then_some(*kind),
            Predicate::Conjunction { conditions, .. } => conditions.get(path).copied(),
            Predicate::And(_) | Predicate::Or(_) => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Predicate::And(_) | Predicate::Or(_))
    }

    /// Every template, depth-first.
    pub fn templates(&self) -> Vec<&R> {
        let mut out = Vec::new();
        self.collect_templates(&mut out);
        out
    }

    fn collect_templates<'a>(&'a self, out: &mut Vec<&'a R>) {
        match self {
            Predicate::Condition { template, .. } | Predicate::Conjunction { template, .. } => {
                out.push(template)
            }
            Predicate::And(parts) | Predicate::Or(parts) => {
                for part in parts {
                    part.collect_templates(out);
                }
            }
        }
    }
}

impl<R> fmt::Display for Predicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, parts) = match self {
            Predicate::Condition { path, kind, .. } => return write!(f, "{path} {kind}"),
            Predicate::Conjunction { conditions, .. } => {
                f.write_str("ALL:[")?;
                for (i, (path, kind)) in conditions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{path} {kind}")?;
                }
                return f.write_str("]");
            }
            Predicate::And(parts) => ("AND", parts),
            Predicate::Or(parts) => ("OR", parts),
        };
        write!(f, "{label}:[")?;
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{part}")?;
        }
        f.write_str("]")
    }
}

/// Materializes `expr` leaf by leaf. Every template starts as a copy of
/// `prototype`; an AND whose members are all leaves collapses into one
/// [`Predicate::Conjunction`] over a single template.
pub(crate) fn materialize<R: Record>(
    prototype: &Template<R>,
    expr: &Expr<Constraint>,
) -> Result<Predicate<R>, AccessError> {
    match expr {
        Expr::Leaf(constraint) => {
            let mut template = prototype.clone();
            template.set_value(&constraint.path, constraint.value.clone())?;
            Ok(Predicate::Condition {
                path: constraint.path.clone(),
                kind: constraint.kind,
                template: template.into_instance()?,
            })
        }
        Expr::And(parts) if parts.iter().all(Expr::is_leaf) => {
            trace!(members = parts.len(), "flat conjunction, sharing one template");
            let mut template = prototype.clone();
            let mut conditions = BTreeMap::new();
            for constraint in parts.iter().filter_map(Expr::as_leaf) {
                template.set_value(&constraint.path, constraint.value.clone())?;
                conditions.insert(constraint.path.clone(), constraint.kind);
            }
            Ok(Predicate::Conjunction {
                conditions,
                template: template.into_instance()?,
            })
        }
        Expr::And(parts) => Ok(Predicate::And(materialize_all(prototype, parts)?)),
        Expr::Or(parts) => Ok(Predicate::Or(materialize_all(prototype, parts)?)),
    }
}

fn materialize_all<R: Record>(
    prototype: &Template<R>,
    parts: &[Expr<Constraint>],
) -> Result<Vec<Predicate<R>>, AccessError> {
    parts
        .iter()
        .map(|part| materialize(prototype, part))
        .collect()
}
