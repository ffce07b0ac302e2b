#![allow(dead_code)]
//! Movie catalog model shared by the `fiql-bind` integration tests.

use fiql_bind::*;
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("fiql_bind=trace,fiql_syntax=debug")
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Director {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Record for Director {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .property(
                "firstName",
                |d| d.first_name.clone(),
                |d, v| d.first_name = Some(v),
            )
            .property(
                "lastName",
                |d| d.last_name.clone(),
                |d, v| d.last_name = Some(v),
            );
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

/// Only ever built from a known name, so it has no empty construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub name: String,
    pub oscars: Option<u32>,
}

impl Record for Actor {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .property("name", |a| Some(a.name.clone()), |a, v| a.name = v)
            .property("oscars", |a| a.oscars, |a, v| a.oscars = Some(v));
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Movie {
    pub director: Option<Director>,
    pub actor: Option<Actor>,
    pub genres: Option<String>,
    pub name: Option<String>,
    pub year: Option<i32>,
    pub distribution_date: Option<String>,
    pub budget: Option<Decimal>,
    pub release: Option<Timestamp>,
}

impl Record for Movie {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .nested("director", |m| m.director.as_ref(), |m, v| m.director = Some(v))
            .nested("actor", |m| m.actor.as_ref(), |m, v| m.actor = Some(v))
            .property("genres", |m| m.genres.clone(), |m, v| m.genres = Some(v))
            .property("name", |m| m.name.clone(), |m, v| m.name = Some(v))
            .property("year", |m| m.year, |m, v| m.year = Some(v))
            .property(
                "distributionDate",
                |m| m.distribution_date.clone(),
                |m, v| m.distribution_date = Some(v),
            )
            .property("budget", |m| m.budget, |m, v| m.budget = Some(v))
            .property("release", |m| m.release, |m, v| m.release = Some(v));
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

/// A getter and a setter of the same name that disagree on the type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Misdeclared {
    pub runtime: Option<u32>,
}

impl Record for Misdeclared {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .getter("runtime", |m| m.runtime)
            .setter("runtime", |m, v: String| m.runtime = v.parse().ok());
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

pub fn parser() -> Parser<Movie> {
    Parser::new(operators()).unwrap()
}

pub fn director(first: Option<&str>, last: Option<&str>) -> Director {
    Director {
        first_name: first.map(String::from),
        last_name: last.map(String::from),
    }
}

pub fn as_condition(predicate: &Predicate<Movie>) -> (&str, ConditionKind, &Movie) {
    match predicate {
        Predicate::Condition {
            path,
            kind,
            template,
        } => (path.as_str(), *kind, template),
        other => panic!("expected Condition, got: {other:?}"),
    }
}

pub fn as_or(predicate: &Predicate<Movie>) -> &Vec<Predicate<Movie>> {
    match predicate {
        Predicate::Or(parts) => parts,
        other => panic!("expected Or, got: {other:?}"),
    }
}

pub fn as_and(predicate: &Predicate<Movie>) -> &Vec<Predicate<Movie>> {
    match predicate {
        Predicate::And(parts) => parts,
        other => panic!("expected And, got: {other:?}"),
    }
}
