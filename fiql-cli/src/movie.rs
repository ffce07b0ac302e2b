use fiql_bind::{Fields, Record};
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Person {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Record for Person {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .property(
                "firstName",
                |p| p.first_name.clone(),
                |p, v| p.first_name = Some(v),
            )
            .property(
                "lastName",
                |p| p.last_name.clone(),
                |p, v| p.last_name = Some(v),
            );
    }

    fn instantiate() -> Option<Self> {
        Some(Self::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Movie {
    pub director: Option<Person>,
    pub actor: Option<Person>,
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
