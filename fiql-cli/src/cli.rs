use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[clap(name = "fiql", about = "Compile a FIQL expression against the demo movie model")]
pub struct Cli {
    /// Expression to compile, e.g. `director.lastName==Nolan;year=ge=2000`.
    pub expression: String,
    #[clap(long, value_enum, default_value = "predicate")]
    pub output: Output,
    /// Extra operator token mapped to the CUSTOM kind. Repeatable.
    #[clap(long = "custom-operator", value_name = "TOKEN")]
    pub custom_operators: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Output {
    /// Unbound syntax tree as JSON.
    Ast,
    /// Materialized predicate tree.
    Predicate,
    /// Every comparison applied onto one movie.
    Record,
}
