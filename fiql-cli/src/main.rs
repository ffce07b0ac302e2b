mod cli;
mod movie;

use anyhow::{Context, Result};
use clap::Parser as _;
use cli::{Cli, Output};
use fiql_bind::{ConditionKind, Parser};
use fiql_syntax::parse_expression;
use movie::Movie;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut operators = fiql_bind::operators().clone();
    for token in &cli.custom_operators {
        operators
            .register(token.as_str(), ConditionKind::Custom)
            .with_context(|| format!("Failed to register operator {token:?}"))?;
    }
    debug!(operators = operators.len(), "operator table ready");

    match cli.output {
        Output::Ast => {
            let expr = parse_expression(&cli.expression, &operators)
                .context("Failed to parse expression")?;
            println!("{}", serde_json::to_string_pretty(&expr)?);
        }
        Output::Predicate => {
            let parser = Parser::<Movie>::new(&operators)?;
            let predicate = parser
                .parse(&cli.expression)
                .context("Failed to compile expression")?;
            println!("{predicate}");
            println!("{}", serde_json::to_string_pretty(&predicate)?);
        }
        Output::Record => {
            let parser = Parser::<Movie>::new(&operators)?;
            let movie = parser
                .populate(&cli.expression)
                .context("Failed to populate movie")?;
            println!("{}", serde_json::to_string_pretty(&movie)?);
        }
    }
    Ok(())
}
