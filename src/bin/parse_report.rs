//! Utility to parse a saved upstream report and print the extracted records.
//!
//! Usage: `parse_report <cpf|telefone|nome> < report.txt`

use std::io::Read;

use rust_consulta_api::report_parser::{
    parse_name_report, parse_person_report, parse_phone_report,
};

/// Reads a report from stdin and prints the parsed JSON to stdout.
fn main() -> anyhow::Result<()> {
    let kind = std::env::args().nth(1).unwrap_or_else(|| "cpf".to_string());

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;

    let output = match kind.as_str() {
        "cpf" => serde_json::to_string_pretty(&parse_person_report(&text))?,
        "nome" | "name" => serde_json::to_string_pretty(&parse_name_report(&text))?,
        "telefone" | "phone" => serde_json::to_string_pretty(&parse_phone_report(&text))?,
        other => anyhow::bail!("Unknown report kind '{}'; expected cpf, telefone or nome", other),
    };

    println!("{}", output);
    Ok(())
}
