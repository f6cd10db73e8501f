use clap::Subcommand;
use serde_json::{Map, Number, Value};

#[derive(Debug, Subcommand)]
pub enum SearchCommands {
    /// Validate a search request and print it, or print every field error
    Validate {
        /// Street address to search around
        #[arg(long)]
        address: String,
        /// Search radius in miles (1-50)
        #[arg(long, allow_hyphen_values = true)]
        radius: String,
        /// Number of competitors to return (1-20)
        #[arg(long, allow_hyphen_values = true)]
        competitor_count: String,
    },
}

pub fn run(command: SearchCommands) -> anyhow::Result<()> {
    match command {
        SearchCommands::Validate {
            address,
            radius,
            competitor_count,
        } => {
            let raw = raw_request(&address, &radius, &competitor_count);
            match compmap_core::validate(&raw) {
                Ok(request) => {
                    println!("{}", serde_json::to_string_pretty(&request)?);
                    Ok(())
                }
                Err(e) => {
                    println!("{}", serde_json::to_string_pretty(&e.field_messages())?);
                    Err(e.into())
                }
            }
        }
    }
}

/// Assemble the request body the HTTP API would receive for these arguments.
pub(crate) fn raw_request(address: &str, radius: &str, competitor_count: &str) -> Value {
    let mut body = Map::new();
    body.insert("address".to_string(), Value::String(address.to_string()));
    body.insert("radius".to_string(), numeric_arg(radius));
    body.insert("competitorCount".to_string(), numeric_arg(competitor_count));
    Value::Object(body)
}

/// Finite numbers become JSON numbers. Anything else, `NaN` and `inf`
/// included, stays a string so validation reports a type mismatch.
fn numeric_arg(text: &str) -> Value {
    text.trim()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map_or_else(|| Value::String(text.to_string()), Value::Number)
}
