use crate::cli::TemplateArgs;
use crate::error::{CliError, Result};
use solvgen::workflows::template;
use tracing::info;

fn parse_values(values: &[String]) -> Result<Vec<(String, String)>> {
    values
        .iter()
        .map(|kv_pair| {
            kv_pair
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| {
                    CliError::Argument(format!(
                        "Invalid --set format: '{}'. Expected KEY=VALUE.",
                        kv_pair
                    ))
                })
        })
        .collect()
}

pub async fn run(args: TemplateArgs) -> Result<()> {
    let values = parse_values(&args.values)?;
    let replacements = template::driver_replacements(&values)?;
    info!(
        "Filling {} with {} placeholder(s).",
        args.template.display(),
        replacements.len()
    );

    template::fill_file(&args.template, &args.output, &replacements)?;
    println!("✓ Wrote {}", args.output.display());
    Ok(())
}
