use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use crate::cli::{GenerateArgs, PackingArgs, SweepArgs};
use crate::error::{CliError, Result};
use solvgen::engine::config::{
    GenerateConfig, GenerateConfigBuilder, OutputConfig, OutputConfigBuilder, PackingSettings,
    SweepConfig, SweepConfigBuilder,
};
use solvgen::engine::normalize::NormalizeOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub fn build_generate_config(args: &GenerateArgs) -> Result<GenerateConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = load_file_config(&args.packing)?;
    let output = merge_output(&args.packing, &file_config, &defaults)?;

    GenerateConfigBuilder::new()
        .output(output)
        .solutes(args.solutes.iter().cloned())
        .solvent(args.solvent.clone())
        .build()
        .map_err(CliError::from)
}

pub fn build_sweep_config(args: &SweepArgs) -> Result<SweepConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = load_file_config(&args.packing)?;
    let output = merge_output(&args.packing, &file_config, &defaults)?;
    let tables = file_config.tables.unwrap_or_default();

    SweepConfigBuilder::new()
        .output(output)
        .cation_table(
            args.cations
                .clone()
                .or(tables.cations)
                .unwrap_or(defaults.cation_table),
        )
        .anion_table(
            args.anions
                .clone()
                .or(tables.anions)
                .unwrap_or(defaults.anion_table),
        )
        .solvent_table(
            args.solvents
                .clone()
                .or(tables.solvents)
                .unwrap_or(defaults.solvent_table),
        )
        .build()
        .map_err(CliError::from)
}

fn load_file_config(args: &PackingArgs) -> Result<FileConfig> {
    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    apply_set_values(file_config, &args.set_values)
}

fn merge_output(
    args: &PackingArgs,
    file_config: &FileConfig,
    defaults: &DefaultsConfig,
) -> Result<OutputConfig> {
    let packing_file = file_config.packing.clone().unwrap_or_default();

    let timeout = args
        .timeout_secs
        .or(packing_file.timeout_secs)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    let packing = PackingSettings {
        executable: args
            .packmol
            .clone()
            .or(packing_file.executable)
            .unwrap_or_else(|| defaults.executable.clone()),
        tolerance: args
            .tolerance
            .or(packing_file.tolerance)
            .unwrap_or(defaults.tolerance),
        timeout,
        keep_work_files: args.keep_work_files
            || packing_file
                .keep_work_files
                .unwrap_or(defaults.keep_work_files),
        normalize: NormalizeOptions {
            cell_padding: args
                .cell_padding
                .or(packing_file.cell_padding)
                .unwrap_or(defaults.cell_padding),
        },
    };

    OutputConfigBuilder::new()
        .structure_root(
            args.structure_root
                .clone()
                .or_else(|| file_config.structure_root.clone())
                .unwrap_or_else(|| defaults.structure_root.clone()),
        )
        .output_dir(
            args.output_dir
                .clone()
                .or_else(|| file_config.output_dir.clone())
                .unwrap_or_else(|| defaults.output_dir.clone()),
        )
        .atom_budget(
            args.atom_budget
                .or(file_config.atom_budget)
                .unwrap_or(defaults.atom_budget),
        )
        .packing(packing)
        .build()
        .map_err(CliError::from)
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "atom-budget" => {
                config.atom_budget = Some(parse_value(key, value_str, "integer")?);
            }
            "structure-root" => config.structure_root = Some(PathBuf::from(value_str)),
            "output-dir" => config.output_dir = Some(PathBuf::from(value_str)),
            "tables.cations" => {
                config.tables.get_or_insert_with(Default::default).cations =
                    Some(PathBuf::from(value_str));
            }
            "tables.anions" => {
                config.tables.get_or_insert_with(Default::default).anions =
                    Some(PathBuf::from(value_str));
            }
            "tables.solvents" => {
                config.tables.get_or_insert_with(Default::default).solvents =
                    Some(PathBuf::from(value_str));
            }
            "packing.executable" => {
                config.packing.get_or_insert_with(Default::default).executable =
                    Some(PathBuf::from(value_str));
            }
            "packing.tolerance" => {
                config.packing.get_or_insert_with(Default::default).tolerance =
                    Some(parse_value(key, value_str, "float")?);
            }
            "packing.timeout-secs" => {
                config.packing.get_or_insert_with(Default::default).timeout_secs =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "packing.keep-work-files" => {
                config
                    .packing
                    .get_or_insert_with(Default::default)
                    .keep_work_files = Some(parse_value(key, value_str, "boolean")?);
            }
            "packing.cell-padding" => {
                config.packing.get_or_insert_with(Default::default).cell_padding =
                    Some(parse_value(key, value_str, "float")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
