use crate::core::io::util::format_decimal;
use crate::core::models::geometry::BoxGeometry;
use crate::core::models::species::{SoluteSpec, SolventSpec, Species};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default minimum inter-atomic distance, in Å, enforced by the packer.
pub const DEFAULT_TOLERANCE: f64 = 2.0;

#[derive(Debug, Error, PartialEq)]
pub enum PackingConfigError {
    #[error("Line {line}: unknown directive '{keyword}'")]
    UnknownDirective { line: usize, keyword: String },
    #[error("Line {line}: '{keyword}' {message}")]
    InvalidValue {
        line: usize,
        keyword: String,
        message: String,
    },
    #[error("Line {line}: '{keyword}' is only valid inside a structure block")]
    OutsideStructure { line: usize, keyword: String },
    #[error("Structure block for '{0}' is not closed")]
    UnclosedStructure(String),
    #[error("Missing required directive '{0}'")]
    MissingDirective(&'static str),
    #[error("'{keyword}' path '{path}' contains whitespace, which the packer cannot read", path = path.display())]
    WhitespaceInPath { keyword: &'static str, path: PathBuf },
}

/// One `structure … end structure` block.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureBlock {
    pub path: PathBuf,
    pub number: usize,
    /// `inside box` bounds: `x0 y0 z0 x1 y1 z1`.
    pub inside_box: [f64; 6],
}

/// A Packmol input file restricted to the directives solvgen emits.
///
/// Rendering is bit-exact: directive order is `tolerance`, `filetype`, `output`,
/// `pbc`, then one block per solute in input order and finally the solvent block.
#[derive(Debug, Clone, PartialEq)]
pub struct PackingConfig {
    pub tolerance: f64,
    pub filetype: String,
    pub output: PathBuf,
    pub pbc: [f64; 3],
    pub structures: Vec<StructureBlock>,
}

impl PackingConfig {
    /// Lays out every solute and the solvent randomly inside the whole box.
    ///
    /// `locate` gives the path the packer should read each species from.
    pub fn build(
        geometry: &BoxGeometry,
        solutes: &[SoluteSpec],
        solvent: &SolventSpec,
        solvent_count: usize,
        output: &Path,
        tolerance: f64,
        locate: impl Fn(&Species) -> PathBuf,
    ) -> Self {
        let l = geometry.edge();
        let block = |species: &Species, number: usize| StructureBlock {
            path: locate(species),
            number,
            inside_box: [0.0, 0.0, 0.0, l, l, l],
        };

        let mut structures: Vec<StructureBlock> = solutes
            .iter()
            .map(|s| block(&s.species, s.count as usize))
            .collect();
        structures.push(block(&solvent.species, solvent_count));

        Self {
            tolerance,
            filetype: "xyz".to_string(),
            output: output.to_path_buf(),
            pbc: [l, l, l],
            structures,
        }
    }

    /// Serializes to Packmol's input grammar.
    pub fn render(&self) -> String {
        let [lx, ly, lz] = self.pbc.map(format_decimal);
        let mut lines = vec![
            format!("tolerance {}", format_decimal(self.tolerance)),
            format!("filetype {}", self.filetype),
            format!("output {}", self.output.display()),
            format!("pbc {} {} {}", lx, ly, lz),
        ];

        for block in &self.structures {
            let [x0, y0, z0, x1, y1, z1] = block.inside_box.map(format_box_bound);
            lines.push(format!("\nstructure {}", block.path.display()));
            lines.push(format!("  number {}", block.number));
            lines.push(format!(
                "  inside box {} {} {} {} {} {}",
                x0, y0, z0, x1, y1, z1
            ));
            lines.push("end structure".to_string());
        }

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Parses a configuration written by [`PackingConfig::render`]. Comments (`#`)
    /// and blank lines are ignored; any directive outside the emitted grammar is an
    /// error.
    pub fn parse(text: &str) -> Result<Self, PackingConfigError> {
        let mut tolerance = None;
        let mut filetype = None;
        let mut output = None;
        let mut pbc = None;
        let mut structures = Vec::new();
        let mut current: Option<StructureBlock> = None;

        for (idx, raw_line) in text.lines().enumerate() {
            let line_num = idx + 1;
            let line = raw_line.split('#').next().unwrap_or("").trim();
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some(&keyword) = tokens.first() else {
                continue;
            };
            let args = &tokens[1..];

            match (keyword, current.as_mut()) {
                ("structure", _) => {
                    if let Some(open) = current.take() {
                        return Err(PackingConfigError::UnclosedStructure(
                            open.path.display().to_string(),
                        ));
                    }
                    let path = single_arg(line_num, keyword, args)?;
                    current = Some(StructureBlock {
                        path: PathBuf::from(path),
                        number: 0,
                        inside_box: [0.0; 6],
                    });
                }
                ("end", _) if args == ["structure"] => match current.take() {
                    Some(block) => structures.push(block),
                    None => {
                        return Err(PackingConfigError::OutsideStructure {
                            line: line_num,
                            keyword: "end structure".into(),
                        });
                    }
                },
                ("number", Some(block)) => {
                    let raw = single_arg(line_num, keyword, args)?;
                    block.number = raw
                        .parse()
                        .map_err(|_| invalid(line_num, keyword, "expects a non-negative integer"))?;
                }
                ("inside", Some(block)) => {
                    if args.first() != Some(&"box") {
                        return Err(invalid(line_num, keyword, "supports only 'box' regions"));
                    }
                    let bounds = parse_floats(line_num, keyword, &args[1..])?;
                    block.inside_box = bounds
                        .try_into()
                        .map_err(|_| invalid(line_num, keyword, "box expects 6 bounds"))?;
                }
                ("number" | "inside", None) => {
                    return Err(PackingConfigError::OutsideStructure {
                        line: line_num,
                        keyword: keyword.into(),
                    });
                }
                ("tolerance", None) => {
                    let values = parse_floats(line_num, keyword, args)?;
                    tolerance = Some(
                        *values
                            .first()
                            .filter(|_| values.len() == 1)
                            .ok_or_else(|| invalid(line_num, keyword, "expects one value"))?,
                    );
                }
                ("filetype", None) => {
                    filetype = Some(single_arg(line_num, keyword, args)?.to_string());
                }
                ("output", None) => {
                    output = Some(PathBuf::from(single_arg(line_num, keyword, args)?));
                }
                ("pbc", None) => {
                    let values = parse_floats(line_num, keyword, args)?;
                    pbc = Some(match values.as_slice() {
                        [x, y, z] => [*x, *y, *z],
                        [0.0, 0.0, 0.0, x, y, z] => [*x, *y, *z],
                        _ => {
                            return Err(invalid(
                                line_num,
                                keyword,
                                "expects 3 lengths or 6 bounds starting at the origin",
                            ));
                        }
                    });
                }
                _ => {
                    return Err(PackingConfigError::UnknownDirective {
                        line: line_num,
                        keyword: keyword.into(),
                    });
                }
            }
        }

        if let Some(open) = current {
            return Err(PackingConfigError::UnclosedStructure(
                open.path.display().to_string(),
            ));
        }

        Ok(Self {
            tolerance: tolerance.ok_or(PackingConfigError::MissingDirective("tolerance"))?,
            filetype: filetype.ok_or(PackingConfigError::MissingDirective("filetype"))?,
            output: output.ok_or(PackingConfigError::MissingDirective("output"))?,
            pbc: pbc.ok_or(PackingConfigError::MissingDirective("pbc"))?,
            structures,
        })
    }

    /// Checks that every path survives the packer's whitespace tokenization.
    pub fn validate(&self) -> Result<(), PackingConfigError> {
        let paths = std::iter::once(("output", &self.output))
            .chain(self.structures.iter().map(|b| ("structure", &b.path)));
        for (keyword, path) in paths {
            if path.to_string_lossy().chars().any(char::is_whitespace) {
                return Err(PackingConfigError::WhitespaceInPath {
                    keyword,
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Total number of molecules requested across all blocks.
    pub fn molecule_count(&self) -> usize {
        self.structures.iter().map(|s| s.number).sum()
    }
}

/// Lower box bounds are written as `0.` like hand-written Packmol inputs.
fn format_box_bound(value: f64) -> String {
    if value == 0.0 {
        "0.".to_string()
    } else {
        format_decimal(value)
    }
}

fn invalid(line: usize, keyword: &str, message: &str) -> PackingConfigError {
    PackingConfigError::InvalidValue {
        line,
        keyword: keyword.into(),
        message: message.into(),
    }
}

fn single_arg<'a>(
    line: usize,
    keyword: &str,
    args: &[&'a str],
) -> Result<&'a str, PackingConfigError> {
    match args {
        [value] => Ok(value),
        _ => Err(invalid(line, keyword, "expects exactly one argument")),
    }
}

fn parse_floats(line: usize, keyword: &str, args: &[&str]) -> Result<Vec<f64>, PackingConfigError> {
    args.iter()
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|_| invalid(line, keyword, &format!("has a non-numeric value '{}'", raw)))
        })
        .collect()
}
