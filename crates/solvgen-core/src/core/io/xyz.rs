use crate::core::chemistry::Element;
use crate::core::io::traits::StructureFile;
use crate::core::models::structure::{Atom, Structure};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Annotation key under which the free-text comment line of a plain XYZ file is kept.
pub const COMMENT_KEY: &str = "comment";

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
    #[error("Expected a single frame, found additional content on line {line}")]
    MultipleFrames { line: usize },
    #[error("Unsupported header: {0}")]
    UnsupportedHeader(String),
}

#[derive(Debug, Error)]
pub enum XyzParseErrorKind {
    #[error("Invalid atom count (value: '{value}')")]
    InvalidCount { value: String },
    #[error("Invalid float in column {column} (value: '{value}')")]
    InvalidFloat { column: usize, value: String },
    #[error("Unknown element label '{0}'")]
    UnknownElement(String),
    #[error("Atom record needs a label and three coordinates")]
    TooFewColumns,
}

/// One frame as read from disk, before format-specific header interpretation.
pub(crate) struct RawFrame {
    pub atoms: Vec<Atom>,
    pub comment: String,
}

/// Reads exactly one XYZ frame. Blank lines after the last atom are tolerated; any
/// other trailing content means the file holds more than one structure.
pub(crate) fn read_frame(reader: &mut impl BufRead) -> Result<RawFrame, XyzError> {
    let mut lines = reader.lines().enumerate();

    let (_, count_line) = lines
        .next()
        .ok_or_else(|| XyzError::MissingRecord("atom count line".into()))?;
    let count_line = count_line?;
    let count: usize = count_line.trim().parse().map_err(|_| XyzError::Parse {
        line: 1,
        kind: XyzParseErrorKind::InvalidCount {
            value: count_line.trim().into(),
        },
    })?;
    if count == 0 {
        return Err(XyzError::MissingRecord("atom records".into()));
    }

    let (_, comment) = lines
        .next()
        .ok_or_else(|| XyzError::MissingRecord("comment line".into()))?;
    let comment = comment?;

    let mut atoms = Vec::with_capacity(count);
    while atoms.len() < count {
        let Some((idx, line)) = lines.next() else {
            return Err(XyzError::MissingRecord(format!(
                "{} atom records (found {})",
                count,
                atoms.len()
            )));
        };
        atoms.push(parse_atom_line(&line?, idx + 1)?);
    }

    for (idx, line) in lines {
        if !line?.trim().is_empty() {
            return Err(XyzError::MultipleFrames { line: idx + 1 });
        }
    }

    Ok(RawFrame {
        atoms,
        comment: comment.trim().to_string(),
    })
}

fn parse_atom_line(line: &str, line_num: usize) -> Result<Atom, XyzError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(XyzError::Parse {
            line: line_num,
            kind: XyzParseErrorKind::TooFewColumns,
        });
    }

    let element = Element::from_label(fields[0]).map_err(|_| XyzError::Parse {
        line: line_num,
        kind: XyzParseErrorKind::UnknownElement(fields[0].into()),
    })?;

    let mut coords = [0.0; 3];
    for (axis, coord) in coords.iter_mut().enumerate() {
        let raw = fields[axis + 1];
        *coord = raw.parse().map_err(|_| XyzError::Parse {
            line: line_num,
            kind: XyzParseErrorKind::InvalidFloat {
                column: axis + 2,
                value: raw.into(),
            },
        })?;
    }

    Ok(Atom::new(element, Point3::from(coords)))
}

pub(crate) fn write_atom_lines(structure: &Structure, writer: &mut impl Write) -> io::Result<()> {
    for atom in structure.atoms() {
        writeln!(
            writer,
            "{:<2} {:>16.8} {:>16.8} {:>16.8}",
            atom.element.symbol(),
            atom.position.x,
            atom.position.y,
            atom.position.z
        )?;
    }
    Ok(())
}

/// Plain XYZ: atom count, a free-text comment line, then `label x y z` records.
///
/// This is the format Packmol consumes for species geometries and emits for packed
/// systems. It carries no cell information.
pub struct XyzFile;

impl StructureFile for XyzFile {
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let frame = read_frame(reader)?;
        let mut structure = Structure::from_atoms(frame.atoms);
        if !frame.comment.is_empty() {
            structure.insert_info(COMMENT_KEY, frame.comment);
        }
        Ok(structure)
    }

    fn write_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "{}", structure.len())?;
        let comment = structure
            .info()
            .get(COMMENT_KEY)
            .map(String::as_str)
            .unwrap_or("");
        writeln!(writer, "{}", comment)?;
        write_atom_lines(structure, writer)?;
        Ok(())
    }
}
