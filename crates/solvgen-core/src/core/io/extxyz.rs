use crate::core::io::traits::StructureFile;
use crate::core::io::util::{format_decimal, split_key_values};
use crate::core::io::xyz::{XyzError, read_frame, write_atom_lines};
use crate::core::models::geometry::BoxGeometry;
use crate::core::models::structure::Structure;
use std::io::{BufRead, Write};

const PROPERTIES: &str = "species:S:1:pos:R:3";

/// Extended XYZ: plain XYZ whose comment line is a list of `key=value` pairs.
///
/// Written headers carry `Lattice` (when a cell is set), `Properties` and `pbc`, in
/// that order, followed by any remaining annotations sorted by key. Only cubic,
/// axis-aligned lattices can be read back.
pub struct ExtXyzFile;

impl ExtXyzFile {
    fn header(structure: &Structure) -> String {
        let mut fields = Vec::new();
        if let Some(cell) = structure.cell() {
            let a = format_decimal(cell.edge());
            fields.push(format!(
                "Lattice=\"{a} 0.0 0.0 0.0 {a} 0.0 0.0 0.0 {a}\"",
                a = a
            ));
        }
        fields.push(format!("Properties={}", PROPERTIES));
        let flag = if structure.pbc() { "T" } else { "F" };
        fields.push(format!("pbc=\"{f} {f} {f}\"", f = flag));
        for (key, value) in structure.info() {
            if value.contains(char::is_whitespace) {
                fields.push(format!("{}=\"{}\"", key, value));
            } else {
                fields.push(format!("{}={}", key, value));
            }
        }
        fields.join(" ")
    }

    fn parse_lattice(value: &str) -> Result<BoxGeometry, XyzError> {
        let numbers: Vec<f64> = value
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|_| XyzError::UnsupportedHeader(format!("non-numeric Lattice '{}'", value)))?;
        if numbers.len() != 9 {
            return Err(XyzError::UnsupportedHeader(format!(
                "Lattice needs 9 components, found {}",
                numbers.len()
            )));
        }

        let edge = numbers[0];
        let is_cubic = (0..3).all(|row| {
            (0..3).all(|col| {
                let expected = if row == col { edge } else { 0.0 };
                numbers[row * 3 + col] == expected
            })
        });
        if !is_cubic {
            return Err(XyzError::UnsupportedHeader(
                "only cubic, axis-aligned lattices are supported".into(),
            ));
        }
        BoxGeometry::new(edge)
            .ok_or_else(|| XyzError::UnsupportedHeader(format!("invalid lattice edge {}", edge)))
    }

    fn parse_pbc(value: &str) -> Result<bool, XyzError> {
        let flags: Vec<&str> = value.split_whitespace().collect();
        let truthy = |f: &&str| matches!(*f, "T" | "True" | "true" | "1");
        match flags.len() {
            1 => Ok(truthy(&flags[0])),
            3 if flags.iter().all(truthy) => Ok(true),
            3 if !flags.iter().any(truthy) => Ok(false),
            3 => Err(XyzError::UnsupportedHeader(
                "mixed periodic boundary flags are not supported".into(),
            )),
            n => Err(XyzError::UnsupportedHeader(format!(
                "pbc needs 1 or 3 flags, found {}",
                n
            ))),
        }
    }
}

impl StructureFile for ExtXyzFile {
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let frame = read_frame(reader)?;
        let pairs = split_key_values(&frame.comment).map_err(XyzError::UnsupportedHeader)?;

        let mut structure = Structure::from_atoms(frame.atoms);
        for (key, value) in pairs {
            match key.as_str() {
                "Lattice" => structure.set_cell(Some(Self::parse_lattice(&value)?)),
                "pbc" => structure.set_pbc(Self::parse_pbc(&value)?),
                "Properties" => {
                    if !value.starts_with(PROPERTIES) {
                        return Err(XyzError::UnsupportedHeader(format!(
                            "Properties must start with '{}', found '{}'",
                            PROPERTIES, value
                        )));
                    }
                }
                _ => structure.insert_info(key, value),
            }
        }
        Ok(structure)
    }

    fn write_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "{}", structure.len())?;
        writeln!(writer, "{}", Self::header(structure))?;
        write_atom_lines(structure, writer)?;
        Ok(())
    }
}
