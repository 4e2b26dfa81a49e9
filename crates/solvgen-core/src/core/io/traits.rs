use crate::core::models::structure::Structure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Defines the interface for reading and writing single-frame structure files.
///
/// Implementors handle format-specific parsing and serialization; the path-based
/// helpers are provided on top of the reader/writer methods.
pub trait StructureFile {
    /// The error type for I/O and parse failures.
    type Error: Error + From<io::Error>;

    /// Reads exactly one structure from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a single well-formed frame.
    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error>;

    /// Writes a structure to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or the structure cannot be represented.
    fn write_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads one structure from a file path.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Structure, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
