use crate::core::io::extxyz::ExtXyzFile;
use crate::core::io::traits::StructureFile;
use crate::core::io::xyz::{XyzError, XyzFile};
use crate::core::models::geometry::BoxGeometry;
use crate::core::models::structure::Structure;
use crate::engine::error::EngineError;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// Options for turning raw packer output into a canonical structure.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizeOptions {
    /// Extra length in Å added to every cell edge. With the default of zero the cell
    /// equals the box the molecules were packed into.
    pub cell_padding: f64,
}

/// Reads the packer's raw XYZ output, attaches the periodic cell and writes the
/// canonical extended XYZ file to `destination`.
///
/// Annotations carried by the raw file are dropped. The file is first written to a
/// temporary sibling and then moved into place, so `destination` either does not exist
/// or holds a complete structure. An existing `destination` is never overwritten.
#[instrument(skip_all, name = "normalize", fields(destination = %destination.display()))]
pub fn normalize(
    raw_path: &Path,
    geometry: &BoxGeometry,
    destination: &Path,
    options: &NormalizeOptions,
) -> Result<Structure, EngineError> {
    let mut structure =
        XyzFile::read_from_path(raw_path).map_err(|source| EngineError::MalformedPackedOutput {
            path: raw_path.to_path_buf(),
            source,
        })?;

    let cell = geometry
        .padded(options.cell_padding)
        .ok_or(EngineError::InvalidGeometry {
            edge: geometry.edge() + options.cell_padding,
        })?;

    structure.clear_info();
    structure.set_cell(Some(cell));
    structure.set_pbc(true);

    persist(&structure, destination)?;
    debug!(
        atoms = structure.len(),
        cell = cell.edge(),
        "Wrote canonical structure."
    );
    Ok(structure)
}

fn persist(structure: &Structure, destination: &Path) -> Result<(), EngineError> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir).map_err(|e| EngineError::io(dir, e))?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        ExtXyzFile::write_to(structure, &mut writer).map_err(|e| match e {
            XyzError::Io(source) => EngineError::io(temp.path(), source),
            other => EngineError::io(temp.path(), io::Error::other(other.to_string())),
        })?;
        writer.flush().map_err(|e| EngineError::io(temp.path(), e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| EngineError::io(temp.path(), e))?;

    temp.persist_noclobber(destination)
        .map_err(|e| EngineError::io(destination, e.error))?;
    Ok(())
}
