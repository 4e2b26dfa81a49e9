use crate::core::io::traits::StructureFile;
use crate::core::io::xyz::{XyzError, XyzFile};
use crate::core::models::species::Species;
use crate::engine::error::EngineError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Resolves species names to geometry files under a structure-file root.
///
/// Each geometry is read at most once; later lookups of the same name are served from
/// memory. The library is shared by all sweep workers.
#[derive(Debug)]
pub struct StructureLibrary {
    root: PathBuf,
    cache: Mutex<HashMap<String, Species>>,
}

impl StructureLibrary {
    /// Creates a library rooted at `root`, made absolute against the current directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, EngineError> {
        let root = root.as_ref();
        let root = std::path::absolute(root).map_err(|e| EngineError::io(root, e))?;
        Ok(Self {
            root,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// `<root>/<name>.xyz`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.xyz", name))
    }

    /// Looks up a species by name, reading its geometry on first use.
    ///
    /// # Errors
    ///
    /// - [`EngineError::MissingStructureFile`] if `<root>/<name>.xyz` does not exist.
    /// - [`EngineError::MalformedStructure`] if it is not a single valid XYZ frame.
    pub fn resolve(&self, name: &str) -> Result<Species, EngineError> {
        if let Some(species) = self.lock().get(name) {
            return Ok(species.clone());
        }

        let path = self.path_for(name);
        if !path.is_file() {
            return Err(EngineError::MissingStructureFile {
                species: name.to_string(),
                path,
            });
        }
        let structure = XyzFile::read_from_path(&path).map_err(|source| match source {
            XyzError::Io(e) => EngineError::io(&path, e),
            source => EngineError::MalformedStructure {
                path: path.clone(),
                source,
            },
        })?;

        let species = Species {
            name: name.to_string(),
            structure_path: path,
            atom_count: structure.len(),
            molar_mass: structure.molar_mass(),
            charge: None,
        };
        debug!(
            atoms = species.atom_count,
            molar_mass = species.molar_mass,
            "Resolved species '{}'.",
            name
        );
        self.lock().insert(name.to_string(), species.clone());
        Ok(species)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Species>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const WATER: &str = "3\nwater\nO 0.0 0.0 0.0\nH 0.757 0.586 0.0\nH -0.757 0.586 0.0\n";

    #[test]
    fn resolve_reads_atom_count_and_molar_mass() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("water.xyz"), WATER).unwrap();
        let library = StructureLibrary::new(dir.path()).unwrap();

        let water = library.resolve("water").unwrap();
        assert_eq!(water.atom_count, 3);
        assert!((water.molar_mass - 18.015).abs() < 1e-9);
        assert_eq!(water.structure_path, dir.path().join("water.xyz"));
        assert_eq!(water.charge, None);
    }

    #[test]
    fn resolve_serves_repeated_lookups_from_memory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("water.xyz");
        fs::write(&path, WATER).unwrap();
        let library = StructureLibrary::new(dir.path()).unwrap();

        library.resolve("water").unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(library.resolve("water").unwrap().atom_count, 3);
    }

    #[test]
    fn missing_file_is_reported_with_species_name() {
        let dir = tempdir().unwrap();
        let library = StructureLibrary::new(dir.path()).unwrap();
        let err = library.resolve("acetonitrile").unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingStructureFile { ref species, .. } if species == "acetonitrile"
        ));
    }

    #[test]
    fn malformed_file_is_reported_as_io_family() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.xyz"), "2\n\nXx 0 0 0\n").unwrap();
        let library = StructureLibrary::new(dir.path()).unwrap();
        let err = library.resolve("bad").unwrap_err();
        assert!(matches!(err, EngineError::MalformedStructure { .. }));
        assert_eq!(err.kind(), "IOError");
    }

    #[test]
    fn relative_root_is_made_absolute() {
        let library = StructureLibrary::new("structures").unwrap();
        let path = library.path_for("water");
        assert!(path.is_absolute());
        assert!(path.ends_with("structures/water.xyz"));
    }
}
