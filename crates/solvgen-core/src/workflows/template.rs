use crate::engine::error::EngineError;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

/// Placeholders of the molecular-dynamics driver template, in substitution order, with
/// their default values. `None` marks a value the caller must supply.
pub const DRIVER_PLACEHOLDERS: [(&str, Option<&str>); 7] = [
    ("FILENAME", None),
    ("NSTEPS", Some("20000")),
    ("SEED", Some("12345")),
    ("MODEL_PATH", None),
    ("INPUTFILE", None),
    ("TEMPERATURE", Some("300")),
    ("PRESSURE", Some("1.0")),
];

/// Replaces every occurrence of each key with its value, one key at a time in order.
///
/// Matching is exact substring matching; later replacements also see the text produced
/// by earlier ones.
pub fn fill(template: &str, replacements: &[(String, String)]) -> String {
    replacements
        .iter()
        .fold(template.to_string(), |text, (key, value)| {
            if key.is_empty() {
                text
            } else {
                text.replace(key.as_str(), value)
            }
        })
}

/// Completes user-supplied values with the driver defaults.
///
/// Keys outside [`DRIVER_PLACEHOLDERS`] are appended after the known ones in the order
/// given.
///
/// # Errors
///
/// [`EngineError::Config`] naming every required placeholder without a value.
pub fn driver_replacements(
    values: &[(String, String)],
) -> Result<Vec<(String, String)>, EngineError> {
    let lookup = |key: &str| {
        values
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    let mut missing = Vec::new();
    let mut replacements = Vec::new();
    for (key, default) in DRIVER_PLACEHOLDERS {
        match lookup(key).or_else(|| default.map(str::to_string)) {
            Some(value) => replacements.push((key.to_string(), value)),
            None => missing.push(key),
        }
    }
    if !missing.is_empty() {
        return Err(EngineError::Config(format!(
            "missing template value(s) for {}",
            missing.join(", ")
        )));
    }

    for (key, value) in values {
        let known = DRIVER_PLACEHOLDERS.iter().any(|(k, _)| k == key);
        let seen = replacements.iter().any(|(k, _)| k == key);
        if !known && !seen {
            replacements.push((key.clone(), lookup(key).unwrap_or_else(|| value.clone())));
        }
    }
    Ok(replacements)
}

/// Reads `template`, applies [`fill`], and writes the result to `output`.
#[instrument(skip_all, name = "template_workflow")]
pub fn fill_file(
    template: &Path,
    output: &Path,
    replacements: &[(String, String)],
) -> Result<(), EngineError> {
    let text = fs::read_to_string(template).map_err(|e| EngineError::io(template, e))?;
    let filled = fill(&text, replacements);
    fs::write(output, filled).map_err(|e| EngineError::io(output, e))?;
    info!("Wrote filled template to {}.", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn fill_replaces_all_occurrences_in_order() {
        let template = "<total_steps>NSTEPS</total_steps><seed>SEED</seed><x>NSTEPS</x>";
        let filled = fill(template, &pairs(&[("NSTEPS", "100"), ("SEED", "7")]));
        assert_eq!(filled, "<total_steps>100</total_steps><seed>7</seed><x>100</x>");
    }

    #[test]
    fn fill_applies_later_keys_to_earlier_output() {
        let filled = fill("A", &pairs(&[("A", "B"), ("B", "C")]));
        assert_eq!(filled, "C");
    }

    #[test]
    fn driver_replacements_apply_defaults_and_overrides() {
        let values = pairs(&[
            ("FILENAME", "run1"),
            ("MODEL_PATH", "model.pt"),
            ("INPUTFILE", "1Li_1perchlorate_water.xyz"),
            ("TEMPERATURE", "350"),
        ]);
        let replacements = driver_replacements(&values).unwrap();
        let keys: Vec<&str> = replacements.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "FILENAME",
                "NSTEPS",
                "SEED",
                "MODEL_PATH",
                "INPUTFILE",
                "TEMPERATURE",
                "PRESSURE"
            ]
        );
        assert_eq!(replacements[1].1, "20000");
        assert_eq!(replacements[5].1, "350");
        assert_eq!(replacements[6].1, "1.0");
    }

    #[test]
    fn driver_replacements_require_file_and_model_values() {
        let err = driver_replacements(&pairs(&[("FILENAME", "run")])).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config(ref m) if m.contains("MODEL_PATH") && m.contains("INPUTFILE")
        ));
    }

    #[test]
    fn driver_replacements_keep_extra_keys() {
        let values = pairs(&[
            ("FILENAME", "a"),
            ("MODEL_PATH", "b"),
            ("INPUTFILE", "c"),
            ("TIMESTEP", "0.5"),
        ]);
        let replacements = driver_replacements(&values).unwrap();
        assert_eq!(
            replacements.last(),
            Some(&("TIMESTEP".to_string(), "0.5".to_string()))
        );
    }

    #[test]
    fn fill_file_writes_output() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("input.template.xml");
        let output = dir.path().join("input.xml");
        fs::write(&template, "<file>INPUTFILE</file>\n").unwrap();

        fill_file(&template, &output, &pairs(&[("INPUTFILE", "box.xyz")])).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "<file>box.xyz</file>\n");
    }

    #[test]
    fn fill_file_reports_missing_template() {
        let dir = tempdir().unwrap();
        let err = fill_file(
            &dir.path().join("absent.xml"),
            &dir.path().join("out.xml"),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
