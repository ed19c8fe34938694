//! Startup schema loading from disk (§6.2).
//!
//! Out of scope for the Evaluation Engine itself, but the HTTP boundary has
//! to get schemas into memory somehow: every `*.yaml`/`*.yml` file directly
//! under `SCHEMES_DIR` is parsed into a [`ceval_core::Schema`]. A load
//! failure here is fatal — the process refuses to start (§7).

use std::path::Path;

use ceval_core::Schema;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaLoadError {
    #[error("failed to read schema directory '{dir}': {source}")]
    ReadDir { dir: String, source: std::io::Error },

    #[error("failed to read schema file '{path}': {source}")]
    ReadFile { path: String, source: std::io::Error },

    #[error("failed to parse schema file '{path}': {source}")]
    Parse { path: String, source: serde_yaml::Error },
}

/// Loads every top-level `*.yaml`/`*.yml` file in `dir` as a [`Schema`].
/// Duplicate-id detection happens downstream in `SchemaRegistry::build`.
pub fn load_schemas_from_dir(dir: &Path) -> Result<Vec<Schema>, SchemaLoadError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|source| SchemaLoadError::ReadDir { dir: dir.display().to_string(), source })?;

    let mut schemas = Vec::new();
    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension().and_then(|ext| ext.to_str()).map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")).unwrap_or(false)
        })
        .collect();
    paths.sort();

    for path in paths {
        let contents = std::fs::read_to_string(&path)
            .map_err(|source| SchemaLoadError::ReadFile { path: path.display().to_string(), source })?;
        let schema: Schema = serde_yaml::from_str(&contents)
            .map_err(|source| SchemaLoadError::Parse { path: path.display().to_string(), source })?;
        schemas.push(schema);
    }

    Ok(schemas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_yaml_files_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = "id: leaf\nname: leaf\ndimension: leaf_dim\noutput_range:\n  min: 1.0\n  max: 5.0\n  value_type: float\nkind: ordinal\nanchors: []\nstrategy: first_match\n";
        let mut f = std::fs::File::create(dir.path().join("a.yaml")).unwrap();
        f.write_all(yaml.as_bytes()).unwrap();

        let schemas = load_schemas_from_dir(dir.path()).unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].id.as_str(), "leaf");
    }

    #[test]
    fn ignores_non_yaml_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), "not yaml").unwrap();
        let schemas = load_schemas_from_dir(dir.path()).unwrap();
        assert!(schemas.is_empty());
    }
}
