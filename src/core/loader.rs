use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use walkdir::WalkDir;

use crate::core::artifacts::Artifact;
use crate::core::collection::ArtifactCollection;

const EXCLUDED_DIRS: [&str; 7] = [
    "node_modules",
    "target",
    ".git",
    "dist",
    "scripts",
    "tests",
    "__tests__",
];

/// Strategy for reading one artifact file format into raw values.
/// A file may hold a single artifact object, an array of artifacts, or a map
/// of exported values; the loader partitions by the `type` tag afterwards.
#[async_trait]
pub trait ArtifactFileReader: Send + Sync {
    fn can_handle(&self, path: &Path) -> bool;
    async fn read_values(&self, path: &Path) -> Result<Vec<serde_json::Value>>;
}

pub struct JsonArtifactReader;

#[async_trait]
impl ArtifactFileReader for JsonArtifactReader {
    fn can_handle(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "json")
    }

    async fn read_values(&self, path: &Path) -> Result<Vec<serde_json::Value>> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read artifact file {:?}", path))?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {:?}", path))?;
        Ok(flatten_exported_values(value))
    }
}

pub struct YamlArtifactReader;

#[async_trait]
impl ArtifactFileReader for YamlArtifactReader {
    fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
    }

    async fn read_values(&self, path: &Path) -> Result<Vec<serde_json::Value>> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read artifact file {:?}", path))?;
        let value: serde_json::Value = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in {:?}", path))?;
        Ok(flatten_exported_values(value))
    }
}

/// Expand a parsed document into candidate artifact values. Arrays contribute
/// each element; a tagged object contributes itself; an untagged object is
/// treated as a map of exported values and contributes each member.
fn flatten_exported_values(value: serde_json::Value) -> Vec<serde_json::Value> {
    match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => {
            if map.contains_key("type") {
                vec![serde_json::Value::Object(map)]
            } else {
                map.into_iter().map(|(_, v)| v).collect()
            }
        }
        _ => Vec::new(),
    }
}

/// Outcome of a load: the collection plus per-file warnings for anything
/// skipped. A failing file never fails the run.
#[derive(Debug)]
pub struct LoadResult {
    pub collection: ArtifactCollection,
    pub warnings: Vec<String>,
    pub files_loaded: usize,
}

/// Walks a project directory and assembles the artifact collection.
/// The loader is the only component that performs I/O; everything downstream
/// reads the immutable collection.
pub struct CollectionLoader {
    readers: Vec<Box<dyn ArtifactFileReader>>,
}

impl CollectionLoader {
    pub fn new() -> Self {
        Self {
            readers: vec![Box::new(JsonArtifactReader), Box::new(YamlArtifactReader)],
        }
    }

    pub async fn load(&self, project_dir: &Path) -> Result<LoadResult> {
        if !project_dir.exists() {
            anyhow::bail!("Project directory does not exist: {:?}", project_dir);
        }

        let mut files = self.discover_files(project_dir);
        files.sort();

        let mut artifacts = Vec::new();
        let mut warnings = Vec::new();
        let mut stems = Vec::new();
        let mut files_loaded = 0;

        for path in files {
            let Some(reader) = self.readers.iter().find(|r| r.can_handle(&path)) else {
                continue;
            };
            match reader.read_values(&path).await {
                Ok(values) => {
                    let mut found_any = false;
                    for value in values {
                        if !value.get("type").is_some_and(|t| t.is_string()) {
                            continue;
                        }
                        match serde_json::from_value::<Artifact>(value) {
                            Ok(artifact) => {
                                artifacts.push(artifact);
                                found_any = true;
                            }
                            Err(e) => {
                                warnings.push(format!("skipped artifact in {:?}: {}", path, e));
                            }
                        }
                    }
                    if found_any {
                        files_loaded += 1;
                        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                            stems.push(stem.to_string());
                        }
                    }
                }
                Err(e) => {
                    warnings.push(format!("skipped file {:?}: {:#}", path, e));
                }
            }
        }

        let mut collection = ArtifactCollection::from_artifacts(artifacts);
        for stem in stems {
            collection.record_source_file(stem);
        }

        Ok(LoadResult {
            collection,
            warnings,
            files_loaded,
        })
    }

    fn discover_files(&self, project_dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(project_dir)
            .into_iter()
            .filter_entry(|e| {
                e.file_name()
                    .to_str()
                    .map(|name| !EXCLUDED_DIRS.contains(&name))
                    .unwrap_or(true)
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| !is_excluded_file(p))
            .collect()
    }
}

impl Default for CollectionLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_excluded_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return true;
    };
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
    stem == "index" || stem.ends_with(".test") || stem.ends_with(".spec")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn test_loads_json_and_yaml_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "actors.json",
            r#"[{"type":"actor","id":"actor-001","name":"Customer"}]"#,
        );
        write(
            dir.path(),
            "login.yaml",
            "type: usecase\nid: uc-login\nname: Login\nmainFlow: []\n",
        );

        let result = CollectionLoader::new().load(dir.path()).await.unwrap();
        assert!(result.warnings.is_empty());
        assert_eq!(result.files_loaded, 2);
        assert!(result.collection.actor("actor-001").is_some());
        assert!(result.collection.use_case("uc-login").is_some());
    }

    #[tokio::test]
    async fn test_exported_value_maps_are_partitioned() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "exports.json",
            r#"{
                "customer": {"type":"actor","id":"actor-c","name":"Customer"},
                "loginScreen": {"type":"screen","id":"screen-login","name":"Login"}
            }"#,
        );

        let result = CollectionLoader::new().load(dir.path()).await.unwrap();
        assert!(result.collection.actor("actor-c").is_some());
        assert!(result.collection.screen("screen-login").is_some());
    }

    #[tokio::test]
    async fn test_bad_file_is_skipped_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.json", "{ not json");
        write(
            dir.path(),
            "good.json",
            r#"{"type":"actor","id":"actor-001","name":"Customer"}"#,
        );

        let result = CollectionLoader::new().load(dir.path()).await.unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.collection.actor("actor-001").is_some());
    }

    #[tokio::test]
    async fn test_excluded_dirs_and_index_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        write(
            &dir.path().join("node_modules"),
            "dep.json",
            r#"{"type":"actor","id":"actor-dep","name":"Dep"}"#,
        );
        write(
            dir.path(),
            "index.json",
            r#"{"type":"actor","id":"actor-index","name":"Index"}"#,
        );
        write(
            dir.path(),
            "flow.spec.json",
            r#"{"type":"actor","id":"actor-spec","name":"Spec"}"#,
        );

        let result = CollectionLoader::new().load(dir.path()).await.unwrap();
        assert!(result.collection.is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_fails() {
        let result = CollectionLoader::new()
            .load(Path::new("/nonexistent/quality-assessment"))
            .await;
        assert!(result.is_err());
    }
}
