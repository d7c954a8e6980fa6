use indexmap::IndexMap;
use ontobrowse_models::Resource;
use std::path::Path;

use crate::ConfigError;

/// Immutable mapping from resource code to resource, in declaration order.
#[derive(Clone, Debug)]
pub struct ResourceRegistry {
    resources: IndexMap<String, Resource>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ResourceRegistry {
    pub fn builtin() -> Self {
        Self::from_resources(vec![
            Resource::new("all", "All resources"),
            Resource::new("ONTIE", "Ontology for Immune Epitopes"),
            Resource::new("DOID", "Human Disease Ontology"),
            Resource::new("OBI", "Ontology for Biomedical Investigations"),
        ])
    }

    /// Later entries with a duplicate code replace earlier ones in place.
    pub fn from_resources(resources: impl IntoIterator<Item = Resource>) -> Self {
        let resources = resources
            .into_iter()
            .map(|resource| (resource.code.clone(), resource))
            .collect();
        Self { resources }
    }

    // Load from a JSON array of {"code", "name"} objects
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ResourcesFile {
            path: path.display().to_string(),
            source,
        })?;
        let resources: Vec<Resource> = serde_json::from_str(&content)?;
        if resources.is_empty() {
            return Err(ConfigError::EmptyRegistry(path.display().to_string()));
        }
        Ok(Self::from_resources(resources))
    }

    pub fn lookup(&self, code: &str) -> Option<&Resource> {
        self.resources.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_registry_order() {
        let registry = ResourceRegistry::builtin();
        let codes: Vec<&str> = registry.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["all", "ONTIE", "DOID", "OBI"]);
        assert_eq!(registry.lookup("DOID").unwrap().name, "Human Disease Ontology");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = ResourceRegistry::builtin();
        assert!(registry.lookup("ONTIE").is_some());
        assert!(registry.lookup("ontie").is_none());
        assert!(registry.lookup("GO").is_none());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"code": "GO", "name": "Gene Ontology"}}]"#).unwrap();

        let registry = ResourceRegistry::from_path(file.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("GO").unwrap().name, "Gene Ontology");
    }

    #[test]
    fn test_from_path_rejects_empty_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();

        let err = ResourceRegistry::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyRegistry(_)));
    }
}
