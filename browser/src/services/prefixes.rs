//! IRI <-> CURIE conversion using a database's `prefix` table.

use ontobrowse_models::PrefixMapping;
use sqlx::SqliteConnection;

use crate::errors::BrowserResult;

#[derive(Debug, Clone, Default)]
pub struct PrefixResolver {
    // Sorted by base length, longest first, so the most specific namespace wins
    by_base: Vec<PrefixMapping>,
}

impl PrefixResolver {
    pub async fn load(conn: &mut SqliteConnection) -> BrowserResult<Self> {
        let mappings = sqlx::query_as::<_, PrefixMapping>("SELECT DISTINCT prefix, base FROM prefix")
            .fetch_all(&mut *conn)
            .await?;
        Ok(Self::from_mappings(mappings))
    }

    pub fn from_mappings(mappings: impl IntoIterator<Item = PrefixMapping>) -> Self {
        let mut by_base: Vec<PrefixMapping> = mappings.into_iter().collect();
        by_base.sort_by(|a, b| b.base.len().cmp(&a.base.len()));
        Self { by_base }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::from_mappings(pairs.into_iter().map(|(prefix, base)| PrefixMapping {
            prefix: prefix.to_string(),
            base: base.to_string(),
        }))
    }

    /// Compresses `iri` with the longest matching base, or `None` for an unknown namespace.
    pub fn to_curie(&self, iri: &str) -> Option<String> {
        self.by_base
            .iter()
            .filter(|m| !m.base.is_empty())
            .find_map(|m| {
                iri.strip_prefix(m.base.as_str())
                    .map(|local| format!("{}:{}", m.prefix, local))
            })
    }

    /// Expands `curie`; `None` when the prefix is not in the table.
    pub fn to_iri(&self, curie: &str) -> Option<String> {
        let (prefix, local) = curie.split_once(':')?;
        self.by_base
            .iter()
            .find(|m| m.prefix == prefix)
            .map(|m| format!("{}{}", m.base, local))
    }

    /// Compresses each IRI, dropping those in unknown namespaces.
    pub fn curies_for<'a>(&self, iris: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        iris.into_iter().filter_map(|iri| self.to_curie(iri)).collect()
    }

    /// Mappings ordered by prefix name.
    pub fn prefixes(&self) -> Vec<&PrefixMapping> {
        let mut sorted: Vec<&PrefixMapping> = self.by_base.iter().collect();
        sorted.sort_by(|a, b| a.prefix.cmp(&b.prefix));
        sorted
    }

    pub fn is_empty(&self) -> bool {
        self.by_base.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PrefixResolver {
        PrefixResolver::from_pairs([
            ("obo", "http://purl.obolibrary.org/obo/"),
            ("ONTIE", "https://ontology.iedb.org/ontology/ONTIE_"),
            ("DOID", "http://purl.obolibrary.org/obo/DOID_"),
            ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
        ])
    }

    #[test]
    fn test_longest_base_wins() {
        let r = resolver();
        assert_eq!(
            r.to_curie("http://purl.obolibrary.org/obo/DOID_4").as_deref(),
            Some("DOID:4")
        );
        assert_eq!(
            r.to_curie("http://purl.obolibrary.org/obo/IAO_0100001").as_deref(),
            Some("obo:IAO_0100001")
        );
    }

    #[test]
    fn test_unknown_namespace() {
        assert_eq!(resolver().to_curie("http://example.com/thing"), None);
        assert_eq!(resolver().to_iri("ex:thing"), None);
        assert_eq!(resolver().to_iri("no-colon"), None);
    }

    #[test]
    fn test_round_trip() {
        let r = resolver();
        for iri in [
            "https://ontology.iedb.org/ontology/ONTIE_0001",
            "http://purl.obolibrary.org/obo/DOID_0050117",
            "http://www.w3.org/2000/01/rdf-schema#label",
        ] {
            let curie = r.to_curie(iri).unwrap();
            assert_eq!(r.to_iri(&curie).as_deref(), Some(iri));
        }
    }

    #[test]
    fn test_curies_for_drops_unknown() {
        let r = resolver();
        let curies = r.curies_for([
            "https://ontology.iedb.org/ontology/ONTIE_0002",
            "http://example.com/x",
        ]);
        assert_eq!(curies, vec!["ONTIE:0002".to_string()]);
    }

    #[test]
    fn test_prefixes_sorted_by_name() {
        let resolver = resolver();
        let names: Vec<&str> = resolver.prefixes().iter().map(|m| m.prefix.as_str()).collect();
        assert_eq!(names, vec!["DOID", "ONTIE", "obo", "rdfs"]);
    }
}
