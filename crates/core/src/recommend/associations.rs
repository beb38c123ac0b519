//! Merchandising associations ("bread goes with butter")

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::gateway::CatalogGateway;
use crate::domain::product::{Product, ProductName};
use crate::domain::recommendation::ScoredCandidate;
use crate::errors::DataAccessError;

/// Hand-curated grocery affinities shipped with the binary.
const GROCERY_ASSOCIATIONS: &[(&str, &[&str])] = &[
    ("Pomme Golden", &["Pomme Granny smith", "Banane", "Tomate", "Citron"]),
    ("Yaourt nature", &["Pack de yaourts aux fruits", "Pomme Golden", "Banane"]),
    ("Bouteille d'eau 50cl", &["Chips nature", "Canette de Coca-Cola", "Canette de Pepsi"]),
    ("Chips nature", &["Canette de Coca-Cola", "Bouteille d'eau 50cl", "Ketchup"]),
    ("Tablette de chocolat", &["Barre chocolatee", "Bonbons", "Boite de the"]),
    ("Beurre doux", &["Pain", "Emmental rape", "Moutarde de Dijon"]),
    ("Pates Spaghetti", &["Riz basmati", "Pates Penne", "Poivre noir moulu"]),
    ("Canette de Coca-Cola", &["Chips nature", "Barre chocolatee", "Bonbons"]),
];

#[derive(Debug, Error)]
pub enum AssociationTableError {
    #[error("could not read association file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse association table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("association table contains an empty product name (key `{key}`)")]
    EmptyName { key: String },
}

/// Read-only mapping from a product to the products merchandised alongside it.
///
/// Built once at startup and shared by reference; there is no way to mutate a table
/// after construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssociationTable {
    entries: HashMap<ProductName, Vec<ProductName>>,
}

#[derive(Debug, Deserialize)]
struct AssociationFile {
    #[serde(default)]
    associations: BTreeMap<String, Vec<String>>,
}

impl AssociationTable {
    pub fn from_entries<K, V, I>(entries: impl IntoIterator<Item = (K, I)>) -> Self
    where
        K: Into<ProductName>,
        V: Into<ProductName>,
        I: IntoIterator<Item = V>,
    {
        let mut table: HashMap<ProductName, Vec<ProductName>> = HashMap::new();
        for (key, related) in entries {
            let names = related.into_iter().map(Into::<ProductName>::into);
            table.entry(key.into()).or_default().extend(names);
        }
        Self { entries: table }
    }

    pub fn grocery_defaults() -> Self {
        Self::from_entries(
            GROCERY_ASSOCIATIONS.iter().map(|(key, related)| (*key, related.iter().copied())),
        )
    }

    /// Parses an `[associations]` table of `"name" = ["related", ...]` entries.
    pub fn from_toml_str(raw: &str) -> Result<Self, AssociationTableError> {
        let file = toml::from_str::<AssociationFile>(raw)?;

        for (key, related) in &file.associations {
            if key.trim().is_empty() || related.iter().any(|name| name.trim().is_empty()) {
                return Err(AssociationTableError::EmptyName { key: key.clone() });
            }
        }

        Ok(Self::from_entries(file.associations))
    }

    pub fn load(path: &Path) -> Result<Self, AssociationTableError> {
        let raw = fs::read_to_string(path).map_err(|source| AssociationTableError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Related names for `name`, in curated order. Empty when `name` is not a key.
    pub fn related(&self, name: &ProductName) -> &[ProductName] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &ProductName) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Expands purchased products through an [`AssociationTable`] into catalog products.
#[derive(Debug, Clone, Copy)]
pub struct AssociationResolver<'a> {
    table: &'a AssociationTable,
}

impl<'a> AssociationResolver<'a> {
    pub fn new(table: &'a AssociationTable) -> Self {
        Self { table }
    }

    /// Zero-scored candidates for every associated product that still exists in the
    /// catalog, deduplicated by name with the first occurrence kept.
    pub async fn resolve<G>(
        &self,
        gateway: &G,
        purchased: &[Product],
    ) -> Result<Vec<ScoredCandidate>, DataAccessError>
    where
        G: CatalogGateway + ?Sized,
    {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for product in purchased {
            for related in self.table.related(&product.name) {
                if seen.contains(related) {
                    continue;
                }

                match gateway.fetch_product_by_name(related).await? {
                    Some(found) => {
                        seen.insert(related.clone());
                        candidates.push(ScoredCandidate::from_association(found));
                    }
                    None => {
                        tracing::debug!(
                            event_name = "recommendation.association.missing_target",
                            source_product = %product.name,
                            target_product = %related,
                            "associated product not found in catalog"
                        );
                    }
                }
            }
        }

        Ok(candidates)
    }
}
