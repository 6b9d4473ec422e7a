//! Catalog categories and the category tree.

use std::collections::{HashMap, HashSet};

use bigcommerce_core::CategoryId;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::{CustomUrl, nullable};
use crate::client::Client;
use crate::error::BigCommerceError;
use crate::pagination::{IncompleteFetch, PageResult};

/// Separator between ancestor names in a category's full name.
pub const FULL_NAME_SEPARATOR: &str = " > ";

/// A catalog category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// `0` for top-level categories.
    pub parent_id: CategoryId,
    pub is_visible: bool,
    pub custom_url: CustomUrl,
    pub description: String,
    pub sort_order: i64,
    pub page_title: String,
    pub meta_description: String,
    #[serde(deserialize_with = "nullable")]
    pub image_url: String,
}

/// A category placed in its tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub category: Category,
    /// Ancestor names joined with [`FULL_NAME_SEPARATOR`], e.g. `Shoes > Running > Trail`.
    pub full_name: String,
    /// `0` for roots.
    pub depth: usize,
    /// Direct children, in server order.
    pub children: Vec<CategoryId>,
}

/// Categories indexed by id with their full names resolved.
///
/// A category whose parent is not in the collection is treated as a root.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: Vec<CategoryNode>,
    index: HashMap<CategoryId, usize>,
}

impl CategoryTree {
    /// Build the tree from a flat category list.
    ///
    /// # Errors
    ///
    /// Returns `BigCommerceError::MalformedData` if an id appears twice or
    /// the parent links form a cycle.
    pub fn build(categories: Vec<Category>) -> Result<Self, BigCommerceError> {
        let mut index = HashMap::with_capacity(categories.len());
        for (i, category) in categories.iter().enumerate() {
            if index.insert(category.id, i).is_some() {
                return Err(BigCommerceError::MalformedData(format!(
                    "duplicate category id {}",
                    category.id
                )));
            }
        }

        let names = resolve_full_names(&categories, &index)?;

        let mut nodes: Vec<CategoryNode> = categories
            .into_iter()
            .zip(names)
            .map(|(category, (full_name, depth))| CategoryNode {
                category,
                full_name,
                depth,
                children: Vec::new(),
            })
            .collect();

        let links: Vec<(usize, CategoryId)> = nodes
            .iter()
            .filter_map(|node| {
                index
                    .get(&node.category.parent_id)
                    .map(|&parent| (parent, node.category.id))
            })
            .collect();
        for (parent, child) in links {
            if let Some(node) = nodes.get_mut(parent) {
                node.children.push(child);
            }
        }

        Ok(Self { nodes, index })
    }

    /// Look up a category.
    #[must_use]
    pub fn get(&self, id: CategoryId) -> Option<&CategoryNode> {
        self.index.get(&id).and_then(|&i| self.nodes.get(i))
    }

    /// The full name of a category.
    #[must_use]
    pub fn full_name(&self, id: CategoryId) -> Option<&str> {
        self.get(id).map(|node| node.full_name.as_str())
    }

    /// All categories in server order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryNode> {
        self.nodes.iter()
    }

    /// Top-level categories.
    pub fn roots(&self) -> impl Iterator<Item = &CategoryNode> {
        self.nodes.iter().filter(|node| node.depth == 0)
    }

    /// Direct children of a category.
    pub fn children(&self, id: CategoryId) -> impl Iterator<Item = &CategoryNode> {
        self.get(id)
            .into_iter()
            .flat_map(|node| node.children.iter())
            .filter_map(|&child| self.get(child))
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Compute `(full_name, depth)` for every category, memoising ancestors.
fn resolve_full_names(
    categories: &[Category],
    index: &HashMap<CategoryId, usize>,
) -> Result<Vec<(String, usize)>, BigCommerceError> {
    let mut resolved: Vec<Option<(String, usize)>> = vec![None; categories.len()];

    for start in 0..categories.len() {
        let mut path = Vec::new();
        let mut on_path = HashSet::new();
        let mut base: Option<(String, usize)> = None;
        let mut cursor = Some(start);

        // Walk up until a resolved ancestor or a root.
        while let Some(i) = cursor {
            if let Some(known) = resolved.get(i).cloned().flatten() {
                base = Some(known);
                break;
            }
            let Some(category) = categories.get(i) else {
                break;
            };
            if !on_path.insert(i) {
                return Err(BigCommerceError::MalformedData(format!(
                    "category {} is its own ancestor",
                    category.id
                )));
            }
            path.push(i);

            cursor = if category.parent_id.is_unset() {
                None
            } else if let Some(&parent) = index.get(&category.parent_id) {
                Some(parent)
            } else {
                warn!(
                    category_id = %category.id,
                    parent_id = %category.parent_id,
                    "Category parent not found, treating as root"
                );
                None
            };
        }

        for &i in path.iter().rev() {
            let Some(category) = categories.get(i) else {
                continue;
            };
            let entry = match &base {
                Some((prefix, depth)) => (
                    format!("{prefix}{FULL_NAME_SEPARATOR}{}", category.name),
                    depth + 1,
                ),
                None => (category.name.clone(), 0),
            };
            if let Some(slot) = resolved.get_mut(i) {
                *slot = Some(entry.clone());
            }
            base = Some(entry);
        }
    }

    Ok(resolved.into_iter().map(Option::unwrap_or_default).collect())
}

const CATEGORIES: &str = "v3/catalog/categories";

impl Client {
    /// Get one page of categories, using the client's category field filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_categories(&self, page: u32) -> Result<PageResult<Category>, BigCommerceError> {
        let filters = &self.config().catalog.categories;
        let query: Vec<_> = filters.query_pairs().collect();
        self.get_page(CATEGORIES, &query, page).await
    }

    /// Get every category, page by page.
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteFetch`] with the categories fetched so far.
    #[instrument(skip(self))]
    pub async fn get_all_categories(
        &self,
    ) -> Result<Vec<Category>, IncompleteFetch<Category, BigCommerceError>> {
        self.paginator()
            .fetch_all(|page| self.get_categories(page))
            .await
    }

    /// Get every category and resolve full names.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if any page is missing (a partial tree would
    /// produce wrong names), or `MalformedData` for cyclic parents.
    #[instrument(skip(self))]
    pub async fn get_category_tree(&self) -> Result<CategoryTree, BigCommerceError> {
        let categories = self
            .get_all_categories()
            .await
            .map_err(|e| e.kind.into_error().unwrap_or(BigCommerceError::Cancelled))?;
        CategoryTree::build(categories)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn category(id: i64, parent: i64, name: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            parent_id: CategoryId::new(parent),
            name: name.to_string(),
            ..Category::default()
        }
    }

    #[test]
    fn test_full_names() {
        // Children listed before parents.
        let tree = CategoryTree::build(vec![
            category(3, 2, "Trail"),
            category(2, 1, "Running"),
            category(1, 0, "Shoes"),
            category(4, 1, "Boots"),
        ])
        .unwrap();

        assert_eq!(tree.full_name(CategoryId::new(3)), Some("Shoes > Running > Trail"));
        assert_eq!(tree.full_name(CategoryId::new(4)), Some("Shoes > Boots"));
        assert_eq!(tree.get(CategoryId::new(3)).unwrap().depth, 2);
        assert_eq!(tree.roots().count(), 1);

        let children: Vec<_> = tree
            .children(CategoryId::new(1))
            .map(|n| n.category.name.as_str())
            .collect();
        assert_eq!(children, vec!["Running", "Boots"]);
    }

    #[test]
    fn test_iter_keeps_server_order() {
        let tree = CategoryTree::build(vec![category(9, 0, "B"), category(5, 0, "A")]).unwrap();
        let ids: Vec<_> = tree.iter().map(|n| n.category.id.as_i64()).collect();
        assert_eq!(ids, vec![9, 5]);
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let tree = CategoryTree::build(vec![category(2, 99, "Orphan")]).unwrap();
        assert_eq!(tree.full_name(CategoryId::new(2)), Some("Orphan"));
        assert_eq!(tree.roots().count(), 1);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let result = CategoryTree::build(vec![category(1, 2, "A"), category(2, 1, "B")]);
        assert!(matches!(result, Err(BigCommerceError::MalformedData(_))));

        let result = CategoryTree::build(vec![category(7, 7, "Self")]);
        assert!(matches!(result, Err(BigCommerceError::MalformedData(_))));
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let result = CategoryTree::build(vec![category(1, 0, "A"), category(1, 0, "B")]);
        assert!(matches!(result, Err(BigCommerceError::MalformedData(_))));
    }

    #[test]
    fn test_deep_chain() {
        let categories: Vec<_> = (1..=2000)
            .rev()
            .map(|i| category(i, i - 1, "c"))
            .collect();
        let tree = CategoryTree::build(categories).unwrap();
        assert_eq!(tree.get(CategoryId::new(2000)).unwrap().depth, 1999);
    }

    #[test]
    fn test_category_with_null_image_decodes() {
        let category: Category = serde_json::from_str(
            r#"{"id": 18, "parent_id": 0, "name": "Bath", "is_visible": true,
                "custom_url": {"url": "/bath/", "is_customized": false}, "image_url": null}"#,
        )
        .unwrap();
        assert_eq!(category.custom_url.url, "/bath/");
        assert!(category.image_url.is_empty());
    }
}
