//! Catalogue documents.
//!
//! Documents are stored denormalized: a product carries the identifier of its
//! category, and relation expansion is left to the document model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ports::Document;

/// A product listed in the storefront.
///
/// # Examples
/// ```
/// use storefront::domain::Product;
/// use storefront::domain::ports::Document;
///
/// let product = Product::builder("p-1", "Trail Shoe", "c-1").price_cents(8_999).build();
/// assert_eq!(product.id(), "p-1");
/// assert_eq!(product.slug, "trail-shoe");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Document identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// URL slug, unique across products.
    pub slug: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Unit price in minor currency units.
    pub price_cents: u64,
    /// Identifier of the owning category.
    pub category: String,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
    /// Whether the product is promoted on the landing page.
    #[serde(default)]
    pub featured: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Start building a product with the mandatory fields.
    #[must_use]
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> ProductBuilder {
        let display_name: String = name.into();
        ProductBuilder {
            product: Self {
                id: id.into(),
                slug: slugify(&display_name),
                name: display_name,
                description: String::new(),
                price_cents: 0,
                category: category.into(),
                stock: 0,
                featured: false,
                created_at: DateTime::<Utc>::UNIX_EPOCH,
            },
        }
    }
}

impl Document for Product {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Builder for [`Product`].
#[derive(Debug, Clone)]
pub struct ProductBuilder {
    product: Product,
}

impl ProductBuilder {


    /// Set the unit price.
    #[must_use]
    pub fn price_cents(mut self, price_cents: u64) -> Self {
        self.product.price_cents = price_cents;
        self
    }


    /// Mark the product as featured.
    #[must_use]
    pub fn featured(mut self, featured: bool) -> Self {
        self.product.featured = featured;
        self
    }

    /// Set the creation timestamp.
    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.product.created_at = created_at;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Product {
        self.product
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Document identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// URL slug, unique across categories.
    pub slug: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Category {
    /// Construct a category, deriving its slug from the name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let display_name: String = name.into();
        Self {
            id: id.into(),
            slug: slugify(&display_name),
            name: display_name,
            description: None,
        }
    }
}

impl Document for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
