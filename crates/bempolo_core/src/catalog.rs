//! crates/bempolo_core/src/catalog.rs
//!
//! The static product list. Products are immutable and shared by `Arc`.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal_macros::dec;

use crate::domain::Product;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate product id {0}")]
    DuplicateId(u32),
    #[error("Product {0} has a negative price")]
    NegativePrice(u32),
}

#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Arc<Product>>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids and negative prices.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateId(product.id));
            }
            if product.price.is_sign_negative() {
                return Err(CatalogError::NegativePrice(product.id));
            }
        }
        Ok(Self {
            products: products.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parses a JSON array of products.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    pub fn products(&self) -> &[Arc<Product>] {
        &self.products
    }

    pub fn get(&self, id: u32) -> Option<Arc<Product>> {
        self.products.iter().find(|p| p.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for Catalog {
    /// The Bempolo drop.
    fn default() -> Self {
        let entry = |id, name: &str, description: &str, price, image: &str| Product {
            id,
            name: name.to_string(),
            description: description.to_string(),
            price,
            image: format!("/assets/{image}"),
        };

        let products = vec![
            entry(1, "Cyber Bempolo", "Digital gnome hacking the blockchain", dec!(300), "bempolo-cyber.jpg"),
            entry(2, "Wizard Bempolo", "Magical gnome casting meme spells", dec!(250), "bempolo-wizard.jpg"),
            entry(3, "Space Bempolo", "Astronaut gnome in crypto cosmos", dec!(350), "bempolo-space.jpg"),
            entry(4, "Zen Bempolo", "Peaceful gnome achieving digital enlightenment", dec!(200), "bempolo-zen.jpg"),
            entry(5, "Neon Bempolo", "Gnome glowing with vaporwave energy", dec!(275), "bempolo-neon.jpg"),
            entry(6, "Quantum Bempolo", "Gnome existing in multiple dimensions", dec!(400), "bempolo-wizard.jpg"),
            entry(7, "Retro Bempolo", "80s synth gnome with nostalgic vibes", dec!(225), "bempolo-retro.jpg"),
            entry(8, "Crystal Bempolo", "Mystical gnome with healing powers", dec!(300), "bempolo-zen.jpg"),
            entry(9, "Holo Bempolo", "Holographic gnome from the future", dec!(450), "bempolo-space.jpg"),
            entry(10, "Genesis Bempolo", "The original legendary gnome", dec!(500), "bempolo-cyber.jpg"),
        ];

        Self {
            products: products.into_iter().map(Arc::new).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_unique_ids() {
        let catalog = Catalog::default();
        assert_eq!(catalog.len(), 10);
        assert!(Catalog::new(catalog.products().iter().map(|p| (**p).clone()).collect()).is_ok());
    }

    #[test]
    fn lookup_by_id() {
        let catalog = Catalog::default();
        let product = catalog.get(1).unwrap();
        assert_eq!(product.name, "Cyber Bempolo");
        assert_eq!(product.price, dec!(300));
        assert!(catalog.get(42).is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"[
            {"id": 1, "name": "A", "description": "", "price": "1", "image": ""},
            {"id": 1, "name": "B", "description": "", "price": "2", "image": ""}
        ]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateId(1))
        ));
    }

    #[test]
    fn rejects_negative_price() {
        let json = r#"[{"id": 3, "name": "A", "description": "", "price": "-1", "image": ""}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::NegativePrice(3))
        ));
    }
}
