//! Catalog Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Discount;
use crate::{MarketplaceError, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub user_name: String,
    /// 1-5
    pub rating: u8,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    /// Main display image
    pub image: String,
    /// Gallery images (up to 5)
    #[serde(default)]
    pub images: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub out_of_stock: bool,
    #[serde(default)]
    pub discount: Discount,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    /// Listed price after discount, before tax.
    pub fn effective_price(&self) -> Decimal {
        self.discount.apply(self.price)
    }
}

/// Referenced by `Product.category` by id equality; nothing enforces the
/// reference, a removed or renamed category leaves products dangling.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub colors: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewReview {
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
}

/// Products plus categories, newest entries first.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self { products, categories }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn find(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    pub fn add_product(&mut self, new: NewProduct) -> &Product {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            price: new.price,
            category: new.category,
            image: new.image,
            images: new.images,
            description: new.description,
            colors: new.colors,
            out_of_stock: false,
            discount: Discount::default(),
            reviews: vec![],
        };
        self.products.insert(0, product);
        &self.products[0]
    }

    pub fn remove_product(&mut self, product_id: &str) -> Result<()> {
        let before = self.products.len();
        self.products.retain(|p| p.id != product_id);
        if self.products.len() == before {
            return Err(MarketplaceError::ProductNotFound);
        }
        Ok(())
    }

    /// Flips the out-of-stock flag, returns the new value.
    pub fn toggle_stock(&mut self, product_id: &str) -> Result<bool> {
        let product = self.find_mut(product_id)?;
        product.out_of_stock = !product.out_of_stock;
        Ok(product.out_of_stock)
    }

    /// Out-of-range percentages are clamped to 0..=100.
    pub fn set_discount(&mut self, product_id: &str, percent: i64) -> Result<Discount> {
        let product = self.find_mut(product_id)?;
        product.discount = Discount::clamped(percent);
        Ok(product.discount)
    }

    pub fn set_image(&mut self, product_id: &str, image_url: impl Into<String>) -> Result<()> {
        self.find_mut(product_id)?.image = image_url.into();
        Ok(())
    }

    /// Reviews are append-only; newest first.
    pub fn add_review(&mut self, product_id: &str, new: NewReview) -> Result<&Review> {
        let product = self.find_mut(product_id)?;
        let review = Review {
            id: Uuid::new_v4().to_string(),
            user_name: new.user_name,
            rating: new.rating.clamp(1, 5),
            comment: new.comment,
            timestamp: Utc::now(),
        };
        product.reviews.insert(0, review);
        Ok(&product.reviews[0])
    }

    /// No-op when a category with the same id already exists.
    pub fn add_category(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.categories.iter().any(|c| c.id == name) {
            return;
        }
        self.categories.push(Category { id: name.clone(), label: name });
    }

    fn find_mut(&mut self, product_id: &str) -> Result<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or(MarketplaceError::ProductNotFound)
    }
}
