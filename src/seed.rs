//! Demo seed data: the starting catalog, categories, and one historical
//! order so the tracking screen has something to find out of the box.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::aggregates::cart::CartItem;
use crate::domain::aggregates::catalog::{Catalog, Category, Product};
use crate::domain::aggregates::order::{CustomerDetails, Order, OrderLedger, OrderStatus};
use crate::domain::value_objects::TrackingId;

fn product(
    id: &str,
    name: &str,
    price: Decimal,
    category: &str,
    image: &str,
    colors: &[&str],
) -> Product {
    Product {
        id: id.into(),
        name: name.into(),
        price,
        category: category.into(),
        image: image.into(),
        images: vec![],
        description: String::new(),
        colors: colors.iter().map(|c| c.to_string()).collect(),
        out_of_stock: false,
        discount: Default::default(),
        reviews: vec![],
    }
}

pub fn catalog() -> Catalog {
    let products = vec![
        product(
            "p1",
            "iPhone 15 Pro Max",
            dec!(2250000),
            "Phones",
            "https://images.unsplash.com/photo-1696446701796-da61225697cc?auto=format&fit=crop&q=80&w=800",
            &["Natural Titanium", "Blue Titanium", "Black Titanium"],
        ),
        product(
            "p2",
            "Samsung Galaxy S24 Ultra",
            dec!(1850000),
            "Phones",
            "https://images.unsplash.com/photo-1610945265064-0e34e5519bbf?auto=format&fit=crop&q=80&w=800",
            &["Titanium Gray", "Titanium Violet"],
        ),
        product(
            "p3",
            "Dior Sauvage EDP 100ml",
            dec!(185000),
            "Perfume",
            "https://images.unsplash.com/photo-1523293182086-7651a899d37f?auto=format&fit=crop&q=80&w=800",
            &[],
        ),
        product(
            "p4",
            "Arsenal Home Jersey 24/25",
            dec!(45000),
            "Jerseys",
            "https://images.unsplash.com/photo-1522778119026-d647f0596c20?auto=format&fit=crop&q=80&w=800",
            &["Red", "White"],
        ),
        product(
            "p5",
            "Nike Mercurial Vapor 15",
            dec!(120000),
            "Soccer Boots",
            "https://images.unsplash.com/photo-1511886929837-354d827aae26?auto=format&fit=crop&q=80&w=800",
            &["Volt", "Black"],
        ),
        product(
            "p6",
            "Grip Performance Socks",
            dec!(8500),
            "Socks",
            "https://images.unsplash.com/photo-1586350977771-b3b0abd50c82?auto=format&fit=crop&q=80&w=800",
            &["White", "Black"],
        ),
    ];

    let categories = [
        ("All", "All Products"),
        ("Phones", "Smartphones"),
        ("Perfume", "Fragrances"),
        ("Jerseys", "Soccer Jerseys"),
        ("Soccer Boots", "Soccer Boots"),
        ("Socks", "Performance Socks"),
        ("Phone Pouches", "Phone Pouches"),
    ]
    .into_iter()
    .map(|(id, label)| Category { id: id.into(), label: label.into() })
    .collect();

    Catalog::new(products, categories)
}

pub fn ledger() -> OrderLedger {
    let iphone = product(
        "p1",
        "iPhone 15 Pro Max",
        dec!(2250000),
        "Phones",
        "https://images.unsplash.com/photo-1696446701796-da61225697cc?auto=format&fit=crop&q=80&w=800",
        &[],
    );

    OrderLedger::new(vec![Order {
        id: TrackingId::from_raw("TRK-9J2M4"),
        customer: CustomerDetails {
            name: "Guest User".into(),
            email: "guest@example.com".into(),
            phone: "08012345678".into(),
            address: "123 Lagos Way, Ikeja".into(),
        },
        items: vec![CartItem {
            product: iphone,
            selected_color: Some("Natural Titanium".into()),
            quantity: 1,
        }],
        // 2,250,000 + 10% tax
        total_amount: dec!(2475000),
        status: OrderStatus::Pending,
        timestamp: Utc::now() - Duration::hours(1),
        payment_method: "Transfer".into(),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_order_is_trackable() {
        let ledger = ledger();
        let order = ledger.find_by_id(" trk-9j2m4 ").expect("seed order");
        assert_eq!(order.total_amount, dec!(2475000));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_seeded_categories() {
        let catalog = catalog();
        assert_eq!(catalog.categories().len(), 7);
        assert!(catalog.categories().iter().any(|c| c.id == "All"));
        assert!(!catalog.products().is_empty());
    }
}
