use rust_decimal::Decimal;

use crate::domain::product::{Product, ProductId};

/// Static reference catalog. Missing products are a valid lookup outcome,
/// not an error.
#[derive(Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The fixed ten-product demo inventory.
    pub fn demo() -> Self {
        Self::new(demo_products())
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == product_id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn demo_product(
    id: &str,
    name: &str,
    description: &str,
    price_cents: i64,
    base_stock: i64,
    category: &str,
) -> Product {
    Product {
        id: ProductId(id.to_string()),
        name: name.to_string(),
        description: description.to_string(),
        price: Decimal::new(price_cents, 2),
        base_stock,
        category: category.to_string(),
    }
}

pub fn demo_products() -> Vec<Product> {
    vec![
        demo_product(
            "ELEC001",
            "Wireless Bluetooth Headphones",
            "Premium noise-cancelling over-ear headphones with 30-hour battery life",
            14999,
            25,
            "Electronics",
        ),
        demo_product(
            "ELEC002",
            "4K Smart TV 55\"",
            "Ultra HD smart television with HDR and built-in streaming apps",
            59999,
            15,
            "Electronics",
        ),
        demo_product(
            "ELEC003",
            "Laptop Stand (Aluminum)",
            "Ergonomic adjustable laptop stand for improved posture",
            4999,
            50,
            "Electronics",
        ),
        demo_product(
            "HOME001",
            "Coffee Maker (12-cup)",
            "Programmable drip coffee maker with thermal carafe",
            7999,
            30,
            "Home & Garden",
        ),
        demo_product(
            "HOME002",
            "Memory Foam Pillow",
            "Contoured memory foam pillow for neck and spine support",
            3499,
            100,
            "Home & Garden",
        ),
        demo_product(
            "HOME003",
            "LED Desk Lamp",
            "Adjustable LED lamp with multiple brightness levels and USB charging port",
            3999,
            40,
            "Home & Garden",
        ),
        demo_product(
            "SPORT001",
            "Yoga Mat (6mm)",
            "Non-slip exercise mat with carrying strap",
            2499,
            75,
            "Sports & Outdoors",
        ),
        demo_product(
            "SPORT002",
            "Water Bottle (32oz Insulated)",
            "Stainless steel vacuum-insulated water bottle, keeps cold 24h",
            2999,
            60,
            "Sports & Outdoors",
        ),
        demo_product(
            "SPORT003",
            "Resistance Bands Set",
            "Set of 5 resistance bands with different tension levels and door anchor",
            1999,
            85,
            "Sports & Outdoors",
        ),
        demo_product(
            "SPORT004",
            "Running Shoes (Men's)",
            "Lightweight running shoes with responsive cushioning",
            8999,
            45,
            "Sports & Outdoors",
        ),
    ]
}
