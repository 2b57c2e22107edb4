use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

/// One product entry within a cart, carrying its own quantity and subtotal.
/// At most one line exists per product id; repeated adds increment quantity
/// in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

impl CartLine {
    fn recompute_subtotal(&mut self) {
        self.subtotal = (self.price * Decimal::from(self.quantity)).round_dp(2);
    }
}

/// The mutable cart document persisted per session. `total` and `item_count`
/// are derived from the lines and recomputed on every mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartLine>,
    pub total: Decimal,
    pub item_count: u32,
}

impl Default for Cart {
    fn default() -> Self {
        Self { items: Vec::new(), total: Decimal::ZERO, item_count: 0 }
    }
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds `quantity` units of `product`, merging into an existing line when
    /// the product is already carted, then recomputes the totals.
    pub fn add_product(&mut self, product: &Product, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvariantViolation(
                "cart quantity delta must be positive".to_string(),
            ));
        }

        match self.items.iter_mut().find(|line| line.product_id == product.id) {
            Some(line) => {
                line.quantity += quantity;
                line.recompute_subtotal();
            }
            None => {
                let mut line = CartLine {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    price: product.price,
                    quantity,
                    subtotal: Decimal::ZERO,
                };
                line.recompute_subtotal();
                self.items.push(line);
            }
        }

        self.recompute_totals();
        Ok(())
    }

    fn recompute_totals(&mut self) {
        self.total = self.items.iter().map(|line| line.subtotal).sum::<Decimal>().round_dp(2);
        self.item_count = self.items.iter().map(|line| line.quantity).sum();
    }
}
