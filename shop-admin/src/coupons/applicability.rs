//! Coupon applicability lists

use shared::models::{ApplyTo, Product};

/// Product ids a coupon is restricted to, in catalog order.
///
/// A category coupon covers products filed directly under the category and
/// products whose category's parent is that category. Deeper descendants are
/// not included. Matching uses each product's category snapshot.
pub fn resolve_applicability(apply_to: &ApplyTo, products: &[Product]) -> Vec<String> {
    match apply_to {
        ApplyTo::All => products.iter().map(|p| p.id.clone()).collect(),
        ApplyTo::Product(id) => vec![id.clone()],
        ApplyTo::Category(category_id) => {
            let category_id = Some(category_id.as_str());
            products
                .iter()
                .filter(|p| p.category_id() == category_id || p.parent_category_id() == category_id)
                .map(|p| p.id.clone())
                .collect()
        }
    }
}
