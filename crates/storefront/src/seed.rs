use crate::{
    di::Repositories,
    domain::requests::{category::CreateCategoryRequest, product::CreateProductRequest},
};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

const CATEGORIES: [(&str, &str); 5] = [
    ("Shampoos", "Natural and professional shampoos for curly hair"),
    ("Conditioners", "Deep conditioning treatments and leave-in conditioners"),
    ("Styling Products", "Gels, creams, and styling products for curls"),
    ("Hair Treatments", "Masks, oils, and intensive treatments"),
    ("Tools & Accessories", "Brushes, diffusers, and hair accessories"),
];

struct SeedProduct {
    category: usize,
    name: &'static str,
    description: &'static str,
    cents: i64,
    stock: i32,
    image: &'static str,
}

const PRODUCTS: [SeedProduct; 12] = [
    SeedProduct { category: 0, name: "Curl Defining Shampoo", description: "Sulfate-free shampoo that cleanses without stripping natural oils", cents: 2499, stock: 50, image: "shampoo1.jpg" },
    SeedProduct { category: 0, name: "Moisture Balance Shampoo", description: "Hydrating shampoo for dry and damaged curls", cents: 2999, stock: 45, image: "shampoo2.jpg" },
    SeedProduct { category: 1, name: "Deep Moisture Conditioner", description: "Intensive conditioner for maximum hydration", cents: 2799, stock: 60, image: "conditioner1.jpg" },
    SeedProduct { category: 1, name: "Leave-In Conditioner Spray", description: "Lightweight leave-in spray for everyday use", cents: 1999, stock: 75, image: "conditioner2.jpg" },
    SeedProduct { category: 2, name: "Curl Defining Gel", description: "Strong hold gel that defines curls without crunch", cents: 2299, stock: 40, image: "gel1.jpg" },
    SeedProduct { category: 2, name: "Curl Enhancing Cream", description: "Moisturizing cream that enhances natural curl pattern", cents: 2599, stock: 55, image: "cream1.jpg" },
    SeedProduct { category: 2, name: "Frizz Control Serum", description: "Lightweight serum that tames frizz and adds shine", cents: 1899, stock: 65, image: "serum1.jpg" },
    SeedProduct { category: 3, name: "Protein Hair Mask", description: "Strengthening mask for damaged hair", cents: 3299, stock: 30, image: "mask1.jpg" },
    SeedProduct { category: 3, name: "Argan Oil Treatment", description: "Pure argan oil for deep nourishment", cents: 3499, stock: 35, image: "oil1.jpg" },
    SeedProduct { category: 4, name: "Wide Tooth Comb", description: "Detangling comb for curly hair", cents: 1299, stock: 100, image: "comb1.jpg" },
    SeedProduct { category: 4, name: "Microfiber Hair Towel", description: "Gentle towel that reduces frizz", cents: 1599, stock: 80, image: "towel1.jpg" },
    SeedProduct { category: 4, name: "Diffuser Attachment", description: "Universal diffuser for blow dryers", cents: 2899, stock: 45, image: "diffuser1.jpg" },
];

/// Inserts the demo catalog unless categories already exist.
///
/// Returns `false` when the store was already populated.
pub async fn seed_catalog(repos: &Repositories) -> Result<bool> {
    let existing = repos
        .category_query
        .count()
        .await
        .context("Failed to count categories")?;
    if existing > 0 {
        info!("Catalog already has {existing} categories, skipping seed");
        return Ok(false);
    }

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        let category = repos
            .category_command
            .create_category(&CreateCategoryRequest {
                name: name.to_string(),
                description: Some(description.to_string()),
            })
            .await
            .with_context(|| format!("Failed to seed category '{name}'"))?;
        category_ids.push(category.category_id);
    }

    for product in &PRODUCTS {
        repos
            .product_command
            .create_product(&CreateProductRequest {
                name: product.name.to_string(),
                description: Some(product.description.to_string()),
                price: Decimal::new(product.cents, 2),
                stock: product.stock,
                image_url: Some(format!("https://example.com/{}", product.image)),
                category_id: category_ids[product.category],
            })
            .await
            .with_context(|| format!("Failed to seed product '{}'", product.name))?;
    }

    info!(
        "🌱 Seeded {} categories and {} products",
        CATEGORIES.len(),
        PRODUCTS.len()
    );
    Ok(true)
}
