mod cart;
mod category;
mod order;
mod product;
mod unit_of_work;

pub use self::cart::CartQueryRepository;
pub use self::category::{CategoryCommandRepository, CategoryQueryRepository};
pub use self::order::{OrderCommandRepository, OrderQueryRepository};
pub use self::product::{ProductCommandRepository, ProductQueryRepository};
pub use self::unit_of_work::{PgUnitOfWork, PgUnitOfWorkFactory};

use shared::config::ConnectionPool;

pub(crate) const PRODUCT_COLUMNS: &str = "product_id, category_id, name, description, price, stock, image_url, version, created_at, updated_at";

pub(crate) const CART_COLUMNS: &str = "cart_id, user_id, created_at, updated_at";

pub(crate) const CART_LINES_SQL: &str = r#"
    SELECT ci.cart_item_id, ci.product_id, ci.quantity,
           p.name AS product_name, p.price AS unit_price, p.stock
    FROM cart_items ci
    JOIN products p ON p.product_id = ci.product_id
    WHERE ci.cart_id = $1
    ORDER BY ci.cart_item_id
"#;

pub(crate) const ORDER_COLUMNS: &str =
    "order_id, user_id, total_amount, shipping_address, status, created_at, updated_at";

pub async fn run_migrations(pool: &ConnectionPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;

    Ok(())
}
