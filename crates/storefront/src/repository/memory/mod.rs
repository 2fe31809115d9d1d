//! In-process storage with the same transactional guarantees as Postgres.
//!
//! Committed rows live behind one `parking_lot` mutex. Units of work take
//! per-cart and per-product async locks, stage their writes, and apply them
//! in a single critical section on commit.

mod cart;
mod category;
mod order;
mod product;
mod store;
mod unit_of_work;

pub use self::cart::MemoryCartQueryRepository;
pub use self::category::{MemoryCategoryCommandRepository, MemoryCategoryQueryRepository};
pub use self::order::{MemoryOrderCommandRepository, MemoryOrderQueryRepository};
pub use self::product::{MemoryProductCommandRepository, MemoryProductQueryRepository};
pub use self::store::MemoryDatabase;
pub use self::unit_of_work::{MemoryUnitOfWork, MemoryUnitOfWorkFactory};
