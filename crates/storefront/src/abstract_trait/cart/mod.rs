mod repository;
mod service;

pub use self::repository::{CartQueryRepositoryTrait, DynCartQueryRepository};
pub use self::service::{CartServiceTrait, DynCartService};
