pub mod dynamodb;
pub mod health;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod timeout;

pub use dynamodb::*;
pub use health::*;
pub use memory::*;
pub use repositories::*;
pub use timeout::*;
