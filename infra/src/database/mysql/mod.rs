//! MySQL backend - raw SQLx sessions managed by the pool

pub mod factory;
pub mod session;

pub use factory::MySqlSessionFactory;
pub use session::MySqlSession;

use super::unit_of_work::Database;

/// The access layer over the MySQL backend, as most callers name it
pub type MySqlDatabase = Database<MySqlSessionFactory>;
