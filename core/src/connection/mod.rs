pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;

pub use r#trait::{Connection, ConnectionFactory};

#[cfg(any(test, feature = "mock-connection"))]
pub mod mock;
#[cfg(any(test, feature = "mock-connection"))]
pub use mock::{MockConnection, MockConnectionFactory, MockState};

#[cfg(test)]
mod tests;
