pub mod connection;
pub mod models;
pub mod repositories;
pub mod resolver;
pub mod schema;

pub use connection::{
    DatabaseError, DbConnection, DbPool, PoolSettings, create_connection_pool,
    get_connection_from_pool, run_migrations, test_connection,
};
pub use resolver::ConnectionResolver;
