/// PostgreSQL plumbing shared by every model
///
/// - `pool`: `PoolSettings`, connecting and the startup ping
/// - `migrations`: the embedded schema and checks against a live database
///
/// Queries themselves live next to their records in `models`.

pub mod migrations;
pub mod pool;
