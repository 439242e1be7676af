//! The seeded bookstore fixture the demo commands operate on: schema,
//! deterministic data, and the slow/optimized query pair under comparison.

pub mod queries;
pub mod schema;
pub mod seed;
