//! Database integration tests
//!
//! Require a Postgres database: `DATABASE_URL=... cargo test -- --ignored`

mod reproduction_tests;
