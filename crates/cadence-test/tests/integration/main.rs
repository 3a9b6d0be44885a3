//! End-to-end tests of the recurring booking pipeline.
//!
//! Most run over the in-memory store; `postgres` runs against
//! `TEST_DATABASE_URL` and skips itself when it is unset.

mod commit;
mod http;
mod postgres;
