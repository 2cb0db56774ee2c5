mod common;

mod engine;
mod verification;
