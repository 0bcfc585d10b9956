//! Integration tests for the builder host.

mod helpers;

mod adapter_test;
mod compile_done_test;
