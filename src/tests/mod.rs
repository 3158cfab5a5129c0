pub mod audit_tests;
pub mod coordinator_tests;
pub mod vault_tests;
