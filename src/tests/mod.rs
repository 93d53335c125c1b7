// Test modules for fireworks-llm crate
//
// Test organization follows the template pattern where each source file
// has a corresponding test file that focuses on business logic verification.

// Test helper utilities
pub mod helpers;


// NOTE: Token tests live in integration tests (tests/token_integration_tests.rs)
// They load the cl100k tokenizer, which is slow, so they don't belong in unit tests
