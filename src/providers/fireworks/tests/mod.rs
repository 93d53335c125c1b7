//! Tests for the Fireworks provider
//!
//! Pure functions only: request building and SSE decoding.


// NOTE: HTTP round trips are in tests/harness_tests.rs and
// tests/http_client_integration_tests.rs, which run against a MockServer
