//! Integration tests for dispatch and decoding against a mocked chain client

mod roundtrip_tests;
