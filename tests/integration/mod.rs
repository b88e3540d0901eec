//! Integration Tests Module
//!
//! This module contains integration tests for Career Coach Desktop.
//! Tests cover the conversation store flow, streaming queries against stub
//! HTTP servers, backend supervisor lifecycle, and the serialized envelopes
//! the UI consumes over IPC.

// Conversation store flow tests
mod conversation_flow_test;


// Backend supervisor lifecycle tests
mod supervisor_lifecycle_test;

// IPC envelope serialization tests
mod envelope_test;
