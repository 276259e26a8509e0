//! Compliance Adviser - conversational GDPR and AI Act compliance analysis
//!
//! A dialogue agent interviews the user about their company until every
//! required fact is known, a structured extractor turns the conversation into
//! a fact record, two retrieval-augmented analysers assess it against the
//! GDPR and the EU AI Act, and a summarizer merges both analyses. Every run
//! is checkpointed per thread so it can suspend for user input and resume
//! after a restart.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
