//! Networking modules for the identity provider and cross-tab messaging.
//!
//! SYSTEM CONTEXT
//! ==============
//! `config` resolves provider settings from the page, `supabase` talks to the
//! provider's REST API, `broadcast` carries auth announcements between tabs,
//! and `types` defines the provider's wire schema.

pub mod broadcast;
pub mod config;
pub mod supabase;
pub mod types;
