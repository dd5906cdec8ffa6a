//! External delivery channels for onboarding notifications.

pub mod webhook;
