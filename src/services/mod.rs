//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business rules and persistence so route handlers can
//! stay focused on extraction, localization and status mapping. Static portal
//! data (`catalog`, `tracker` routes, `live_status`) needs no database.

pub mod auth;
pub mod card;
pub mod catalog;
pub mod employee;
pub mod live_status;
pub mod pin;
pub mod session;
pub mod tracker;
pub mod transaction;
