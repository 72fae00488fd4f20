//! Survey services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the survey logic so route handlers can stay focused
//! on protocol translation. Nothing here touches the network except `scan`,
//! which reaches the vision model through the `VisionChat` trait.

pub mod export;
pub mod form;
pub mod records;
pub mod scan;
