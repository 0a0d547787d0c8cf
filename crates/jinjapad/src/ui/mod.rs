//! Reusable UI building blocks.
//!
//! Layout math and pure widget rendering functions shared by the app's
//! render methods.

pub mod layout;
pub mod widgets;
