//! Card system: definitions and the theme catalog.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for a card
//! - `Card`: Static card data with opening/closing flags
//! - `ThemeSlug`: Closed set of theme identifiers
//! - `Theme`: A named, ordered deck
//! - `Catalog`: Validated theme lookup

pub mod catalog;
pub mod definition;

pub use catalog::{Catalog, Theme, ThemeSlug};
pub use definition::{Card, CardId};
