//! Custom request extractors.

mod form;

pub use form::FormParams;
