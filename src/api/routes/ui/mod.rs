pub mod public;
mod router;
mod templates;

pub use router::router;
