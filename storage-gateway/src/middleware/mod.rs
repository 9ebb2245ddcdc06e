pub mod cors;

pub use cors::gateway_cors;
