pub mod combiner;
pub mod router;
