pub mod errors;

pub use bulkstep_api::core::utils::hashing;
