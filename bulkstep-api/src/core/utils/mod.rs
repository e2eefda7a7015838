pub mod hashing;
pub mod logging;
