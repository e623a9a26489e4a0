pub mod defaults;
pub mod migrate;
pub mod utils;
pub mod validate;
pub mod versions;
