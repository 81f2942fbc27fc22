pub mod reporter;

pub use reporter::{print_json_results, print_results};
