pub mod elements;
pub mod imports;
pub mod parser;

pub use elements::extract_code_elements;
