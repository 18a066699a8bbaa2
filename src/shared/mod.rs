pub mod constants;
pub mod prompts;
#[cfg(test)]
pub mod test_helpers;
pub mod tokenizer;
pub mod types;
pub mod validation;
