pub mod alert;
pub mod depletion;
pub mod sync;
pub mod token;

#[cfg(test)]
mod tests;
