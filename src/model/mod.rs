pub mod alert;
pub mod credential;
pub mod esi;
pub mod structure;
