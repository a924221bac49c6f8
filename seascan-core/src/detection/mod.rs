pub mod element;
pub mod record;
