pub mod documents;
pub mod info;
pub mod listing;
