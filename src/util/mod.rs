pub mod escape;
pub mod mapper;
pub mod quote;

pub use quote::{need_quote, quote, quote_key, unquote, QuoteType};
