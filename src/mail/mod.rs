pub mod decoders;
pub mod gateway;
pub mod http;
