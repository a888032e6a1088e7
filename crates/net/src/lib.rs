pub mod encoder;
pub mod fetch;

pub use encoder::ProxyEncoder;
pub use fetch::ReqwestFetcher;
