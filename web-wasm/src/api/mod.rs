pub mod fetch;

pub use fetch::{js_message, DatasheetBlob, FetchGateway};
