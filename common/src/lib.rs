//! Product Catalog Common Library
//!
//! CLIとWeb(WASM)で共有されるクライアントの中核:
//! セッション、検索結果の絞り込み・ページング、ゲートウェイ契約、画面への射影

pub mod client;
pub mod error;
pub mod gateway;
pub mod results;
pub mod session;
pub mod theme;
pub mod types;
pub mod view;

pub use client::{CatalogClient, SearchOutcome};
pub use error::{AuthError, Error, GatewayError, Result};
pub use gateway::CatalogGateway;
pub use results::{FilterCriteria, ResultSetController, PAGE_SIZE};
pub use session::{Credential, KeyValueStorage, MemoryStorage, SessionStore};
pub use theme::Theme;
pub use types::{DatasheetFile, Product, ProductDraft, ProductId, SaveAck, UploadAck};
pub use view::{Action, Notice, ProductRow, ResultsView, Screen};
