//! # meridian-orders: Collaborator Boundary + Async Order Service
//!
//! Everything the order engine must not do itself lives behind the traits
//! in [`sources`]; everything the admin console calls lives on
//! [`service::OrderService`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         meridian-orders                                 │
//! │                                                                         │
//! │   Admin console ──► OrderService ──► OrderSession (meridian-core)      │
//! │                         │                                               │
//! │                         ├──► CatalogSource    (search, live stock)     │
//! │                         ├──► PurchaseHistory  (last purchase cost)     │
//! │                         ├──► OrderHistory     (last order prices)      │
//! │                         └──► OrderGateway     (create/update order)    │
//! │                                                                         │
//! │   Only two operations suspend on I/O beyond submission: the cost       │
//! │   fetch on first add and the last-order-price fetch. Both apply        │
//! │   their result synchronously or not at all.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod service;
pub mod sources;
pub mod state;

pub use error::{ServiceError, ServiceResult};
pub use service::OrderService;
pub use sources::{
    CatalogSource, OrderGateway, OrderHistory, OrderReceipt, PurchaseHistory, SourceError,
    SourceResult,
};
pub use state::SessionState;
