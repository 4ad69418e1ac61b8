//! Catalog domain module.
//!
//! Categories, products and their dependents (pictures, favorites, comments,
//! discount codes), implemented as plain domain records plus the price
//! reconciliation rule that runs before a product is written. No IO, no
//! storage; persistence lives in `storefront-infra`.

pub mod category;
pub mod comment;
pub mod discount_code;
pub mod favorite;
pub mod format;
pub mod hooks;
pub mod picture;
pub mod pricing;
pub mod product;

pub use category::{Category, NewCategory};
pub use comment::{Comment, CommentThread, NewComment, build_threads, sort_newest_first};
pub use discount_code::{DiscountCode, NewDiscountCode};
pub use favorite::Favorite;
pub use format::{DEFAULT_CURRENCY_SUFFIX, PriceFormat, format_price, group_thousands};
pub use hooks::{BeforeSave, SaveContext};
pub use picture::{ImageRef, Picture};
pub use pricing::{PriceInput, ReconcileMode, Reconciled, reconcile};
pub use product::{NewProduct, Product};
