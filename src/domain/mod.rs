//! Domain layer: payment records, provider events and visibility reports.
//!
//! Plain data types and the invariants that hold regardless of where the
//! data is stored or how it reached the service.

pub mod lang;
pub mod payment;
pub mod payment_event;
pub mod payment_id;
pub mod visibility;

pub use lang::Lang;
pub use payment::{NewPayment, PaymentRecord, PaymentStatus};
pub use payment_event::{CheckoutSession, PaymentEvent};
pub use payment_id::PaymentId;
pub use visibility::{Pillar, VisibilityReport, VisibilityStatus};
