//! Result records decoded from the push service: tickets and receipts.

mod error_code;
mod receipt;
mod ticket;

pub use error_code::PushErrorCode;
pub use receipt::{
    ApnsDetails, BatchFailure, FcmDetails, PushReceipt, ReceiptDetails, ReceiptResults,
    ReceiptStatus,
};
pub use ticket::{PushTicket, TicketDetails, TicketStatus};
