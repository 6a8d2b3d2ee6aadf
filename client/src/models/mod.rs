pub mod event;
pub mod host;
pub mod payment;
pub mod review;
pub mod ticket;
pub mod user;

pub use event::{Event, EventFilter, EventInput, EventStatus, Location};
pub use host::{Attendee, CheckInResult, HostAnalytics, Payout, PayoutAccount};
pub use payment::{PaymentInit, PaymentStatus, PaymentVerification};
pub use review::{NewReview, Review};
pub use ticket::{AttendeeContact, OrderItem, OrderRequest, Ticket, TicketType, TicketTypeInput};
pub use user::{Role, User};
