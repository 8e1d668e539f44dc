//! Engine integration tests: booking, lifecycle, payments and chat flows
//! against a whole `Engine`.

mod support;
mod booking_flow;
mod chat;
mod lifecycle;
mod payments;
