//! Server-side protocol flows. These steps never see the password; they
//! operate on the long-term server setup and opaque transport strings.

pub mod login;
pub mod registration;
pub mod setup;
