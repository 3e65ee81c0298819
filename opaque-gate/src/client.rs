//! Client-side protocol flows. These steps never see any server secret
//! material; everything they consume arrives as opaque transport strings.

pub mod login;
pub mod registration;
