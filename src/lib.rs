//! Fget library
//!
//! Byte-exact fetch of a single remote file over a blocking stream socket

pub mod logger;
pub mod net;
pub mod protocol;
pub mod xfer;
