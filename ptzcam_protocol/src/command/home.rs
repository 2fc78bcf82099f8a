//! # Home position
use super::Payload;

/// `06 04`: move to the home position.
///
/// ## Packet format
///
/// No parameters: `81 01 06 04 ff`
pub const HOME: Payload = Payload::Home;

/// `06 05`: store the current position as the home position.
///
/// ## Packet format
///
/// No parameters: `81 01 06 05 ff`
pub const SET_HOME: Payload = Payload::SetHome;
