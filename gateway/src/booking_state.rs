//! Case-insensitive parsing of the booking `state` query parameter.

use std::fmt;
use std::str::FromStr;

use crate::error::GatewayError;

/// Booking listing classifications understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    /// Every booking.
    All,
    /// In progress now.
    Current,
    /// Already ended.
    Past,
    /// Not yet started.
    Future,
    /// Awaiting the owner's decision.
    Waiting,
    /// Declined by the owner.
    Rejected,
}

impl BookingState {
    /// Canonical upper-case name forwarded to the server.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Current => "CURRENT",
            Self::Past => "PAST",
            Self::Future => "FUTURE",
            Self::Waiting => "WAITING",
            Self::Rejected => "REJECTED",
        }
    }

    /// Resolve an optional parameter, defaulting to [`BookingState::All`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnsupportedState`] for unknown text.
    pub fn from_param(raw: Option<&str>) -> Result<Self, GatewayError> {
        raw.map_or(Ok(Self::All), str::parse)
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingState {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::All,
            Self::Current,
            Self::Past,
            Self::Future,
            Self::Waiting,
            Self::Rejected,
        ]
        .into_iter()
        .find(|state| state.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| GatewayError::unsupported_state(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("all", BookingState::All)]
    #[case("Current", BookingState::Current)]
    #[case("PAST", BookingState::Past)]
    #[case("future", BookingState::Future)]
    #[case("waiting", BookingState::Waiting)]
    #[case("rejected", BookingState::Rejected)]
    fn parses_ignoring_case(#[case] raw: &str, #[case] expected: BookingState) {
        assert_eq!(raw.parse::<BookingState>(), Ok(expected));
    }

    #[rstest]
    fn missing_parameter_means_all() {
        assert_eq!(BookingState::from_param(None), Ok(BookingState::All));
    }

    #[rstest]
    #[case("SOMETIME")]
    #[case("")]
    #[case("approved")]
    fn unknown_text_is_reported_verbatim(#[case] raw: &str) {
        assert_eq!(
            BookingState::from_param(Some(raw)),
            Err(GatewayError::unsupported_state(raw))
        );
    }
}
