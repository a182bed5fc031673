//! WebSocket connection state.

use std::fmt;

/// Lifecycle state of a [`WsApiClient`](super::WsApiClient).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WsConnectionState {
    /// Not connected; `start` has not run or `stop` completed.
    Disconnected = 0,
    /// Handshake in progress.
    Connecting = 1,
    /// Socket open and reader running.
    Connected = 2,
    /// Socket dropped; waiting to reconnect.
    Reconnecting = 3,
}

impl WsConnectionState {
    /// Converts a `u8` value to `WsConnectionState`.
    #[inline]
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Connected,
            3 => Self::Reconnecting,
            _ => Self::Disconnected,
        }
    }

    /// Converts the state to its `u8` representation.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for WsConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_conversion() {
        for state in [
            WsConnectionState::Disconnected,
            WsConnectionState::Connecting,
            WsConnectionState::Connected,
            WsConnectionState::Reconnecting,
        ] {
            assert_eq!(WsConnectionState::from_u8(state.as_u8()), state);
        }
        assert_eq!(WsConnectionState::from_u8(99), WsConnectionState::Disconnected);
    }
}
