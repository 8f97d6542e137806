//! Registry keys.
//!
//! Connection strings carry shared access keys, so neither key prints the raw
//! string; `Display` shows only the endpoint host.

use std::fmt;

/// Identity of one logical transport connection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey(String);

impl ConnectionKey {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self(connection_string.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Endpoint host parsed out of `Endpoint=sb://host/;...`, if present
    pub fn endpoint(&self) -> Option<&str> {
        self.0
            .split(';')
            .filter_map(|part| part.trim().split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("endpoint"))
            .map(|(_, value)| {
                let value = value.trim();
                let without_scheme = value.split_once("://").map_or(value, |(_, rest)| rest);
                without_scheme.trim_end_matches('/')
            })
            .filter(|host| !host.is_empty())
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.endpoint() {
            Some(endpoint) => write!(f, "{endpoint}"),
            None => write!(f, "<redacted>"),
        }
    }
}

/// Identity of one sender: a topic on a connection
///
/// Kept as a structured pair rather than a joined string so that no
/// connection/topic combination can collide on a separator character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SenderKey {
    connection: ConnectionKey,
    topic: String,
}

impl SenderKey {
    pub fn new(connection_string: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            connection: ConnectionKey::new(connection_string),
            topic: topic.into(),
        }
    }

    pub fn connection(&self) -> &ConnectionKey {
        &self.connection
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl fmt::Display for SenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.connection, self.topic)
    }
}
