use crate::error::SinkError;
use redis::Commands;
use std::time::Duration;

/// Key-value store backed by Redis. The connection is opened on first use
/// and dropped after a failure, so the next `set` reconnects.
pub struct RedisStore {
    client: redis::Client,
    connection: Option<redis::Connection>,
    timeout: Duration,
}

impl RedisStore {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SinkError> {
        let client = redis::Client::open(url)?;
        Ok(RedisStore {
            client,
            connection: None,
            timeout,
        })
    }

    fn connection(&mut self) -> Result<&mut redis::Connection, SinkError> {
        if self.connection.is_none() {
            tracing::debug!("Connecting to key-value store");
            let connection = self.client.get_connection_with_timeout(self.timeout)?;
            connection.set_read_timeout(Some(self.timeout))?;
            connection.set_write_timeout(Some(self.timeout))?;
            self.connection = Some(connection);
        }
        self.connection
            .as_mut()
            .ok_or_else(|| SinkError::Store("connection unavailable".to_string()))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SinkError> {
        let result: Result<(), SinkError> = self
            .connection()
            .and_then(|con| con.set::<_, _, ()>(key, value).map_err(SinkError::from));

        if result.is_err() {
            self.connection = None;
        }
        result
    }
}
