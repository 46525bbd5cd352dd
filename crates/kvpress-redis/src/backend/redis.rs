//! RESP backend built on the `redis` crate.
//!
//! Each [`RedisConn`] wraps its own [`MultiplexedConnection`]. The engine
//! pins one of these per worker, so the multiplexing is never actually
//! shared; it is simply the async connection type `redis` offers on Tokio.

use kvpress::{Command, Connection, Dialer, Error, Result};
use redis::{Client, Value, aio::MultiplexedConnection};

/// Dials fresh connections to a single Redis-protocol endpoint.
#[derive(Clone, Debug)]
pub struct RedisDialer {
    client: Client,
}

impl RedisDialer {
    /// Validates `url` without connecting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dial`] if the URL cannot be parsed.
    pub fn open(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(Error::dial)?;
        Ok(Self { client })
    }
}

impl Dialer for RedisDialer {
    type Conn = RedisConn;

    async fn dial(&self) -> Result<RedisConn> {
        let inner = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(Error::dial)?;
        Ok(RedisConn { inner })
    }
}

pub struct RedisConn {
    inner: MultiplexedConnection,
}

impl Connection for RedisConn {
    async fn execute(&mut self, command: &Command) -> Result<()> {
        let mut cmd = redis::cmd(command.name());
        for arg in command.args() {
            cmd.arg(&arg[..]);
        }

        let _: Value = cmd
            .query_async(&mut self.inner)
            .await
            .map_err(|e| Error::command(command.name(), e))?;
        Ok(())
    }
}
