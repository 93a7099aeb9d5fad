//! Transport link abstraction.
//!
//! A [`Link`] moves single bytes between the two nodes. Receives block until
//! a byte arrives; there is no framing and, by default, no timeout.
//!
//! Two implementations are provided:
//!
//! - [`StreamLink`] adapts any `AsyncRead + AsyncWrite` transport through a
//!   `Framed<_, WireCodec>`. [`StreamLink::pair`] builds two connected
//!   in-memory ends for simulation and tests.
//! - [`SupervisedLink`] wraps another link and bounds every receive with a
//!   timeout. This is an opt-in extension; the baseline protocol blocks
//!   forever on a silent peer.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite, DuplexStream};
use tokio_util::codec::Framed;
use tracing::{trace, warn};

use crate::WireCodec;
use latchkey_core::{Error, Result};

/// Capacity of each direction of an in-memory link pair.
const PAIR_BUFFER_SIZE: usize = 64;

/// Byte transport between the two nodes.
pub trait Link: Send {
    /// Send one byte to the peer.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or the peer is gone.
    async fn send_byte(&mut self, byte: u8) -> Result<()>;

    /// Receive the next byte from the peer, waiting as long as necessary.
    ///
    /// # Errors
    ///
    /// Returns `Error::LinkClosed` when the peer has gone away, or a
    /// transport error.
    async fn recv_byte(&mut self) -> Result<u8>;
}

impl<L: Link + ?Sized> Link for &mut L {
    async fn send_byte(&mut self, byte: u8) -> Result<()> {
        (**self).send_byte(byte).await
    }

    async fn recv_byte(&mut self) -> Result<u8> {
        (**self).recv_byte().await
    }
}

/// Link configuration.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use latchkey_protocol::LinkConfig;
///
/// let config = LinkConfig::default().with_receive_timeout(Duration::from_secs(5));
/// assert_eq!(config.receive_timeout, Some(Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Upper bound on any single receive. `None` blocks indefinitely.
    pub receive_timeout: Option<Duration>,
}

impl LinkConfig {
    /// Set the receive timeout.
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = Some(timeout);
        self
    }
}

/// Link over any async byte stream.
#[derive(Debug)]
pub struct StreamLink<T> {
    framed: Framed<T, WireCodec>,
}

impl<T> StreamLink<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap a byte stream.
    pub fn new(io: T) -> Self {
        Self {
            framed: Framed::new(io, WireCodec::new()),
        }
    }

    /// Codec counters for this end.
    pub fn codec(&self) -> &WireCodec {
        self.framed.codec()
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> T {
        self.framed.into_inner()
    }
}

impl StreamLink<DuplexStream> {
    /// Create two connected in-memory link ends.
    ///
    /// # Example
    ///
    /// ```
    /// use latchkey_protocol::{Link, StreamLink};
    ///
    /// # async fn example() -> latchkey_core::Result<()> {
    /// let (mut frontend, mut authority) = StreamLink::pair();
    /// frontend.send_byte(0xE1).await?;
    /// assert_eq!(authority.recv_byte().await?, 0xE1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn pair() -> (Self, Self) {
        let (a, b) = tokio::io::duplex(PAIR_BUFFER_SIZE);
        (Self::new(a), Self::new(b))
    }
}

impl<T> Link for StreamLink<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_byte(&mut self, byte: u8) -> Result<()> {
        trace!("tx 0x{:02X}", byte);
        self.framed.send(byte).await
    }

    async fn recv_byte(&mut self) -> Result<u8> {
        match self.framed.next().await {
            Some(Ok(byte)) => {
                trace!("rx 0x{:02X}", byte);
                Ok(byte)
            }
            Some(Err(e)) => Err(e),
            None => Err(Error::LinkClosed),
        }
    }
}

/// Link wrapper enforcing a receive timeout.
///
/// With no timeout configured it is a transparent pass-through.
#[derive(Debug)]
pub struct SupervisedLink<L> {
    inner: L,
    receive_timeout: Option<Duration>,
}

impl<L: Link> SupervisedLink<L> {
    /// Wrap `inner` using the timeout from `config`.
    pub fn new(inner: L, config: &LinkConfig) -> Self {
        Self {
            inner,
            receive_timeout: config.receive_timeout,
        }
    }

    /// The configured receive timeout.
    pub fn receive_timeout(&self) -> Option<Duration> {
        self.receive_timeout
    }

    /// Unwrap the inner link.
    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: Link> Link for SupervisedLink<L> {
    async fn send_byte(&mut self, byte: u8) -> Result<()> {
        self.inner.send_byte(byte).await
    }

    async fn recv_byte(&mut self) -> Result<u8> {
        let Some(limit) = self.receive_timeout else {
            return self.inner.recv_byte().await;
        };

        match tokio::time::timeout(limit, self.inner.recv_byte()).await {
            Ok(result) => result,
            Err(_) => {
                let duration_ms = limit.as_millis() as u64;
                warn!("Peer silent for {}ms, giving up on receive", duration_ms);
                Err(Error::LinkTimeout { duration_ms })
            }
        }
    }
}
