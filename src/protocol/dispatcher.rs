use crate::config::CodecConfig;
use crate::core::bitstream::ReadPolicy;
use crate::core::packet::{payload_slice, read_packet_header, MessageType};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::message::Message;
use crate::utils::hex::hex_dump;
use crate::utils::metrics::Metrics;
use std::collections::HashMap;
use tracing::{debug, trace, warn, Level};

type HandlerFn = dyn Fn(&Message) -> Result<Option<Message>> + Send + Sync + 'static;

/// Decode one packet from the front of `buf` with the strict read policy.
///
/// Returns the message and the number of bytes the packet occupied.
pub fn decode_message(buf: &[u8]) -> Result<(Message, usize)> {
    decode_message_with_policy(buf, ReadPolicy::Strict)
}

/// Decode one packet. Only the `payload_len` bytes the header announces are handed to the payload decoder.
pub fn decode_message_with_policy(buf: &[u8], policy: ReadPolicy) -> Result<(Message, usize)> {
    let (header, offset) = read_packet_header(buf)?;
    let payload = payload_slice(buf, &header, offset)?;

    if tracing::enabled!(Level::TRACE) {
        trace!(kind = header.message_type.name(), payload = %hex_dump(payload), "decoding payload");
    }

    let message = Message::decode_payload(header.message_type, payload, policy)?;
    Ok((message, offset + payload.len()))
}

/// Routes decoded packets to per-type handlers.
///
/// A handler may return a reply message. Types with no registered handler are
/// rejected with `UnexpectedMessage`.
pub struct Dispatcher {
    handlers: HashMap<MessageType, Box<HandlerFn>>,
    config: CodecConfig,
    metrics: Metrics,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            handlers: HashMap::new(),
            config,
            metrics: Metrics::new(),
        }
    }

    /// Install the handler for `message_type`, replacing any previous one.
    pub fn register<F>(&mut self, message_type: MessageType, handler: F)
    where
        F: Fn(&Message) -> Result<Option<Message>> + Send + Sync + 'static,
    {
        self.handlers.insert(message_type, Box::new(handler));
    }

    pub fn is_registered(&self, message_type: MessageType) -> bool {
        self.handlers.contains_key(&message_type)
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Decode one packet under this dispatcher's limits without routing it.
    pub fn decode(&self, buf: &[u8]) -> Result<(Message, usize)> {
        let result = self.decode_inner(buf);
        match &result {
            Ok((message, consumed)) => self.metrics.packet_decoded(message.message_type(), *consumed),
            Err(e) => {
                warn!(error = %e, "packet decode failed");
                self.metrics.decode_failed();
            }
        }
        result
    }

    fn decode_inner(&self, buf: &[u8]) -> Result<(Message, usize)> {
        let (header, _) = read_packet_header(buf)?;
        let payload_len = header.payload_len as usize;
        if payload_len > self.config.max_payload_size {
            return Err(ProtocolError::OversizedPacket(payload_len));
        }
        decode_message_with_policy(buf, self.config.read_policy)
    }

    /// Decode the packet at the front of `buf` and hand it to its handler.
    pub fn dispatch(&self, buf: &[u8]) -> Result<Option<Message>> {
        let (message, _) = self.decode(buf)?;
        self.route(&message)
    }

    /// Dispatch every packet in a buffer of back-to-back packets, collecting replies.
    ///
    /// Stops at the first error.
    pub fn dispatch_all(&self, mut buf: &[u8]) -> Result<Vec<Message>> {
        let mut replies = Vec::new();
        while !buf.is_empty() {
            let (message, consumed) = self.decode(buf)?;
            if let Some(reply) = self.route(&message)? {
                replies.push(reply);
            }
            buf = &buf[consumed..];
        }
        Ok(replies)
    }

    /// Hand an already decoded message to its handler.
    pub fn route(&self, message: &Message) -> Result<Option<Message>> {
        let message_type = message.message_type();
        let handler = self.handlers.get(&message_type).ok_or_else(|| {
            debug!(kind = message_type.name(), "{}", constants::ERR_NO_HANDLER);
            ProtocolError::UnexpectedMessage
        })?;

        debug!(kind = message_type.name(), "dispatching message");
        self.metrics.packet_dispatched();
        handler(message)
    }
}
