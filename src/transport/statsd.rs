//! DogStatsD Client
//!
//! Buffers gauge lines and ships them over UDP in packets no larger than
//! the configured payload size.

use super::{MetricClient, TransportError};
use crate::config::{ErrorHandler, Options};
use crate::exporter::ExportError;
use bytes::{BufMut, Bytes, BytesMut};
use metrics::counter;
use std::fmt;
use std::fmt::Write as _;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, trace};

/// UDP client speaking the DogStatsD line protocol
pub struct StatsdClient {
    socket: UdpSocket,
    endpoint: SocketAddr,
    namespace: String,
    tags: Vec<String>,
    max_packet_size: usize,
    buffer: Mutex<BytesMut>,
    failed_packets: AtomicU64,
    on_error: Option<ErrorHandler>,
}

impl StatsdClient {
    /// Create a client sending to `endpoint`
    pub fn new(
        endpoint: &str,
        namespace: &str,
        tags: Vec<String>,
        max_packet_size: usize,
    ) -> io::Result<Self> {
        let endpoint = endpoint
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("no address resolved for {}", endpoint),
                )
            })?;

        let bind_ip = if endpoint.is_ipv4() {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V6(Ipv6Addr::UNSPECIFIED)
        };
        let socket = UdpSocket::bind(SocketAddr::new(bind_ip, 0))?;
        socket.connect(endpoint)?;

        let mut namespace = namespace.to_string();
        if !namespace.is_empty() && !namespace.ends_with('.') {
            namespace.push('.');
        }

        debug!(endpoint = %endpoint, namespace = %namespace, "Created DogStatsD client");

        Ok(Self {
            socket,
            endpoint,
            namespace,
            tags,
            max_packet_size,
            buffer: Mutex::new(BytesMut::with_capacity(max_packet_size)),
            failed_packets: AtomicU64::new(0),
            on_error: None,
        })
    }

    /// Create a client from exporter options
    pub fn from_options(options: &Options) -> io::Result<Self> {
        let mut client = Self::new(
            options.endpoint_or_default(),
            &options.namespace,
            options.tags.clone(),
            options.max_packet_size,
        )?;
        client.on_error = options.on_error.clone();
        Ok(client)
    }

    /// Resolved destination address
    pub fn endpoint(&self) -> SocketAddr {
        self.endpoint
    }

    /// Bytes currently waiting to be sent
    pub fn pending_bytes(&self) -> usize {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Route send failures to `handler` instead of the log
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.on_error = Some(handler);
        self
    }

    /// Packets dropped because the send failed
    pub fn failed_packets(&self) -> u64 {
        self.failed_packets.load(Ordering::Relaxed)
    }

    fn take_if_overflowing(&self, buffer: &mut BytesMut, line_len: usize) -> Option<Bytes> {
        if !buffer.is_empty() && buffer.len() + 1 + line_len > self.max_packet_size {
            Some(buffer.split().freeze())
        } else {
            None
        }
    }

    fn send(&self, payload: Bytes) -> Result<(), TransportError> {
        trace!(bytes = payload.len(), "Sending DogStatsD packet");
        self.socket.send(&payload)?;
        Ok(())
    }

    fn send_or_report(&self, payload: Bytes) {
        let bytes = payload.len();
        if let Err(e) = self.send(payload) {
            self.failed_packets.fetch_add(1, Ordering::Relaxed);
            counter!("ocdatadog.dropped_packets", 1);

            let err = ExportError::Flush(e);
            match &self.on_error {
                Some(handler) => handler(&err),
                None => error!(error = %err, bytes, "Failed to export to Datadog"),
            }
        }
    }
}

impl MetricClient for StatsdClient {
    /// Buffer one gauge line.
    ///
    /// Only encoding problems fail the call. A packet that cannot be sent
    /// holds earlier points too, so its failure goes to the error handler
    /// and is counted in [`StatsdClient::failed_packets`].
    fn gauge(
        &self,
        name: &str,
        value: f64,
        tags: &[String],
        rate: f64,
    ) -> Result<(), TransportError> {
        let line = encode_gauge(&self.namespace, name, value, tags, &self.tags, rate)?;

        let earlier = {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            self.take_if_overflowing(&mut buffer, line.len())
        };
        if let Some(payload) = earlier {
            self.send_or_report(payload);
        }

        let mut ready = Vec::with_capacity(2);
        {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);

            // another thread may have filled the buffer since the first check
            ready.extend(self.take_if_overflowing(&mut buffer, line.len()));
            if !buffer.is_empty() {
                buffer.put_u8(b'\n');
            }
            buffer.put_slice(line.as_bytes());

            if buffer.len() >= self.max_packet_size {
                ready.push(buffer.split().freeze());
            }
        }

        for payload in ready {
            self.send_or_report(payload);
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), TransportError> {
        let payload = {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            buffer.split().freeze()
        };

        if payload.is_empty() {
            return Ok(());
        }
        self.send(payload)
    }
}

impl fmt::Debug for StatsdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsdClient")
            .field("endpoint", &self.endpoint)
            .field("namespace", &self.namespace)
            .field("tags", &self.tags)
            .field("max_packet_size", &self.max_packet_size)
            .field("failed_packets", &self.failed_packets())
            .finish()
    }
}

impl Drop for StatsdClient {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            debug!(error = %e, "Failed to flush DogStatsD buffer on drop");
        }
    }
}

/// Render one gauge in the DogStatsD line format:
/// `<namespace><name>:<value>|g[|@<rate>][|#<tags>]`
pub fn encode_gauge(
    namespace: &str,
    name: &str,
    value: f64,
    tags: &[String],
    global_tags: &[String],
    rate: f64,
) -> Result<String, TransportError> {
    if name.is_empty() || name.contains([':', '|', '@', '\n']) {
        return Err(TransportError::InvalidName(name.to_string()));
    }
    if !value.is_finite() {
        return Err(TransportError::InvalidValue {
            name: name.to_string(),
            value,
        });
    }

    let mut line = String::with_capacity(namespace.len() + name.len() + 32);
    line.push_str(namespace);
    line.push_str(name);
    // Writing to a String cannot fail
    let _ = write!(line, ":{}|g", value);

    if rate < 1.0 {
        let _ = write!(line, "|@{}", rate);
    }

    let mut all_tags = tags.iter().chain(global_tags.iter());
    if let Some(first) = all_tags.next() {
        line.push_str("|#");
        line.push_str(first);
        for tag in all_tags {
            line.push(',');
            line.push_str(tag);
        }
    }

    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_encode_plain_gauge() {
        let line = encode_gauge("", "latency", 5.0, &[], &[], 1.0).unwrap();
        assert_eq!(line, "latency:5|g");
    }

    #[test]
    fn test_encode_with_namespace_tags_and_rate() {
        let line = encode_gauge(
            "app.",
            "latency.avg",
            2.5,
            &tags(&["method:get", "source:Opencensus"]),
            &tags(&["env:prod"]),
            0.5,
        )
        .unwrap();
        assert_eq!(line, "app.latency.avg:2.5|g|@0.5|#method:get,source:Opencensus,env:prod");
    }

    #[test]
    fn test_encode_global_tags_only() {
        let line = encode_gauge("", "x", 1.0, &[], &tags(&["env:dev"]), 1.0).unwrap();
        assert_eq!(line, "x:1|g|#env:dev");
    }

    #[test]
    fn test_encode_rejects_bad_input() {
        assert!(matches!(
            encode_gauge("", "", 1.0, &[], &[], 1.0),
            Err(TransportError::InvalidName(_))
        ));
        assert!(matches!(
            encode_gauge("", "a|b", 1.0, &[], &[], 1.0),
            Err(TransportError::InvalidName(_))
        ));
        assert!(matches!(
            encode_gauge("", "a", f64::NAN, &[], &[], 1.0),
            Err(TransportError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_namespace_gets_separator() {
        let client = StatsdClient::new("127.0.0.1:8125", "myapp", Vec::new(), 1432).unwrap();
        assert_eq!(client.namespace, "myapp.");

        let client = StatsdClient::new("127.0.0.1:8125", "myapp.", Vec::new(), 1432).unwrap();
        assert_eq!(client.namespace, "myapp.");

        let client = StatsdClient::new("127.0.0.1:8125", "", Vec::new(), 1432).unwrap();
        assert_eq!(client.namespace, "");
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(StatsdClient::new("not an address", "", Vec::new(), 1432).is_err());
    }

    #[test]
    fn test_buffer_accumulates_until_flush() {
        let client = StatsdClient::new("127.0.0.1:8125", "", Vec::new(), 1432).unwrap();
        client.gauge("a", 1.0, &[], 1.0).unwrap();
        client.gauge("b", 2.0, &[], 1.0).unwrap();
        assert_eq!(client.pending_bytes(), "a:1|g\nb:2|g".len());

        client.flush().unwrap();
        assert_eq!(client.pending_bytes(), 0);
    }
}
