//! Framed message transfer over datagram and stream sockets.

use anilin_proto::error::ParseError;
use anilin_proto::Message;
use byteorder::{ByteOrder, NetworkEndian};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::UdpSocket;
use tokio::sync::Mutex;

use crate::error::Error;
use crate::MAX_PACKET_LEN;

/// A bidirectional byte stream a [`StreamConn`] can frame messages over:
/// a TCP stream, a TLS session, or an in-memory pipe in tests.
pub trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncStream for T {}

pub(crate) type BoxStream = Box<dyn AsyncStream>;

/// A network connection to a DNS resolver.
#[derive(Debug)]
pub enum Conn {
    /// A packet-oriented connection (RFC 1035 Section 4.2.1 "UDP usage").
    Packet(PacketConn),
    /// A stream-oriented connection (RFC 1035 Section 4.2.2 "TCP usage").
    Stream(StreamConn),
}

impl Conn {
    /// Writes a DNS message to the connection.
    pub async fn send(&self, msg: &Message) -> Result<(), Error> {
        match self {
            Conn::Packet(conn) => conn.send(msg).await,
            Conn::Stream(conn) => conn.send(msg).await,
        }
    }

    /// Reads a DNS message from the connection.
    pub async fn recv(&self) -> Result<Message, Error> {
        match self {
            Conn::Packet(conn) => conn.recv().await,
            Conn::Stream(conn) => conn.recv().await,
        }
    }
}

/// A packet-oriented connection to a DNS resolver. Each message occupies a
/// single datagram.
#[derive(Debug)]
pub struct PacketConn {
    socket: UdpSocket,
    rbuf: Mutex<Vec<u8>>,
}

impl PacketConn {
    /// Wraps a connected UDP socket. The receive buffer defaults to
    /// [`MAX_PACKET_LEN`] bytes.
    pub fn new(socket: UdpSocket) -> Self {
        Self {
            socket,
            rbuf: Mutex::new(vec![0; MAX_PACKET_LEN]),
        }
    }

    /// Overrides the receive buffer size, for servers that advertised a
    /// larger payload via EDNS.
    pub fn recv_size(self, size: usize) -> Self {
        Self {
            rbuf: Mutex::new(vec![0; size]),
            ..self
        }
    }

    /// Writes one message as a single datagram.
    ///
    /// Fails with [`Error::OversizedQuery`] before sending anything if the
    /// packed message exceeds [`MAX_PACKET_LEN`].
    pub async fn send(&self, msg: &Message) -> Result<(), Error> {
        let buf = msg.pack(Vec::with_capacity(MAX_PACKET_LEN), true)?;
        if buf.len() > MAX_PACKET_LEN {
            return Err(Error::OversizedQuery);
        }

        self.socket.send(&buf).await?;
        Ok(())
    }

    /// Reads one datagram and unpacks it.
    ///
    /// A response with the truncation bit set is returned inside
    /// [`Error::Truncated`] together with whatever records were parsed, so
    /// the caller can use the partial answer or retry over a stream
    /// transport.
    pub async fn recv(&self) -> Result<Message, Error> {
        let mut rbuf = self.rbuf.lock().await;
        let n = self.socket.recv(&mut rbuf).await?;

        let (msg, result) = Message::unpack_partial(&rbuf[..n]);
        match result {
            Ok(_) if msg.truncated => Err(Error::Truncated(Box::new(msg))),
            Ok(_) => Ok(msg),
            // a datagram clipped by our receive buffer still yields the
            // leading records when the sender marked it truncated
            Err(ParseError::RdataLength) | Err(ParseError::UnexpectedEof) if msg.truncated => {
                Err(Error::Truncated(Box::new(msg)))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// A stream-oriented connection to a DNS resolver. Each message is prefixed
/// with its length as a two-byte big-endian integer.
pub struct StreamConn {
    rd: Mutex<ReadHalf<BoxStream>>,
    wr: Mutex<WriteHalf<BoxStream>>,
}

impl std::fmt::Debug for StreamConn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamConn").finish_non_exhaustive()
    }
}

impl StreamConn {
    /// Wraps a byte stream.
    pub fn new<S: AsyncStream + 'static>(stream: S) -> Self {
        let (rd, wr) = tokio::io::split(Box::new(stream) as BoxStream);
        Self {
            rd: Mutex::new(rd),
            wr: Mutex::new(wr),
        }
    }

    /// Writes one length-prefixed message. The write lock is held across the
    /// entire frame so concurrent senders cannot interleave bytes.
    pub async fn send(&self, msg: &Message) -> Result<(), Error> {
        let mut buf = msg.pack(vec![0; 2], true)?;
        let len = buf.len() - 2;
        if len > usize::from(u16::MAX) {
            return Err(Error::OversizedMessage);
        }
        NetworkEndian::write_u16(&mut buf[..2], len as u16);

        let mut wr = self.wr.lock().await;
        wr.write_all(&buf).await?;
        wr.flush().await?;
        Ok(())
    }

    /// Reads one length-prefixed message.
    pub async fn recv(&self) -> Result<Message, Error> {
        let mut rd = self.rd.lock().await;

        let mut lbuf = [0; 2];
        rd.read_exact(&mut lbuf).await?;

        let mut buf = vec![0; usize::from(u16::from_be_bytes(lbuf))];
        rd.read_exact(&mut buf).await?;
        drop(rd);

        let (msg, _) = Message::unpack(&buf)?;
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anilin_proto::rdata::A;
    use anilin_proto::{Class, Question, Rdata, RecordType, Resource};

    use super::*;

    fn test_query(qname: &str) -> Message {
        Message {
            questions: vec![Question {
                qname: qname.to_string(),
                qtype: RecordType::A,
                qclass: Class::IN,
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn stream_conn_round_trip() {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let client = StreamConn::new(client_io);
        let server = StreamConn::new(server_io);

        let req = test_query("example.com.");
        let mut res = req.clone();
        res.response = true;
        res.answers.push(Resource {
            name: "example.com.".to_string(),
            class: Class::IN,
            ttl: Duration::from_secs(60),
            rdata: Rdata::A(A {
                addr: [127, 0, 0, 1].into(),
            }),
        });

        client.send(&req).await.unwrap();
        let got = server.recv().await.unwrap();
        assert_eq!(got, req);

        server.send(&res).await.unwrap();
        let got = client.recv().await.unwrap();
        assert_eq!(got, res);
    }

    #[tokio::test]
    async fn packet_conn_round_trip() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();

        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket.connect(server_addr).await.unwrap();
        let client_addr = socket.local_addr().unwrap();
        let client = PacketConn::new(socket);

        let req = test_query("example.com.");
        client.send(&req).await.unwrap();

        let mut buf = [0; MAX_PACKET_LEN];
        let n = server.recv_from(&mut buf).await.map(|(n, _)| n).unwrap();
        let (got, rest) = Message::unpack(&buf[..n]).unwrap();
        assert!(rest.is_empty());
        assert_eq!(got, req);

        let mut res = req.clone();
        res.response = true;
        let packed = res.pack(Vec::new(), true).unwrap();
        server.send_to(&packed, client_addr).await.unwrap();

        let got = client.recv().await.unwrap();
        assert_eq!(got, res);
    }

    #[tokio::test]
    async fn packet_conn_rejects_oversized_query() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket.connect(target.local_addr().unwrap()).await.unwrap();
        let conn = PacketConn::new(socket);

        // ten maximum-length labels blow well past 512 bytes
        let qname = format!("{}.", "a".repeat(63)).repeat(10);
        let err = conn.send(&test_query(&qname)).await.unwrap_err();
        assert!(matches!(err, Error::OversizedQuery));
    }
}
