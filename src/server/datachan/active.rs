//! Active mode data connections: decoding the `PORT` argument and connecting out to the client.
//
// RFC 959: the argument is the concatenation of a 32-bit internet host address and a 16-bit TCP
// port address. This address information is broken into 8-bit fields and the value of each
// field is transmitted as a decimal number (in character string representation). The fields are
// separated by commas.
//
// PORT h1,h2,h3,h4,p1,p2

use super::error::{DataChanError, DataChanErrorKind};
use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    str::FromStr,
    time::Duration,
};
use tokio::net::TcpStream;

/// A decoded `PORT` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataConnectionRequest {
    endpoint: SocketAddrV4,
}

impl DataConnectionRequest {
    pub fn endpoint(&self) -> SocketAddr {
        SocketAddr::V4(self.endpoint)
    }
}

impl FromStr for DataConnectionRequest {
    type Err = DataChanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s
            .split(',')
            .map(|f| f.trim().parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|e| DataChanError::new(DataChanErrorKind::InvalidHostPort, e))?;
        match fields[..] {
            [h1, h2, h3, h4, p1, p2] => Ok(DataConnectionRequest {
                endpoint: SocketAddrV4::new(Ipv4Addr::new(h1, h2, h3, h4), (u16::from(p1) << 8) | u16::from(p2)),
            }),
            _ => Err(DataChanErrorKind::InvalidHostPort.into()),
        }
    }
}

/// An established connection to the client that waits for the next `LIST` or `RETR`.
#[derive(Debug)]
pub struct PendingDataConnection {
    pub endpoint: SocketAddr,
    pub stream: TcpStream,
}

/// Connects to the endpoint the client asked for, giving up after `timeout`. There are no
/// retries.
#[tracing_attributes::instrument]
pub async fn connect(request: DataConnectionRequest, timeout: Duration) -> Result<PendingDataConnection, DataChanError> {
    let endpoint = request.endpoint();
    match tokio::time::timeout(timeout, TcpStream::connect(endpoint)).await {
        Err(elapsed) => Err(DataChanError::new(DataChanErrorKind::ConnectTimeout, elapsed)),
        Ok(Err(err)) => Err(DataChanError::new(DataChanErrorKind::ConnectFailed, err)),
        Ok(Ok(stream)) => Ok(PendingDataConnection { endpoint, stream }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::net::TcpListener;

    fn decode(s: &str) -> Result<DataConnectionRequest, DataChanErrorKind> {
        s.parse::<DataConnectionRequest>().map_err(|e| e.kind())
    }

    #[test]
    fn decodes_host_and_port() {
        let req = decode("127,0,0,1,4,1").unwrap();
        assert_eq!(req.endpoint(), "127.0.0.1:1025".parse::<SocketAddr>().unwrap());

        let req = decode("192,168,1,20,255,255").unwrap();
        assert_eq!(req.endpoint(), "192.168.1.20:65535".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn tolerates_blanks_around_fields() {
        let req = decode("10, 0, 0, 7, 0, 21").unwrap();
        assert_eq!(req.endpoint(), "10.0.0.7:21".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(decode("127,0,0,1,4"), Err(DataChanErrorKind::InvalidHostPort));
        assert_eq!(decode("127,0,0,1,4,1,9"), Err(DataChanErrorKind::InvalidHostPort));
    }

    #[test]
    fn rejects_bad_fields() {
        assert_eq!(decode("127,0,0,x,4,1"), Err(DataChanErrorKind::InvalidHostPort));
        assert_eq!(decode("300,0,0,1,4,1"), Err(DataChanErrorKind::InvalidHostPort));
        assert_eq!(decode("127,0,0,1,4,-1"), Err(DataChanErrorKind::InvalidHostPort));
        assert_eq!(decode(""), Err(DataChanErrorKind::InvalidHostPort));
    }

    #[tokio::test]
    async fn connects_to_a_listening_client() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let req = decode(&format!("127,0,0,1,{},{}", port >> 8, port & 0xff)).unwrap();

        let pending = connect(req, Duration::from_secs(5)).await.unwrap();
        let (_, peer) = listener.accept().await.unwrap();

        assert_eq!(pending.endpoint.port(), port);
        assert_eq!(peer, pending.stream.local_addr().unwrap());
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let req = decode(&format!("127,0,0,1,{},{}", port >> 8, port & 0xff)).unwrap();

        let err = connect(req, Duration::from_secs(5)).await.unwrap_err();
        assert_eq!(err.kind(), DataChanErrorKind::ConnectFailed);
    }
}
