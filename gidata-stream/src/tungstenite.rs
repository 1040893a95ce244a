use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use gidata_core::GiDataError;
use gidata_core::socket::{WsConnector, WsSink, WsSource};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn closed(e: &WsError) -> GiDataError {
    GiDataError::StreamClosed(e.to_string())
}

struct TungsteniteSink(SplitSink<Ws, Message>);

#[async_trait]
impl WsSink for TungsteniteSink {
    async fn send_text(&mut self, text: String) -> Result<(), GiDataError> {
        self.0
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| closed(&e))
    }

    async fn close(&mut self) -> Result<(), GiDataError> {
        match self.0.close().await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(closed(&e)),
        }
    }
}

struct TungsteniteSource(SplitStream<Ws>);

#[async_trait]
impl WsSource for TungsteniteSource {
    async fn next_text(&mut self) -> Option<Result<String, GiDataError>> {
        loop {
            match self.0.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => {
                    if let Ok(text) = String::from_utf8(bytes.to_vec()) {
                        return Some(Ok(text));
                    }
                }
                Ok(Message::Close(_)) | Err(WsError::ConnectionClosed) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(closed(&e))),
            }
        }
    }
}

/// [`WsConnector`] over `tokio-tungstenite`.
///
/// The bearer is sent as an `Authorization` header on the upgrade request.
/// `wss://` URLs need the crate's `tls` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl WsConnector for TungsteniteConnector {
    async fn connect(
        &self,
        url: &str,
        bearer: &str,
    ) -> Result<(Box<dyn WsSink>, Box<dyn WsSource>), GiDataError> {
        let mut request = url
            .into_client_request()
            .map_err(|e| GiDataError::invalid_arg(format!("invalid websocket url {url}: {e}")))?;
        let auth = HeaderValue::from_str(&format!("Bearer {bearer}"))
            .map_err(|e| GiDataError::invalid_arg(format!("bearer is not a valid header: {e}")))?;
        request.headers_mut().insert("Authorization", auth);

        let (ws, _) = connect_async(request)
            .await
            .map_err(|e| GiDataError::connection(format!("websocket connect to {url}: {e}")))?;
        let (write, read) = ws.split();
        Ok((
            Box::new(TungsteniteSink(write)),
            Box::new(TungsteniteSource(read)),
        ))
    }
}
