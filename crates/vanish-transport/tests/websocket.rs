//! Integration tests for the WebSocket connector.
//!
//! These tests spin up a real WebSocket server on a random local port and
//! dial it with [`WebSocketConnector`], verifying that text frames flow in
//! both directions and that a server-side close is reported as `Ok(None)`.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;
    use vanish_transport::{Connection, Connector, TransportError, WebSocketConnector};

    type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Helper: binds a listener on an OS-assigned port and returns it with
    /// the `ws://` URL clients should dial.
    async fn bind() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("should bind");
        let addr = listener.local_addr().expect("should have local addr");
        (listener, format!("ws://{addr}/ws/player_1"))
    }

    /// Helper: accepts one WebSocket client on the listener.
    async fn accept(listener: TcpListener) -> ServerWs {
        let (stream, _) = listener.accept().await.expect("should accept");
        tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake should succeed")
    }

    #[tokio::test]
    async fn test_websocket_connect_and_exchange_text_frames() {
        let (listener, url) = bind().await;
        let server = tokio::spawn(accept(listener));

        let conn = WebSocketConnector
            .connect(&url)
            .await
            .expect("client should connect");
        let mut server_ws = server.await.expect("task should complete");

        assert!(conn.id().into_inner() > 0);

        // --- Server sends, client receives ---
        server_ws
            .send(Message::Text(r#"{"type":"waiting","message":"hi"}"#.into()))
            .await
            .unwrap();
        let received = conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have a frame");
        assert_eq!(received, r#"{"type":"waiting","message":"hi"}"#);

        // --- Client sends, server receives a *text* frame ---
        conn.send(r#"{"type":"join_queue"}"#)
            .await
            .expect("send should succeed");
        let msg = server_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "client frames must be text, got {msg:?}");
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"type":"join_queue"}"#);

        conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_server_close() {
        let (listener, url) = bind().await;
        let server = tokio::spawn(accept(listener));

        let conn = WebSocketConnector.connect(&url).await.unwrap();
        let mut server_ws = server.await.unwrap();

        server_ws.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on server close");
    }

    #[tokio::test]
    async fn test_websocket_binary_frame_is_delivered_as_text() {
        let (listener, url) = bind().await;
        let server = tokio::spawn(accept(listener));

        let conn = WebSocketConnector.connect(&url).await.unwrap();
        let mut server_ws = server.await.unwrap();

        server_ws
            .send(Message::Binary(b"{\"type\":\"error\",\"message\":\"x\"}".to_vec().into()))
            .await
            .unwrap();

        let received = conn.recv().await.unwrap().unwrap();
        assert_eq!(received, "{\"type\":\"error\",\"message\":\"x\"}");
    }

    #[tokio::test]
    async fn test_websocket_wss_dial_starts_tls_handshake() {
        use tokio::io::AsyncReadExt;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut first = [0u8; 1];
            stream.read_exact(&mut first).await.unwrap();
            // Hang up without answering the handshake.
            first[0]
        });

        let result = WebSocketConnector
            .connect(&format!("wss://{addr}/ws/player_1"))
            .await;

        // 0x16 is the TLS handshake record type of a ClientHello.
        assert_eq!(server.await.unwrap(), 0x16, "client should speak TLS");
        match result {
            Err(TransportError::ConnectFailed { reason, .. }) => {
                assert!(!reason.contains("not compiled"), "got: {reason}");
            }
            Err(other) => panic!("expected ConnectFailed, got {other:?}"),
            Ok(_) => panic!("a plain TCP peer can't complete a TLS handshake"),
        }
    }

    #[tokio::test]
    async fn test_websocket_connect_refused_returns_connect_failed() {
        // Bind then drop to get a port nobody is listening on.
        let (listener, url) = bind().await;
        drop(listener);

        let result = WebSocketConnector.connect(&url).await;

        assert!(
            matches!(result, Err(TransportError::ConnectFailed { .. })),
            "dialing a closed port should fail"
        );
    }
}
