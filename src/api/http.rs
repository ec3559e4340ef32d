//! # HTTP Backend
//!
//! [`StorefrontBackend`] over the hosted REST API. Each call attaches
//! `Authorization: Bearer <token>`, sends and receives JSON, and hands the body to
//! the envelope decoder.

use crate::api::backend::{AuthToken, StorefrontBackend};
use crate::api::envelope::{into_ack, into_result, Payload};
use crate::api::error::{ApiResult, StorefrontError};
use crate::config::StorefrontConfig;
use crate::model::{
    CancelReturn, Eligibility, NewOrder, NewReturnRequest, Order, ReturnRequest, WalletDetails,
    WalletPayment, WalletTransaction,
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &StorefrontConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StorefrontError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    fn request(&self, method: Method, path: &str, auth: &AuthToken) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(auth.expose())
    }

    async fn execute(&self, request: RequestBuilder) -> ApiResult<Value> {
        let response = request.send().await?;
        let status = response.status();
        debug!(%status, "Response received");
        if status == StatusCode::UNAUTHORIZED {
            return Err(StorefrontError::Unauthorized);
        }
        let text = response.text().await?;
        match serde_json::from_str::<Value>(&text) {
            Ok(body) => Ok(body),
            // error pages from proxies are not JSON
            Err(_) if !status.is_success() => {
                warn!(%status, "Non-JSON error response");
                Err(StorefrontError::Backend(format!("Server returned {status}")))
            }
            Err(e) => Err(StorefrontError::Malformed(e.to_string())),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        auth: &AuthToken,
        payload: Payload,
    ) -> ApiResult<T> {
        let body = self.execute(self.request(Method::GET, path, auth)).await?;
        into_result(body, payload)
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        auth: &AuthToken,
        json: &B,
        payload: Payload,
    ) -> ApiResult<T>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let body = self
            .execute(self.request(method, path, auth).json(json))
            .await?;
        into_result(body, payload)
    }
}

#[async_trait]
impl StorefrontBackend for HttpBackend {
    #[instrument(skip(self, auth))]
    async fn user_orders(&self, auth: &AuthToken, user_id: &str) -> ApiResult<Vec<Order>> {
        self.get(&format!("/order/user/{user_id}"), auth, Payload::Field("orders"))
            .await
    }

    #[instrument(skip(self, auth))]
    async fn track_order(&self, auth: &AuthToken, order_id: &str) -> ApiResult<Order> {
        self.get(&format!("/order/track/{order_id}"), auth, Payload::Field("order"))
            .await
    }

    #[instrument(skip(self, auth))]
    async fn return_eligibility(
        &self,
        auth: &AuthToken,
        order_id: &str,
    ) -> ApiResult<Eligibility> {
        self.get(
            &format!("/return-orders/eligibility/{order_id}"),
            auth,
            Payload::Inline,
        )
        .await
    }

    #[instrument(skip(self, auth, request), fields(order_id = %request.order_id))]
    async fn create_return(
        &self,
        auth: &AuthToken,
        request: &NewReturnRequest,
    ) -> ApiResult<ReturnRequest> {
        self.send(
            Method::POST,
            "/return-orders/create",
            auth,
            request,
            Payload::Field("return_request"),
        )
        .await
    }

    #[instrument(skip(self, auth))]
    async fn cancel_return(&self, auth: &AuthToken, request: &CancelReturn) -> ApiResult<()> {
        let body = self
            .execute(
                self.request(Method::PUT, "/return-orders/cancel", auth)
                    .json(request),
            )
            .await?;
        into_ack(body)
    }

    #[instrument(skip(self, auth))]
    async fn user_returns(
        &self,
        auth: &AuthToken,
        user_id: &str,
    ) -> ApiResult<Vec<ReturnRequest>> {
        self.get(
            &format!("/return-orders/user/{user_id}"),
            auth,
            Payload::Field("return_requests"),
        )
        .await
    }

    #[instrument(skip(self, auth, order), fields(total = order.total))]
    async fn create_order(&self, auth: &AuthToken, order: &NewOrder) -> ApiResult<Order> {
        self.send(Method::POST, "/order/create", auth, order, Payload::Field("order"))
            .await
    }

    #[instrument(skip(self, auth))]
    async fn wallet_details(&self, auth: &AuthToken) -> ApiResult<WalletDetails> {
        self.get("/wallet/details", auth, Payload::Field("wallet"))
            .await
    }

    #[instrument(skip(self, auth))]
    async fn wallet_transactions(&self, auth: &AuthToken) -> ApiResult<Vec<WalletTransaction>> {
        self.get("/wallet/transactions", auth, Payload::Field("transactions"))
            .await
    }

    #[instrument(skip(self, auth))]
    async fn wallet_pay(
        &self,
        auth: &AuthToken,
        payment: &WalletPayment,
    ) -> ApiResult<WalletDetails> {
        self.send(Method::POST, "/wallet/pay", auth, payment, Payload::Field("wallet"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BankDetails, ReturnStatus, ReturnType};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves one canned response and hands back the raw request it answered.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (HttpBackend, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (seen, request) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
                    continue;
                };
                let head = String::from_utf8_lossy(&raw[..end]).to_ascii_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= end + 4 + length {
                    break;
                }
            }
            let _ = seen.send(String::from_utf8_lossy(&raw).into_owned());

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        let config = StorefrontConfig {
            api_url: format!("http://{addr}/api"),
            ..StorefrontConfig::default()
        };
        (HttpBackend::new(&config).unwrap(), request)
    }

    fn token() -> AuthToken {
        AuthToken::new("tok")
    }

    #[tokio::test]
    async fn test_user_orders_sends_bearer_and_reads_orders_key() {
        let (backend, request) =
            serve_once("200 OK", "application/json", r#"{"success":true,"orders":[]}"#).await;

        let orders = backend.user_orders(&token(), "user_1").await.unwrap();
        assert!(orders.is_empty());

        let request = request.await.unwrap();
        assert!(request.starts_with("GET /api/order/user/user_1 HTTP/1.1"));
        assert!(request
            .to_ascii_lowercase()
            .contains("authorization: bearer tok\r\n"));
    }

    #[tokio::test]
    async fn test_unauthorized_status_maps_to_unauthorized() {
        let (backend, _request) = serve_once(
            "401 Unauthorized",
            "application/json",
            r#"{"success":false,"error":"jwt expired"}"#,
        )
        .await;

        let result = backend.wallet_details(&token()).await;
        assert_eq!(result, Err(StorefrontError::Unauthorized));
    }

    #[tokio::test]
    async fn test_html_error_page_maps_to_backend_error() {
        let (backend, request) = serve_once(
            "502 Bad Gateway",
            "text/html",
            "<html><body>Bad Gateway</body></html>",
        )
        .await;

        let result = backend.track_order(&token(), "order_9").await;
        assert!(matches!(result, Err(StorefrontError::Backend(msg)) if msg.contains("502")));
        assert!(request.await.unwrap().starts_with("GET /api/order/track/order_9 "));
    }

    #[tokio::test]
    async fn test_failed_envelope_carries_server_message() {
        let (backend, request) = serve_once(
            "400 Bad Request",
            "application/json",
            r#"{"success":false,"error":"Return window has closed"}"#,
        )
        .await;

        let result = backend.return_eligibility(&token(), "order_3").await;
        assert_eq!(
            result,
            Err(StorefrontError::Backend("Return window has closed".into()))
        );
        assert!(request
            .await
            .unwrap()
            .starts_with("GET /api/return-orders/eligibility/order_3 "));
    }

    #[tokio::test]
    async fn test_success_body_that_is_not_json_is_malformed() {
        let (backend, _request) = serve_once("200 OK", "text/plain", "ok").await;

        let result = backend.wallet_transactions(&token()).await;
        assert!(matches!(result, Err(StorefrontError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_create_return_posts_json_body() {
        let (backend, request) = serve_once(
            "201 Created",
            "application/json",
            r#"{"success":true,"return_request":{"id":"return_1","order_id":"order_3","status":"pending","return_type":"return","refund_amount":450.0}}"#,
        )
        .await;
        let new_request = NewReturnRequest {
            order_id: "order_3".into(),
            return_type: ReturnType::Return,
            reason: "Damaged".into(),
            description: None,
            bank_details: Some(BankDetails {
                account_holder_name: "Asha Rao".into(),
                account_number: "123456789012".into(),
                ifsc_code: "HDFC0001234".into(),
                bank_name: None,
            }),
        };

        let created = backend.create_return(&token(), &new_request).await.unwrap();
        assert_eq!(created.id, "return_1");
        assert_eq!(created.status, ReturnStatus::Pending);

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /api/return-orders/create "));
        assert!(request.contains(r#""account_number":"123456789012""#));
    }

    #[tokio::test]
    async fn test_cancel_return_uses_put() {
        let (backend, request) =
            serve_once("200 OK", "application/json", r#"{"success":true}"#).await;

        let cancel = CancelReturn {
            return_request_id: "return_4".into(),
        };
        backend.cancel_return(&token(), &cancel).await.unwrap();

        let request = request.await.unwrap();
        assert!(request.starts_with("PUT /api/return-orders/cancel "));
        assert!(request.contains(r#""return_request_id":"return_4""#));
    }
}
