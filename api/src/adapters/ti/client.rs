//! TI backlog API client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use urlencoding::encode;

use super::token::TokenProvider;
use crate::domain::ports::{
    TiAsn, TiClient, TiInvoice, TiOrder, TiOrderRequest, TiQuote, TiQuoteRequest,
    TiRemittanceAck, TiRemittanceRequest,
};
use crate::error::TiError;

/// Implementation of the TI backlog API client
pub struct TiClientImpl {
    http: Client,
    base_url: String,
    tokens: TokenProvider,
}

impl TiClientImpl {
    pub fn new(
        base_url: String,
        token_url: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        let http = Client::new();
        Self {
            tokens: TokenProvider::new(http.clone(), token_url, client_id, client_secret),
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v2/backlog{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, resource: &str) -> Result<T, TiError> {
        let token = self.tokens.token().await?;
        tracing::debug!(path, "GET from TI");
        let response = self
            .http
            .get(self.api_url(path))
            .bearer_auth(token)
            .send()
            .await?;
        self.handle_response(response, resource).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        resource: &str,
    ) -> Result<T, TiError> {
        let token = self.tokens.token().await?;
        tracing::debug!(path, "POST to TI");
        let response = self
            .http
            .post(self.api_url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        self.handle_response(response, resource).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T, TiError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| TiError::Deserialization(e.to_string()))
        } else if status.as_u16() == 401 {
            // the next call fetches a fresh token
            self.tokens.invalidate().await;
            Err(TiError::Unauthorized)
        } else if status.as_u16() == 404 {
            Err(TiError::NotFound(resource.to_string()))
        } else if status.as_u16() == 429 {
            Err(TiError::RateLimited)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(TiError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Financial documents come back either bare or wrapped
#[derive(Deserialize)]
#[serde(untagged)]
enum FinancialDocumentsResponse {
    List(Vec<TiInvoice>),
    Wrapped {
        #[serde(rename = "financialDocuments", default)]
        financial_documents: Vec<TiInvoice>,
    },
}

impl From<FinancialDocumentsResponse> for Vec<TiInvoice> {
    fn from(response: FinancialDocumentsResponse) -> Self {
        match response {
            FinancialDocumentsResponse::List(invoices) => invoices,
            FinancialDocumentsResponse::Wrapped {
                financial_documents,
            } => financial_documents,
        }
    }
}

#[async_trait]
impl TiClient for TiClientImpl {
    async fn create_quote(&self, request: &TiQuoteRequest) -> Result<TiQuote, TiError> {
        self.post("/quotes", request, "quote").await
    }

    async fn get_quote(&self, quote_number: &str) -> Result<TiQuote, TiError> {
        self.get(
            &format!("/quotes/{}", encode(quote_number)),
            &format!("quote {}", quote_number),
        )
        .await
    }

    async fn create_order(&self, request: &TiOrderRequest) -> Result<TiOrder, TiError> {
        self.post("/orders", request, "order").await
    }

    async fn get_order(&self, order_number: &str) -> Result<TiOrder, TiError> {
        self.get(
            &format!("/orders/{}", encode(order_number)),
            &format!("order {}", order_number),
        )
        .await
    }

    async fn get_asn(&self, order_number: &str) -> Result<TiAsn, TiError> {
        self.get(
            &format!("/advanced-ship-notices/{}", encode(order_number)),
            &format!("ship notices for order {}", order_number),
        )
        .await
    }

    async fn get_invoices(&self, order_number: &str) -> Result<Vec<TiInvoice>, TiError> {
        let response: FinancialDocumentsResponse = self
            .get(
                &format!("/financial-documents/{}", encode(order_number)),
                &format!("financial documents for order {}", order_number),
            )
            .await?;
        Ok(response.into())
    }

    async fn submit_remittance(
        &self,
        request: &TiRemittanceRequest,
    ) -> Result<TiRemittanceAck, TiError> {
        self.post("/remittance-notifications", request, "remittance notification")
            .await
    }
}
