//! Test utilities for saldo-core
//!
//! Fixture builders for accounts, transactions and snapshots, plus a mock
//! OpenAI-compatible server for exercising the HTTP backend end to end.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, Mutex};

use crate::ai::{AIBackend, MockBackend};
use crate::models::{
    Account, AccountType, Currency, RecurringPayment, Transaction, TransactionType,
};
use crate::snapshot::Snapshot;

/// Transaction at noon UTC on the given day
pub fn transaction(
    id: &str,
    account_id: &str,
    date: NaiveDate,
    description: &str,
    amount: f64,
    currency: Currency,
    transaction_type: TransactionType,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        account_id: account_id.to_string(),
        date: Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap()),
        description: description.to_string(),
        amount,
        currency,
        transaction_type,
        category_id: None,
        note: None,
    }
}

/// Credit card with a cut day and due offset
pub fn credit_card(id: &str, name: &str, cut_day: u32, due_days_offset: u32) -> Account {
    Account {
        id: id.to_string(),
        name: name.to_string(),
        bank: "Banco Popular".to_string(),
        account_type: AccountType::Credit,
        currency_primary: Currency::Dop,
        balance_primary: 12_500.0,
        currency_secondary: Some(Currency::Usd),
        balance_secondary: Some(80.0),
        cut_day: Some(cut_day),
        due_days_offset: Some(due_days_offset),
        limit_primary: Some(100_000.0),
        notes: None,
    }
}

pub fn recurring_payment(id: &str, name: &str, day: u32, amount: f64, currency: Currency) -> RecurringPayment {
    RecurringPayment {
        id: id.to_string(),
        name: name.to_string(),
        day,
        amount,
        currency,
        category_id: None,
        bank: None,
        active: true,
    }
}

/// A small household: one credit card, a monthly Netflix charge, a card payment,
/// groceries and a declared gym membership.
pub fn sample_snapshot() -> Snapshot {
    let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();

    let transactions = vec![
        transaction("t1", "visa", d(2025, 1, 5), "Netflix", 299.0, Currency::Dop, TransactionType::Charge),
        transaction("t2", "visa", d(2025, 2, 5), "NETFLIX", 299.0, Currency::Dop, TransactionType::Charge),
        transaction("t3", "visa", d(2025, 3, 5), "Netflix ", 299.0, Currency::Dop, TransactionType::Charge),
        transaction("t4", "visa", d(2025, 1, 12), "Supermercado Nacional", 4_350.0, Currency::Dop, TransactionType::Charge),
        transaction("t5", "visa", d(2025, 2, 19), "Supermercado Bravo", 3_980.0, Currency::Dop, TransactionType::Charge),
        transaction("t6", "visa", d(2025, 3, 4), "Pago tarjeta", 12_500.0, Currency::Dop, TransactionType::Payment),
        transaction("t7", "visa", d(2025, 3, 10), "Gimnasio", 1_500.0, Currency::Dop, TransactionType::Charge),
    ];

    Snapshot {
        accounts: vec![credit_card("visa", "Visa Gold", 15, 17)],
        transactions,
        recurring_payments: vec![recurring_payment("gym", "Gimnasio", 10, 1_500.0, Currency::Dop)],
    }
}

/// Mock OpenAI-compatible server for testing and development
///
/// Answers `/v1/chat/completions` with a fixed reply, or with `MockBackend`'s
/// prompt-driven replies when none is configured. Records the last
/// `Authorization` header it saw.
pub struct MockOpenAIServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

#[derive(Default)]
struct ServerState {
    reply: Option<String>,
    last_authorization: Mutex<Option<String>>,
    last_model: Mutex<Option<String>>,
}

impl MockOpenAIServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with_state(ServerState::default()).await
    }

    /// Start a server that replies with `reply` to every completion
    pub async fn start_with_reply(reply: &str) -> Self {
        Self::start_with_state(ServerState {
            reply: Some(reply.to_string()),
            ..Default::default()
        })
        .await
    }

    async fn start_with_state(state: ServerState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat_completion))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().await.clone()
    }

    pub async fn last_model(&self) -> Option<String> {
        self.state.last_model.lock().await.clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOpenAIServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        object: "list".to_string(),
        data: vec![ModelInfo {
            id: "gpt-4o-mini".to_string(),
            object: "model".to_string(),
        }],
    })
}

async fn handle_chat_completion(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    *state.last_authorization.lock().await = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_model.lock().await = Some(request.model.clone());

    let prompt = request
        .messages
        .last()
        .map(|m| m.content.as_str())
        .unwrap_or_default();

    let content = match &state.reply {
        Some(reply) => reply.clone(),
        None => MockBackend::new().complete(prompt).await.unwrap(),
    };

    Json(ChatResponse {
        id: "chatcmpl-mock".to_string(),
        object: "chat.completion".to_string(),
        model: request.model,
        choices: vec![ChatChoice {
            index: 0,
            message: ChatMessage {
                role: "assistant".to_string(),
                content,
            },
            finish_reason: "stop".to_string(),
        }],
    })
}

#[derive(Serialize)]
struct ModelsResponse {
    object: String,
    data: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct ModelInfo {
    id: String,
    object: String,
}

#[derive(Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatResponse {
    id: String,
    object: String,
    model: String,
    choices: Vec<ChatChoice>,
}

#[derive(Serialize)]
struct ChatChoice {
    index: u32,
    message: ChatMessage,
    finish_reason: String,
}
