use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;

use flex_dividends::FlexError;
use flex_dividends::dividends::normalize;
use flex_dividends::flex::{FlexClient, FlexToken, HttpTransport, PollSettings};

const TOKEN: &str = "123456789012345678901234";
const STATEMENT: &str = r#"<FlexQueryResponse queryName="Daily Dividends" type="AF">
    <FlexStatements count="1">
        <FlexStatement accountId="U1234567" fromDate="20250801" toDate="20250801">
            <ChangeInDividendAccruals>
                <ChangeInDividendAccrual currency="USD" fxRateToBase="0.9" symbol="KO" description="COCA-COLA CO/THE" date="20250801" exDate="20250613" payDate="20250801" tax="-1.91" fee="0" grossAmount="-12.75" netAmount="-10.84" />
            </ChangeInDividendAccruals>
        </FlexStatement>
    </FlexStatements>
</FlexQueryResponse>"#;

#[derive(Clone, Default)]
struct FakeFlex {
    submit_calls: Arc<AtomicUsize>,
    statement_calls: Arc<AtomicUsize>,
    /// GetStatement answers "in progress" this many times before the statement.
    in_progress: usize,
    reject_submit: bool,
    statement_status: Option<StatusCode>,
}

async fn send_request(
    State(fake): State<FakeFlex>,
    Query(params): Query<HashMap<String, String>>,
) -> String {
    fake.submit_calls.fetch_add(1, Ordering::SeqCst);

    if fake.reject_submit || params.get("t").map(String::as_str) != Some(TOKEN) {
        return "<FlexStatementResponse><Status>Fail</Status><ErrorCode>1012</ErrorCode>\
                <ErrorMessage>Token has expired.</ErrorMessage></FlexStatementResponse>"
            .to_string();
    }

    let query_id = params.get("q").cloned().unwrap_or_default();
    let version = params.get("v").cloned().unwrap_or_default();
    format!(
        "<FlexStatementResponse><Status>Success</Status>\
         <ReferenceCode>REF-{query_id}-v{version}</ReferenceCode></FlexStatementResponse>"
    )
}

async fn get_statement(
    State(fake): State<FakeFlex>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let call = fake.statement_calls.fetch_add(1, Ordering::SeqCst);

    if let Some(status) = fake.statement_status {
        return (status, "upstream unavailable".to_string());
    }

    if params.get("q").map(String::as_str) != Some("REF-777-v3") {
        return (
            StatusCode::OK,
            "<FlexStatementResponse><Status>Fail</Status>\
             <ErrorMessage>Invalid reference code.</ErrorMessage></FlexStatementResponse>"
                .to_string(),
        );
    }

    if call < fake.in_progress {
        return (
            StatusCode::OK,
            "<FlexStatementResponse><Status>Warn</Status><ErrorCode>1019</ErrorCode>\
             <ErrorMessage>Statement generation in progress. Please try again shortly.\
             </ErrorMessage></FlexStatementResponse>"
                .to_string(),
        );
    }

    (StatusCode::OK, STATEMENT.to_string())
}

async fn serve(fake: FakeFlex) -> SocketAddr {
    let app = Router::new()
        .route(
            "/Universal/servlet/FlexStatementService.SendRequest",
            get(send_request),
        )
        .route(
            "/Universal/servlet/FlexStatementService.GetStatement",
            get(get_statement),
        )
        .with_state(fake);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, max_attempts: u32) -> FlexClient {
    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    FlexClient::new(Arc::new(transport), FlexToken::new(TOKEN))
        .with_base_url(&format!("http://{addr}/Universal/servlet"))
        .with_poll_settings(PollSettings {
            max_attempts,
            backoff: Duration::from_millis(20),
        })
}

#[tokio::test]
async fn test_execute_query_waits_for_statement() {
    let fake = FakeFlex {
        in_progress: 2,
        ..Default::default()
    };
    let addr = serve(fake.clone()).await;

    let statement = client(addr, 30).execute_query("777").await.unwrap();

    assert_eq!(statement.as_str(), STATEMENT);
    assert_eq!(fake.submit_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fake.statement_calls.load(Ordering::SeqCst), 3);

    let dividends = normalize(&statement).unwrap();
    assert_eq!(dividends.len(), 1);
    assert_eq!(dividends[0].symbol, "KO");
    assert_eq!(dividends[0].gross_amount, 12.75);
}

#[tokio::test]
async fn test_rejected_submit_never_polls() {
    let fake = FakeFlex {
        reject_submit: true,
        ..Default::default()
    };
    let addr = serve(fake.clone()).await;

    let err = client(addr, 30).execute_query("777").await.unwrap_err();

    assert_eq!(err, FlexError::Server("Token has expired.".into()));
    assert_eq!(fake.statement_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_http_error_status_is_transport_error() {
    let fake = FakeFlex {
        statement_status: Some(StatusCode::SERVICE_UNAVAILABLE),
        ..Default::default()
    };
    let addr = serve(fake.clone()).await;

    let err = client(addr, 30).execute_query("777").await.unwrap_err();

    assert!(matches!(err, FlexError::Transport(_)));
    assert_eq!(fake.statement_calls.load(Ordering::SeqCst), 1);
    assert!(!err.to_string().contains(TOKEN));
}

#[tokio::test]
async fn test_statement_never_ready_times_out() {
    let fake = FakeFlex {
        in_progress: usize::MAX,
        ..Default::default()
    };
    let addr = serve(fake.clone()).await;

    let err = client(addr, 3).execute_query("777").await.unwrap_err();

    assert_eq!(err, FlexError::Timeout { attempts: 3 });
    assert_eq!(fake.statement_calls.load(Ordering::SeqCst), 3);
}
