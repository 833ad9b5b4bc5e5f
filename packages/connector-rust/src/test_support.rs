//! Recording mock pool and naming client shared by the unit tests.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use discovery_core::messages::{Client, ClientReply, Instance, InstanceReply};
use discovery_core::{ClientInfo, ClusterType, ConnectionId, ErrorCode, OpKey};
use parking_lot::Mutex;

use crate::service::correlator::RequestContext;
use crate::traits::{ConnectionManager, NamingClient, PoolError, PooledConnection, TransportError};

/// A health signal as received by the mock pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Success {
        conn_id: ConnectionId,
        code: ErrorCode,
        elapsed: Duration,
    },
    Fail {
        conn_id: ConnectionId,
        code: ErrorCode,
        elapsed: Duration,
    },
}

impl Signal {
    pub fn is_fail(&self) -> bool {
        matches!(self, Signal::Fail { .. })
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Signal::Success { code, .. } | Signal::Fail { code, .. } => *code,
        }
    }
}

/// How the mock client answers the next calls.
#[derive(Debug, Clone)]
pub enum Script {
    Reply { code: u32, info: String },
    TransportFail,
    Hang,
    Panic,
}

/// One call observed by the mock client.
#[derive(Debug, Clone)]
pub struct Call {
    pub op_key: OpKey,
    pub ctx: RequestContext,
    pub instance: Option<Instance>,
    pub client: Option<Client>,
}

#[derive(Default)]
struct PoolState {
    acquire_requests: Vec<(OpKey, ClusterType)>,
    released: Vec<OpKey>,
    signals: Vec<Signal>,
}

pub struct MockClient {
    script: Mutex<Script>,
    instance_id: Mutex<String>,
    echo_client: Mutex<Option<Client>>,
    reply_delay: Mutex<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl MockClient {
    fn new() -> Self {
        Self {
            script: Mutex::new(Script::Reply {
                code: discovery_core::result_code::EXECUTE_SUCCESS,
                info: "execute success".to_string(),
            }),
            instance_id: Mutex::new("ins-1".to_string()),
            echo_client: Mutex::new(None),
            reply_delay: Mutex::new(Duration::ZERO),
            calls: Mutex::new(Vec::new()),
        }
    }

    async fn answer(&self, call: Call) -> Result<(u32, String), TransportError> {
        let script = self.script.lock().clone();
        let delay = *self.reply_delay.lock();
        self.calls.lock().push(call);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match script {
            Script::Reply { code, info } => Ok((code, info)),
            Script::TransportFail => Err(TransportError::Unavailable("connection reset".into())),
            Script::Hang => std::future::pending().await,
            Script::Panic => panic!("transport exploded"),
        }
    }

    fn instance_reply(&self, (code, info): (u32, String)) -> InstanceReply {
        InstanceReply {
            code,
            info,
            instance: Some(Instance {
                id: Some(self.instance_id.lock().clone()),
                ..Instance::default()
            }),
        }
    }
}

#[async_trait]
impl NamingClient for MockClient {
    async fn register_instance(
        &self,
        ctx: &RequestContext,
        request: Instance,
    ) -> Result<InstanceReply, TransportError> {
        let call = Call {
            op_key: OpKey::RegisterInstance,
            ctx: ctx.clone(),
            instance: Some(request),
            client: None,
        };
        let answer = self.answer(call).await?;
        Ok(self.instance_reply(answer))
    }

    async fn deregister_instance(
        &self,
        ctx: &RequestContext,
        request: Instance,
    ) -> Result<InstanceReply, TransportError> {
        let call = Call {
            op_key: OpKey::DeregisterInstance,
            ctx: ctx.clone(),
            instance: Some(request),
            client: None,
        };
        let answer = self.answer(call).await?;
        Ok(self.instance_reply(answer))
    }

    async fn heartbeat(
        &self,
        ctx: &RequestContext,
        request: Instance,
    ) -> Result<InstanceReply, TransportError> {
        let call = Call {
            op_key: OpKey::InstanceHeartbeat,
            ctx: ctx.clone(),
            instance: Some(request),
            client: None,
        };
        let answer = self.answer(call).await?;
        Ok(self.instance_reply(answer))
    }

    async fn report_client(
        &self,
        ctx: &RequestContext,
        request: Client,
    ) -> Result<ClientReply, TransportError> {
        let call = Call {
            op_key: OpKey::ReportClient,
            ctx: ctx.clone(),
            instance: None,
            client: Some(request),
        };
        let (code, info) = self.answer(call).await?;
        Ok(ClientReply {
            code,
            info,
            client: self.echo_client.lock().clone(),
        })
    }
}

struct MockConnection {
    id: ConnectionId,
    client: Arc<MockClient>,
    state: Arc<Mutex<PoolState>>,
}

impl PooledConnection for MockConnection {
    fn id(&self) -> &ConnectionId {
        &self.id
    }

    fn client(&self) -> &dyn NamingClient {
        self.client.as_ref()
    }

    fn release(&self, op_key: OpKey) {
        self.state.lock().released.push(op_key);
    }
}

/// Connection pool double that hands out a single scripted connection.
pub struct MockPool {
    ready: AtomicBool,
    fail_acquire: AtomicBool,
    ready_polls: AtomicUsize,
    local_address: Mutex<Option<IpAddr>>,
    client: Arc<MockClient>,
    state: Arc<Mutex<PoolState>>,
}

impl MockPool {
    pub fn ready() -> Self {
        let pool = Self::not_ready();
        pool.set_ready(true);
        pool
    }

    pub fn not_ready() -> Self {
        Self {
            ready: AtomicBool::new(false),
            fail_acquire: AtomicBool::new(false),
            ready_polls: AtomicUsize::new(0),
            local_address: Mutex::new(Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)))),
            client: Arc::new(MockClient::new()),
            state: Arc::new(Mutex::new(PoolState::default())),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn fail_acquire(&self) {
        self.fail_acquire.store(true, Ordering::SeqCst);
    }

    pub fn script(&self, script: Script) {
        *self.client.script.lock() = script;
    }

    /// Answer every call with `code`.
    pub fn reply(&self, code: u32, info: &str) {
        self.script(Script::Reply {
            code,
            info: info.to_string(),
        });
    }

    pub fn set_instance_id(&self, id: &str) {
        *self.client.instance_id.lock() = id.to_string();
    }

    /// Local address reported through `client_info`; `None` means unknown.
    pub fn set_local_address(&self, address: Option<IpAddr>) {
        *self.local_address.lock() = address;
    }

    /// Delays every transport answer by `delay`.
    pub fn set_reply_delay(&self, delay: Duration) {
        *self.client.reply_delay.lock() = delay;
    }

    pub fn set_echo_client(&self, client: Client) {
        *self.client.echo_client.lock() = Some(client);
    }

    pub fn ready_polls(&self) -> usize {
        self.ready_polls.load(Ordering::SeqCst)
    }

    pub fn acquire_requests(&self) -> Vec<(OpKey, ClusterType)> {
        self.state.lock().acquire_requests.clone()
    }

    pub fn acquired(&self) -> usize {
        self.state.lock().acquire_requests.len()
    }

    pub fn released(&self) -> usize {
        self.state.lock().released.len()
    }

    pub fn released_op_keys(&self) -> Vec<OpKey> {
        self.state.lock().released.clone()
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.state.lock().signals.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.client.calls.lock().clone()
    }
}

#[async_trait]
impl ConnectionManager for MockPool {
    async fn get_connection(
        &self,
        op_key: OpKey,
        cluster: ClusterType,
    ) -> Result<Arc<dyn PooledConnection>, PoolError> {
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(PoolError::Exhausted { cluster });
        }
        self.state.lock().acquire_requests.push((op_key, cluster));
        Ok(Arc::new(MockConnection {
            id: ConnectionId::new("conn-1"),
            client: Arc::clone(&self.client),
            state: Arc::clone(&self.state),
        }))
    }

    fn report_success(&self, conn_id: &ConnectionId, code: ErrorCode, elapsed: Duration) {
        self.state.lock().signals.push(Signal::Success {
            conn_id: conn_id.clone(),
            code,
            elapsed,
        });
    }

    fn report_fail(&self, conn_id: &ConnectionId, code: ErrorCode, elapsed: Duration) {
        self.state.lock().signals.push(Signal::Fail {
            conn_id: conn_id.clone(),
            code,
            elapsed,
        });
    }

    fn is_ready(&self) -> bool {
        self.ready_polls.fetch_add(1, Ordering::SeqCst);
        self.ready.load(Ordering::SeqCst)
    }

    fn client_info(&self) -> ClientInfo {
        ClientInfo {
            local_address: *self.local_address.lock(),
        }
    }
}
