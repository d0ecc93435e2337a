use lazy_static::lazy_static;
use solana_client::rpc_client::RpcClient;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A thread-safe pool of RPC clients keyed by endpoint.
///
/// Clients are handed out for the duration of one call and returned for
/// reuse, so repeated queries against the same endpoint do not pay connection
/// setup every time.
pub struct RpcConnectionPool {
    clients: Mutex<HashMap<String, VecDeque<RpcClient>>>,
    max_clients_per_endpoint: usize,
    timeout: Duration,
}

impl RpcConnectionPool {
    pub fn new(max_clients_per_endpoint: usize, timeout: Duration) -> Self {
        Self { clients: Mutex::new(HashMap::new()), max_clients_per_endpoint, timeout }
    }

    /// Take a client for the endpoint, creating one if the pool is empty.
    pub fn get_client(&self, endpoint: &str) -> RpcClient {
        let mut clients = self.clients.lock().unwrap();
        if let Some(pooled) = clients.get_mut(endpoint).and_then(|queue| queue.pop_front()) {
            return pooled;
        }
        RpcClient::new_with_timeout(endpoint.to_string(), self.timeout)
    }

    /// Return a client for future reuse. Dropped when the endpoint already
    /// holds the maximum number of idle clients.
    pub fn return_client(&self, endpoint: &str, client: RpcClient) {
        let mut clients = self.clients.lock().unwrap();
        let queue = clients.entry(endpoint.to_string()).or_default();
        if queue.len() < self.max_clients_per_endpoint {
            queue.push_back(client);
        }
    }
}

lazy_static! {
    pub static ref CONNECTION_POOL: RpcConnectionPool = RpcConnectionPool::new(
        5, // idle clients kept per endpoint
        Duration::from_secs(30),
    );
}

/// Run `f` with a pooled client and return the client to the pool afterwards.
pub fn with_rpc_client<F, R>(endpoint: &str, f: F) -> R
where
    F: FnOnce(&RpcClient) -> R,
{
    let client = CONNECTION_POOL.get_client(endpoint);
    let result = f(&client);
    CONNECTION_POOL.return_client(endpoint, client);
    result
}
