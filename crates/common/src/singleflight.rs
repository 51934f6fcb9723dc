//! Singleflight 并发合并
//!
//! 同一个 key 的并发调用只执行一次实际操作，其余调用者等待同一结果。
//! 只保存进行中的调用标记，不缓存已完成的结果。

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// 领头调用在产出结果前被取消
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("in-flight call was abandoned before completion")]
pub struct Abandoned;

type Calls<V> = Mutex<HashMap<String, broadcast::Sender<V>>>;

/// Singleflight 组
#[derive(Clone)]
pub struct SingleflightGroup<V> {
    calls: Arc<Calls<V>>,
}

enum Role<V> {
    Leader(broadcast::Sender<V>),
    Follower(broadcast::Receiver<V>),
}

impl<V: Clone + Send + 'static> SingleflightGroup<V> {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 执行操作，如果已有相同 key 的操作在进行中，则等待其结果
    ///
    /// 领头调用被丢弃时，等待者收到 [`Abandoned`]
    pub async fn work<F, Fut>(&self, key: &str, f: F) -> Result<V, Abandoned>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let role = {
            let mut calls = lock(&self.calls);
            match calls.get(key) {
                Some(tx) => Role::Follower(tx.subscribe()),
                None => {
                    let (tx, _) = broadcast::channel(1);
                    calls.insert(key.to_string(), tx.clone());
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Follower(mut rx) => {
                debug!("Joining in-flight call");
                rx.recv().await.map_err(|_| Abandoned)
            }
            Role::Leader(tx) => {
                let flight = InFlight {
                    calls: &self.calls,
                    key,
                    tx: Some(tx),
                };
                let value = f().await;
                flight.complete(value.clone());
                Ok(value)
            }
        }
    }

    /// 当前进行中的 key 数量
    pub fn in_flight(&self) -> usize {
        lock(&self.calls).len()
    }
}

impl<V: Clone + Send + 'static> Default for SingleflightGroup<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<V>(calls: &Calls<V>) -> MutexGuard<'_, HashMap<String, broadcast::Sender<V>>> {
    calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 领头调用的进行中标记，完成或被丢弃时从组中移除
struct InFlight<'a, V> {
    calls: &'a Calls<V>,
    key: &'a str,
    tx: Option<broadcast::Sender<V>>,
}

impl<V> InFlight<'_, V> {
    fn complete(mut self, value: V) {
        if let Some(tx) = self.tx.take() {
            // 先移除标记再广播：移除之后到达的调用者会发起新的调用
            self.forget(&tx);
            let _ = tx.send(value);
        }
    }

    fn forget(&self, tx: &broadcast::Sender<V>) {
        let mut calls = lock(self.calls);
        if calls.get(self.key).is_some_and(|current| current.same_channel(tx)) {
            calls.remove(self.key);
        }
    }
}

impl<V> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            debug!(key = self.key, "In-flight call dropped before completion");
            self.forget(&tx);
        }
    }
}
