//! Execution engine.
//!
//! Runs execution groups serially on the caller, or in parallel: the first
//! group runs inline on the calling task while the remaining groups run on a
//! shared worker pool. Results always come back in group order.

use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;
use fnv::FnvHashMap as HashMap;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::config;

pub mod error;
pub mod group;

pub use error::Error;
pub use group::{group, ConnectionMode, ExecuteGroup, ExecutionUnit};

static ENGINE: OnceCell<ExecuteEngine> = OnceCell::new();

/// Key/value pairs visible to every callback invocation of one call,
/// including those running on pool threads.
#[derive(Debug, Clone, Default)]
pub struct ExecuteContext(Arc<HashMap<String, serde_json::Value>>);

impl ExecuteContext {
    pub fn new(values: HashMap<String, serde_json::Value>) -> Self {
        Self(Arc::new(values))
    }
}

impl Deref for ExecuteContext {
    type Target = HashMap<String, serde_json::Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<(String, serde_json::Value)> for ExecuteContext {
    fn from_iter<T: IntoIterator<Item = (String, serde_json::Value)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Executes the inputs of one group.
#[async_trait]
pub trait ExecuteCallback<I, O>: Send + Sync {
    /// `is_first` is set for the group executed on the caller.
    async fn execute(
        &self,
        inputs: Vec<I>,
        is_first: bool,
        context: &ExecuteContext,
    ) -> Result<Vec<O>, Error>;
}

#[derive(Debug)]
pub struct ExecuteEngine {
    runtime: Mutex<Option<Runtime>>,
}

impl ExecuteEngine {
    /// Start a worker pool with `size` threads.
    pub fn new(size: usize) -> Result<Self, Error> {
        let size = size.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(size)
            .thread_name("shard-exec")
            .enable_all()
            .build()?;

        info!("execution engine started with {} workers", size);

        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
        })
    }

    /// Process-wide engine, sized by `general.executor_size`.
    pub fn global() -> Result<&'static ExecuteEngine, Error> {
        ENGINE.get_or_try_init(|| Self::new(config().general.executor_size))
    }

    /// Stop the worker pool. Tasks still running are abandoned.
    pub fn shutdown(&self) {
        if let Some(runtime) = self.runtime.lock().take() {
            runtime.shutdown_background();
            info!("execution engine shut down");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.runtime.lock().is_none()
    }

    fn handle(&self) -> Result<Handle, Error> {
        self.runtime
            .lock()
            .as_ref()
            .map(|runtime| runtime.handle().clone())
            .ok_or(Error::Shutdown)
    }

    /// Execute all groups, serially or in parallel.
    pub async fn execute<I, O, C>(
        &self,
        groups: Vec<ExecuteGroup<I>>,
        callback: Arc<C>,
        context: ExecuteContext,
        serial: bool,
    ) -> Result<Vec<O>, Error>
    where
        I: Send + 'static,
        O: Send + 'static,
        C: ExecuteCallback<I, O> + 'static,
    {
        if serial {
            self.serial(groups, callback, context).await
        } else {
            self.parallel(groups, callback, context).await
        }
    }

    async fn serial<I, O, C>(
        &self,
        groups: Vec<ExecuteGroup<I>>,
        callback: Arc<C>,
        context: ExecuteContext,
    ) -> Result<Vec<O>, Error>
    where
        C: ExecuteCallback<I, O>,
    {
        if self.is_shutdown() {
            return Err(Error::Shutdown);
        }

        let mut results = vec![];

        for (i, group) in groups.into_iter().enumerate() {
            debug!("executing group {} on \"{}\" [serial]", i, group.data_source);
            results.extend(callback.execute(group.inputs, i == 0, &context).await?);
        }

        Ok(results)
    }

    async fn parallel<I, O, C>(
        &self,
        groups: Vec<ExecuteGroup<I>>,
        callback: Arc<C>,
        context: ExecuteContext,
    ) -> Result<Vec<O>, Error>
    where
        I: Send + 'static,
        O: Send + 'static,
        C: ExecuteCallback<I, O> + 'static,
    {
        let handle = self.handle()?;
        let mut groups = groups.into_iter();

        let Some(first) = groups.next() else {
            return Ok(vec![]);
        };

        let mut tasks: Vec<JoinHandle<Result<Vec<O>, Error>>> = vec![];

        for group in groups {
            let callback = callback.clone();
            let context = context.clone();
            debug!("submitting group on \"{}\"", group.data_source);
            tasks.push(handle.spawn(async move {
                callback.execute(group.inputs, false, &context).await
            }));
        }

        let mut results = match callback.execute(first.inputs, true, &context).await {
            Ok(results) => results,
            Err(err) => {
                abort(&tasks);
                return Err(err);
            }
        };

        for i in 0..tasks.len() {
            match (&mut tasks[i]).await {
                Ok(Ok(outputs)) => results.extend(outputs),
                Ok(Err(err)) => {
                    abort(&tasks[i + 1..]);
                    return Err(err);
                }
                Err(err) => {
                    abort(&tasks[i + 1..]);
                    return Err(err.into());
                }
            }
        }

        Ok(results)
    }
}

fn abort<T>(tasks: &[JoinHandle<T>]) {
    for task in tasks {
        task.abort();
    }
}

impl Drop for ExecuteEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod test;
