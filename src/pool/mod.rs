//! Пул фиксированного числа воркеров с FIFO-очередью задач.
//!
//! Буфер его не использует: пул нужен вызывающему коду, который
//! сериализует много независимых наборов значений параллельно.

use std::{
    collections::VecDeque,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use thiserror::Error;
use tokio::{sync::Notify, task::JoinHandle};
use tracing::{debug, warn};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("Worker pool is shut down")]
    ShutDown,
}

struct Shared {
    queue: Mutex<VecDeque<Job>>,
    job_ready: Notify,
    idle: Notify,
    /// Задачи в очереди плюс выполняющиеся.
    pending: AtomicUsize,
    shutdown: AtomicBool,
}

pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Запускает `size` воркеров (не меньше одного). Требует рантайм tokio.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            job_ready: Notify::new(),
            idle: Notify::new(),
            pending: AtomicUsize::new(0),
            shutdown: AtomicBool::new(false),
        });
        let workers = (0..size)
            .map(|id| tokio::spawn(worker_loop(id, Arc::clone(&shared))))
            .collect();
        debug!(size, "Worker pool started");
        Self { shared, workers }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Число задач в очереди и в работе.
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    /// Ставит задачу в конец очереди.
    pub fn spawn<F>(
        &self,
        job: F,
    ) -> Result<(), PoolError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.shared.shutdown.load(Ordering::Acquire) {
            return Err(PoolError::ShutDown);
        }
        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        self.shared.queue.lock().push_back(Box::pin(job));
        self.shared.job_ready.notify_one();
        Ok(())
    }

    /// Ждёт, пока очередь опустеет и все задачи завершатся.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Дожидается выполнения очереди и останавливает воркеров.
    pub async fn shutdown(mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.job_ready.notify_waiters();
        for handle in std::mem::take(&mut self.workers) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Worker task ended abnormally");
            }
        }
        debug!("Worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.job_ready.notify_waiters();
    }
}

async fn worker_loop(
    id: usize,
    shared: Arc<Shared>,
) {
    loop {
        let notified = shared.job_ready.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        let job = shared.queue.lock().pop_front();
        match job {
            Some(job) => {
                // Отдельная задача, чтобы паника не убила воркера.
                if let Err(e) = tokio::spawn(job).await {
                    warn!(worker = id, error = %e, "Pool job failed");
                }
                if shared.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                    shared.idle.notify_waiters();
                }
            }
            None if shared.shutdown.load(Ordering::Acquire) => break,
            None => notified.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Тест проверяет выполнение всех задач и ожидание простоя.
    #[tokio::test]
    async fn test_runs_all_jobs() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            pool.spawn(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.wait_idle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 100);
        assert_eq!(pool.pending(), 0);
        pool.shutdown().await;
    }

    /// Тест проверяет порядок FIFO для одного воркера.
    #[tokio::test]
    async fn test_fifo_with_single_worker() {
        let pool = WorkerPool::new(1);
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..10 {
            let order = Arc::clone(&order);
            pool.spawn(async move {
                order.lock().push(i);
            })
            .unwrap();
        }
        pool.wait_idle().await;
        assert_eq!(*order.lock(), (0..10).collect::<Vec<_>>());
        pool.shutdown().await;
    }

    /// Тест проверяет, что shutdown дожидается очереди.
    #[tokio::test]
    async fn test_shutdown_drains_backlog() {
        let pool = WorkerPool::new(2);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            pool.spawn(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.shutdown().await;
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    /// Тест проверяет, что паника в задаче не останавливает пул.
    #[tokio::test]
    async fn test_panicking_job() {
        let pool = WorkerPool::new(1);
        pool.spawn(async { panic!("boom") }).unwrap();
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        pool.spawn(async move { flag.store(true, Ordering::SeqCst) })
            .unwrap();
        pool.wait_idle().await;
        assert!(done.load(Ordering::SeqCst));
        pool.shutdown().await;
    }

    /// Тест проверяет ожидание простоя у пустого пула.
    #[tokio::test]
    async fn test_wait_idle_empty() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.size(), 1);
        pool.wait_idle().await;
        pool.shutdown().await;
    }
}
