use std::sync::mpsc;

#[derive(Debug)]
pub enum WorkerPoll<T> {
    Pending,
    Ready(T),
    /// The worker thread ended without sending a result (it panicked).
    Lost,
}

/// Receiving end of a job running on its own thread.
#[derive(Debug)]
pub struct WorkerHandle<T> {
    rx: mpsc::Receiver<T>,
}

pub fn spawn_worker<T, W>(work: W) -> WorkerHandle<T>
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<T>();
    std::thread::spawn(move || {
        let result = work();
        let _ = tx.send(result);
    });
    WorkerHandle { rx }
}

impl<T> WorkerHandle<T> {
    pub fn try_take(&self) -> WorkerPoll<T> {
        match self.rx.try_recv() {
            Ok(result) => WorkerPoll::Ready(result),
            Err(mpsc::TryRecvError::Empty) => WorkerPoll::Pending,
            Err(mpsc::TryRecvError::Disconnected) => WorkerPoll::Lost,
        }
    }

    /// Blocks until the job finishes. `None` when the worker died first.
    pub fn wait(&self) -> Option<T> {
        self.rx.recv().ok()
    }
}
