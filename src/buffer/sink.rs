use bytes::Bytes;

/// Получатель байтов, накопленных буфером к моменту `flush`.
pub trait FlushSink: Send {
    fn consume(
        &mut self,
        bytes: Bytes,
    );
}

impl<F> FlushSink for F
where
    F: FnMut(Bytes) + Send,
{
    fn consume(
        &mut self,
        bytes: Bytes,
    ) {
        self(bytes)
    }
}

/// Приёмник, собирающий все сброшенные блоки. Удобен в тестах и CLI.
#[derive(Debug, Default, Clone)]
pub struct CollectSink {
    chunks: std::sync::Arc<parking_lot::Mutex<Vec<Bytes>>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Снимок полученных блоков.
    pub fn chunks(&self) -> Vec<Bytes> {
        self.chunks.lock().clone()
    }

    pub fn total_len(&self) -> usize {
        self.chunks.lock().iter().map(Bytes::len).sum()
    }
}

impl FlushSink for CollectSink {
    fn consume(
        &mut self,
        bytes: Bytes,
    ) {
        self.chunks.lock().push(bytes);
    }
}
