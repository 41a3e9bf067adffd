// Byte-counting reader. The transport pulls the request body through it, so
// the bar only moves as fast as the socket accepts data.

use indicatif::ProgressBar;
use std::io::{self, Read};

type OnComplete = Box<dyn FnOnce() + Send + 'static>;

pub struct ProgressReader<R> {
    inner: R,
    total: u64,
    read: u64,
    bar: ProgressBar,
    on_complete: Option<OnComplete>,
    finished: bool,
}

impl<R: Read> ProgressReader<R> {
    /// Wrap `inner`, which is expected to yield exactly `total` bytes. The
    /// bar's length is set to `total`.
    pub fn new(inner: R, total: u64, bar: ProgressBar) -> Self {
        bar.set_length(total);
        bar.set_position(0);
        ProgressReader {
            inner,
            total,
            read: 0,
            bar,
            on_complete: None,
            finished: false,
        }
    }

    /// Callback fired once, when the counter reaches the total.
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn bytes_read(&self) -> u64 {
        self.read
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    fn complete(&mut self) {
        if let Some(f) = self.on_complete.take() {
            f();
        }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.finished {
            return Ok(0);
        }
        let n = match self.inner.read(buf) {
            Ok(n) => n,
            Err(e) => {
                self.finished = true;
                return Err(e);
            }
        };
        self.read += n as u64;
        self.bar.inc(n as u64);
        if self.read >= self.total {
            self.complete();
        }
        if n == 0 && !buf.is_empty() {
            self.finished = true;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "socket closed"))
        }
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let calls = Arc::new(AtomicUsize::new(0));
        let hook = Arc::clone(&calls);
        (calls, move || {
            hook.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn counts_every_byte_and_completes_once() {
        let data = vec![7u8; 10_000];
        let (calls, hook) = counter();
        let mut reader =
            ProgressReader::new(Cursor::new(data.clone()), 10_000, ProgressBar::hidden())
                .on_complete(hook);

        let mut chunk = [0u8; 999];
        let mut out = Vec::new();
        loop {
            let n = reader.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            if reader.bytes_read() < 10_000 {
                assert_eq!(calls.load(Ordering::SeqCst), 0);
            }
            out.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(reader.read(&mut chunk).unwrap(), 0);

        assert_eq!(out, data);
        assert_eq!(reader.bytes_read(), 10_000);
        assert_eq!(reader.bar().position(), 10_000);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_source_completes_on_eof() {
        let (calls, hook) = counter();
        let mut reader =
            ProgressReader::new(Cursor::new(Vec::new()), 0, ProgressBar::hidden()).on_complete(hook);
        let mut buf = [0u8; 16];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn errors_propagate_and_stop_progress() {
        let (calls, hook) = counter();
        let mut reader = ProgressReader::new(Failing, 100, ProgressBar::hidden()).on_complete(hook);
        let mut buf = [0u8; 16];
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.bytes_read(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
