use menu_core::{decode_image, DecodedImage, ImageLoader, TextureError, TextureSink};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 4;
const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

type Decoded = (usize, Result<DecodedImage, TextureError>);

#[derive(Debug, Clone, PartialEq)]
enum Source {
    File(PathBuf),
    Url(String),
}

struct Job {
    slot: usize,
    source: Source,
}

/// Loads images on a fixed pool of worker threads: local files are read
/// from disk, `http(s)` sources are fetched with `ureq`. Sinks are not
/// `Send`, so they stay here and are completed from [`FileLoader::pump`]
/// on the event-loop thread.
pub struct FileLoader {
    base_dir: PathBuf,
    pending: HashMap<usize, TextureSink>,
    jobs: Option<Sender<Job>>,
    results: Receiver<Decoded>,
    workers: usize,
}

impl FileLoader {
    /// Relative image paths are resolved against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_workers(base_dir, DEFAULT_WORKERS)
    }

    pub fn with_workers(base_dir: impl Into<PathBuf>, workers: usize) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (result_tx, results) = mpsc::channel();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let agent = ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build();

        let mut spawned_count = 0;
        for id in 0..workers.max(1) {
            let job_rx = Arc::clone(&job_rx);
            let result_tx: Sender<Decoded> = result_tx.clone();
            let agent = agent.clone();
            let spawned = thread::Builder::new()
                .name(format!("image-loader-{id}"))
                .spawn(move || worker_loop(&job_rx, &result_tx, &agent));
            match spawned {
                Ok(_) => spawned_count += 1,
                Err(e) => log::error!("[textures] could not spawn loader worker {id}: {e}"),
            }
        }
        log::info!("[textures] {spawned_count} loader workers");
        Self {
            base_dir: base_dir.into(),
            pending: HashMap::new(),
            // Dropping the queue sender lets idle workers exit.
            jobs: (spawned_count > 0).then_some(job_tx),
            results,
            workers: spawned_count,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Hand finished decodes to the engine. Returns how many landed.
    pub fn pump(&mut self) -> usize {
        let mut landed = 0;
        while let Ok((slot, result)) = self.results.try_recv() {
            let Some(sink) = self.pending.remove(&slot) else {
                continue;
            };
            if sink.complete(result) {
                landed += 1;
            }
        }
        landed
    }

    fn classify(&self, source: &str) -> Source {
        if source.starts_with("http://") || source.starts_with("https://") {
            return Source::Url(source.to_string());
        }
        let path = Path::new(source);
        if path.is_absolute() {
            Source::File(path.to_path_buf())
        } else {
            Source::File(self.base_dir.join(path))
        }
    }
}

fn worker_loop(jobs: &Mutex<Receiver<Job>>, results: &Sender<Decoded>, agent: &ureq::Agent) {
    loop {
        let job = match jobs.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => return,
        };
        let Ok(Job { slot, source }) = job else {
            return;
        };
        let result = load(&source, agent).and_then(|bytes| decode_image(&bytes));
        if results.send((slot, result)).is_err() {
            return;
        }
    }
}

fn load(source: &Source, agent: &ureq::Agent) -> Result<Vec<u8>, TextureError> {
    match source {
        Source::File(path) => {
            std::fs::read(path).map_err(|e| TextureError::Load(format!("{}: {e}", path.display())))
        }
        Source::Url(url) => {
            let resp = agent
                .get(url)
                .call()
                .map_err(|e| TextureError::Load(format!("{url}: {e}")))?;
            let mut bytes = Vec::new();
            resp.into_reader()
                .read_to_end(&mut bytes)
                .map_err(|e| TextureError::Load(format!("{url}: {e}")))?;
            Ok(bytes)
        }
    }
}

impl ImageLoader for FileLoader {
    fn request(&mut self, slot: usize, source: &str, sink: TextureSink) {
        let source = self.classify(source);
        let Some(jobs) = &self.jobs else {
            sink.complete(Err(TextureError::Load("no loader workers".to_string())));
            return;
        };
        log::debug!("[textures] slot {slot} <- {source:?}");
        if jobs.send(Job { slot, source }).is_err() {
            sink.complete(Err(TextureError::Load("loader queue closed".to_string())));
            return;
        }
        self.pending.insert(slot, sink);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use menu_core::{SlotState, TextureTable};
    use std::cell::RefCell;
    use std::io::Write;
    use std::net::TcpListener;
    use std::rc::Rc;
    use std::time::Instant;

    fn pump_until_idle(loader: &mut FileLoader) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while loader.in_flight() > 0 && Instant::now() < deadline {
            loader.pump();
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    /// Answers `requests` HTTP requests with `status` and `body`, then exits.
    fn serve(status: &'static str, body: Vec<u8>, requests: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming().take(requests) {
                let mut stream = stream.unwrap();
                let mut head = [0u8; 1024];
                let _ = stream.read(&mut head);
                let header = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: image/png\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                stream.write_all(header.as_bytes()).unwrap();
                stream.write_all(&body).unwrap();
            }
        });
        format!("http://{addr}")
    }

    fn table(n: usize) -> Rc<RefCell<TextureTable>> {
        Rc::new(RefCell::new(TextureTable::new(n)))
    }

    #[test]
    fn missing_file_marks_slot_failed() {
        let table = table(1);
        let mut loader = FileLoader::new(std::env::temp_dir());
        loader.request(0, "definitely-not-here-7f3a.png", TextureSink::new(&table, 0));
        pump_until_idle(&mut loader);
        assert_eq!(loader.in_flight(), 0);
        assert_eq!(table.borrow().slot_state(0), Some(SlotState::Failed));
    }

    #[test]
    fn remote_image_is_fetched_and_decoded() {
        let base = serve("200 OK", png_bytes(), 1);
        let table = table(1);
        let mut loader = FileLoader::new(".");
        loader.request(0, &format!("{base}/tile.png"), TextureSink::new(&table, 0));
        pump_until_idle(&mut loader);
        assert_eq!(table.borrow().slot_state(0), Some(SlotState::Ready));
        let done = table.borrow_mut().take_completed();
        assert_eq!(done.len(), 1);
        assert_eq!((done[0].1.width, done[0].1.height), (2, 3));
    }

    #[test]
    fn remote_error_status_marks_slot_failed() {
        let base = serve("404 Not Found", Vec::new(), 1);
        let table = table(1);
        let mut loader = FileLoader::new(".");
        loader.request(0, &format!("{base}/gone.png"), TextureSink::new(&table, 0));
        pump_until_idle(&mut loader);
        assert_eq!(loader.in_flight(), 0);
        assert_eq!(table.borrow().slot_state(0), Some(SlotState::Failed));
    }

    #[test]
    fn many_requests_share_a_fixed_pool() {
        let dir = std::env::temp_dir().join(format!("menu-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.png"), png_bytes()).unwrap();

        let n = 64;
        let table = table(n);
        let mut loader = FileLoader::with_workers(&dir, 3);
        assert_eq!(loader.worker_count(), 3);
        for slot in 0..n {
            loader.request(slot, "a.png", TextureSink::new(&table, slot));
        }
        assert_eq!(loader.worker_count(), 3);
        pump_until_idle(&mut loader);
        assert_eq!(table.borrow().ready_count(), n);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sources_are_classified() {
        let loader = FileLoader::with_workers("/srv/gallery", 1);
        assert_eq!(
            loader.classify("a/b.png"),
            Source::File(PathBuf::from("/srv/gallery/a/b.png"))
        );
        assert_eq!(loader.classify("/abs.png"), Source::File(PathBuf::from("/abs.png")));
        assert_eq!(
            loader.classify("https://example.com/x.jpg"),
            Source::Url("https://example.com/x.jpg".to_string())
        );
    }
}
