use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub struct BrokerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl BrokerHandle {
    /// Raw request texts received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Drop for BrokerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Builds a full HTTP response wrapping an STS-style HTML page.
pub fn html_page(title: &str, body: Option<&str>) -> String {
    let body_part = body
        .map(|text| format!("<body>{text}</body>"))
        .unwrap_or_default();
    let page = format!("<html><title>{title}</title>{body_part}</html>");
    format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{page}",
        page.len()
    )
}

/// Spawn a scripted broker for tests; each connection consumes the next
/// response in `responses`.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_broker(responses: Vec<String>) -> Result<(String, BrokerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test broker failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("broker addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    let script = Arc::new(Mutex::new(VecDeque::from(responses)));

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let response = script
                        .lock()
                        .ok()
                        .and_then(|mut queue| queue.pop_front())
                        .unwrap_or_else(|| {
                            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                                .to_owned()
                        });
                    let seen = Arc::clone(&seen);
                    thread::spawn(move || handle_client(stream, &response, &seen));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        addr.to_string(),
        BrokerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
            requests,
        },
    ))
}

fn handle_client(mut stream: TcpStream, response: &str, seen: &Arc<Mutex<Vec<String>>>) {
    drop(stream.set_read_timeout(Some(Duration::from_secs(2))));
    let mut request = Vec::new();
    let mut buffer = [0u8; 1024];
    loop {
        match stream.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => {
                request.extend_from_slice(&buffer[..read]);
                if request_complete(&request) {
                    break;
                }
            }
            Err(_) => break,
        }
    }

    let text = String::from_utf8_lossy(&request).into_owned();
    if let Ok(mut requests) = seen.lock() {
        requests.push(text);
    }

    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);
    request.len() >= header_end + 4 + content_length
}
