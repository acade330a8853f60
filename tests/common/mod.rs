//! Shared helpers for integration tests
#![allow(dead_code)]

use filter_studio::{BackgroundRemovalProvider, BackgroundTarget, RasterBuffer, Result};
use image::{Rgb, RgbImage};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Deterministic color pattern with edges and gradients
pub fn sample_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if (width / 3..2 * width / 3).contains(&x) && (height / 4..3 * height / 4).contains(&y) {
            Rgb([230, 40, 40])
        } else {
            Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 90])
        }
    })
}

pub fn sample_buffer(width: u32, height: u32) -> RasterBuffer {
    RasterBuffer::Color(sample_image(width, height))
}

/// Provider that returns its input untouched and records each target it receives
#[derive(Debug, Default)]
pub struct PassthroughProvider {
    targets: Arc<Mutex<Vec<BackgroundTarget>>>,
}

impl PassthroughProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the received targets, usable after the provider is boxed
    pub fn targets(&self) -> Arc<Mutex<Vec<BackgroundTarget>>> {
        Arc::clone(&self.targets)
    }
}

impl BackgroundRemovalProvider for PassthroughProvider {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn supports_transparency(&self) -> bool {
        false
    }

    fn remove_background(&self, image: &RgbImage, target: &BackgroundTarget) -> Result<RasterBuffer> {
        self.targets.lock().unwrap().push(*target);
        Ok(RasterBuffer::Color(image.clone()))
    }
}

/// A request captured by [`FakeServer`]
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    /// Header lines, lowercased
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.headers
            .iter()
            .find_map(|line| line.strip_prefix(prefix.as_str()))
            .map(|value| value.trim().to_string())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One-shot HTTP server answering a single request with a canned response
pub struct FakeServer {
    pub url: String,
    handle: JoinHandle<()>,
    requests: mpsc::Receiver<CapturedRequest>,
}

impl FakeServer {
    pub fn respond(status: u16, reason: &str, content_type: &str, body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1.0/removebg", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        let status_line = format!("HTTP/1.1 {} {}", status, reason);
        let content_type = content_type.to_string();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&stream);
            let _ = tx.send(request);

            let head = format!(
                "{}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status_line,
                content_type,
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();
        });

        Self {
            url,
            handle,
            requests: rx,
        }
    }

    /// Wait for the server thread and return the request it saw
    pub fn finish(self) -> CapturedRequest {
        self.handle.join().unwrap();
        self.requests.recv().unwrap()
    }
}

fn read_request(stream: &TcpStream) -> CapturedRequest {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end().to_string();
        if line.is_empty() {
            break;
        }
        headers.push(line.to_ascii_lowercase());
    }

    let content_length = headers
        .iter()
        .find_map(|h| h.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok());
    let chunked = headers
        .iter()
        .any(|h| h.starts_with("transfer-encoding:") && h.contains("chunked"));

    let mut body = Vec::new();
    if let Some(len) = content_length {
        body.resize(len, 0);
        reader.read_exact(&mut body).unwrap();
    } else if chunked {
        loop {
            let mut size_line = String::new();
            reader.read_line(&mut size_line).unwrap();
            let size = usize::from_str_radix(size_line.trim(), 16).unwrap();
            let mut chunk = vec![0; size + 2];
            reader.read_exact(&mut chunk).unwrap();
            if size == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..size]);
        }
    }

    CapturedRequest {
        request_line: request_line.trim_end().to_string(),
        headers,
        body,
    }
}
