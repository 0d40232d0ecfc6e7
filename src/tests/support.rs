use crate::readiness::{HttpTransport, TransportError};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

/// Transport that replays scripted results, repeating the last one forever.
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<u16, TransportError>>>,
    last: Mutex<Option<Result<u16, TransportError>>>,
    calls: Mutex<u32>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Vec<Result<u16, TransportError>>) -> Self {
        ScriptedTransport {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    pub(crate) fn always(status: u16) -> Self {
        Self::new(vec![Ok(status)])
    }

    pub(crate) fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

impl HttpTransport for ScriptedTransport {
    fn get_status(&self, _url: &str) -> Result<u16, TransportError> {
        *self.calls.lock().unwrap() += 1;
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = Some(next);
        }
        (*last)
            .clone()
            .unwrap_or_else(|| Err(TransportError::new("empty script")))
    }
}

/// Minimal HTTP server answering one connection per scripted status.
pub(crate) struct StatusResponder {
    port: u16,
    handle: JoinHandle<()>,
}

impl StatusResponder {
    pub(crate) fn spawn(statuses: Vec<u16>) -> Self {
        Self::serve(statuses.into_iter().map(|status| (status, None)).collect())
    }

    /// Answers one connection with `302 Found` pointing at `location`.
    pub(crate) fn redirect_to(location: String) -> Self {
        Self::serve(vec![(302, Some(location))])
    }

    fn serve(responses: Vec<(u16, Option<String>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            for (status, location) in responses {
                let (stream, _) = match listener.accept() {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                respond(stream, status, location.as_deref());
            }
        });
        StatusResponder { port, handle }
    }

    /// URL of a local port nobody listens on.
    pub(crate) fn unused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}/subjects", port)
    }

    pub(crate) fn url(&self) -> String {
        format!("http://127.0.0.1:{}/subjects", self.port)
    }

    pub(crate) fn join(self) {
        self.handle.join().unwrap();
    }
}

fn respond(mut stream: TcpStream, status: u16, location: Option<&str>) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let location = location
        .map(|target| format!("Location: {}\r\n", target))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 {} Scripted\r\n{}Content-Length: 0\r\nConnection: close\r\n\r\n",
        status, location
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
