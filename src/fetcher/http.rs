//! HTTP(S) endpoint source.

use reqwest::blocking::Client;

use crate::config::{Auth, EndpointConfig};

use super::{Document, FetchError, Source};

/// Polls a URL with GET and parses the body as JSON.
///
/// The client carries the endpoint timeout, so a hung server surfaces as
/// [`FetchError::Timeout`] after at most that long.
pub struct HttpSource {
    url: String,
    client: Client,
    headers: Vec<(String, String)>,
    auth: Option<Auth>,
}

impl HttpSource {
    pub fn new(url: &str, endpoint: &EndpointConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(endpoint.timeout)
            .user_agent(concat!("sparkmon/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(classify)?;
        Ok(Self {
            url: url.to_string(),
            client,
            headers: endpoint.headers.clone(),
            auth: endpoint.auth.clone(),
        })
    }
}

impl Source for HttpSource {
    fn fetch(&mut self) -> Result<Document, FetchError> {
        let mut request = self.client.get(&self.url);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = match &self.auth {
            Some(Auth::Basic(basic)) => request.basic_auth(&basic.username, basic.password.as_ref()),
            Some(Auth::Bearer(token)) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.bytes().map_err(classify)?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BasicAuth, SourceKind};
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn endpoint(url: &str) -> EndpointConfig {
        let mut endpoint = EndpointConfig::new(SourceKind::Http(url.to_string()), Vec::new());
        endpoint.timeout = Duration::from_millis(300);
        endpoint
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&chunk[..n]),
            }
        }
        String::from_utf8_lossy(&request).into_owned()
    }

    /// Serves one canned response and reports the request it got.
    fn serve_once(response: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/debug/vars", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let request = read_request(&mut stream);
                let _ = stream.write_all(response.as_bytes());
                let _ = tx.send(request);
            }
        });
        (url, rx)
    }

    #[test]
    fn test_fetch_parses_json_and_sends_headers() {
        let (url, requests) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 10\r\nConnection: close\r\n\r\n{\"heap\":1}",
        );
        let mut endpoint = endpoint(&url);
        endpoint.headers = vec![("X-Env".into(), "prod".into())];
        endpoint.auth = Some(Auth::Bearer("secret".into()));

        let mut source = HttpSource::new(&url, &endpoint).unwrap();
        assert_eq!(source.fetch(), Ok(json!({"heap": 1})));

        let request = requests
            .recv_timeout(Duration::from_secs(5))
            .unwrap()
            .to_lowercase();
        assert!(request.starts_with("get /debug/vars "));
        assert!(request.contains("x-env: prod"));
        assert!(request.contains("authorization: bearer secret"));
        assert!(request.contains("user-agent: sparkmon/"));
    }

    #[test]
    fn test_basic_auth_header() {
        let (url, requests) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
        );
        let mut endpoint = endpoint(&url);
        endpoint.auth = Some(Auth::Basic(BasicAuth {
            username: "u".into(),
            password: Some("p".into()),
        }));

        let mut source = HttpSource::new(&url, &endpoint).unwrap();
        assert_eq!(source.fetch(), Ok(json!({})));
        let request = requests.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(request.to_lowercase().contains("authorization: basic dtpw"));
    }

    #[test]
    fn test_non_success_status() {
        let (url, _requests) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let mut source = HttpSource::new(&url, &endpoint(&url)).unwrap();
        assert_eq!(source.fetch(), Err(FetchError::Status(503)));
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let (url, _requests) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        );
        let mut source = HttpSource::new(&url, &endpoint(&url)).unwrap();
        assert!(matches!(source.fetch(), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_hung_server_times_out() {
        // Connections queue in the backlog but are never answered.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/debug/vars", listener.local_addr().unwrap());
        let mut source = HttpSource::new(&url, &endpoint(&url)).unwrap();

        let started = Instant::now();
        assert_eq!(source.fetch(), Err(FetchError::Timeout));
        assert!(started.elapsed() < Duration::from_secs(3));
        drop(listener);
    }

    #[test]
    fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/debug/vars", listener.local_addr().unwrap());
        drop(listener);

        let mut source = HttpSource::new(&url, &endpoint(&url)).unwrap();
        assert!(matches!(source.fetch(), Err(FetchError::Network(_))));
    }
}
