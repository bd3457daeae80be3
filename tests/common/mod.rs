#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use boxee_cli::client::Transport;
use boxee_cli::commands::Invocation;
use boxee_cli::config::{ConfigStore, StoredConfig, CONFIG_FILE};
use boxee_cli::decode::RawResponse;
use boxee_cli::resolve::{Environment, Overrides};
use boxee_cli::Result;
use reqwest::blocking::Request;
use reqwest::StatusCode;

/// A request as the fake transport saw it, after every editor ran.
#[derive(Debug, Clone)]
pub struct Sent {
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub auth: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// Replays canned responses in order and records every request it is given.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    sent: Mutex<Vec<Sent>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(FakeTransport::default())
    }

    pub fn respond(&self, status: u16, body: serde_json::Value) -> &Self {
        self.responses.lock().unwrap().push_back(RawResponse::new(
            StatusCode::from_u16(status).unwrap(),
            serde_json::to_vec(&body).unwrap(),
        ));
        self
    }

    pub fn respond_raw(&self, status: u16, body: &str) -> &Self {
        self.responses.lock().unwrap().push_back(RawResponse::new(
            StatusCode::from_u16(status).unwrap(),
            body,
        ));
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: Request) -> Result<RawResponse> {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .map(|v| v.to_str().unwrap().to_owned())
        };
        let sent = Sent {
            method: request.method().to_string(),
            url: request.url().to_string(),
            content_type: header("content-type"),
            auth: header("x-boxee-auth"),
            body: request
                .body()
                .and_then(|b| b.as_bytes())
                .map(|b| serde_json::from_slice(b).unwrap()),
        };
        self.sent.lock().unwrap().push(sent);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no canned response left"))
    }
}

pub fn write_config(dir: &Path, config: &StoredConfig) -> PathBuf {
    let path = dir.join(CONFIG_FILE);
    std::fs::write(&path, serde_yaml::to_string(config).unwrap()).unwrap();
    path
}

pub fn read_config(path: &Path) -> StoredConfig {
    serde_yaml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

pub fn stored(address: &str, token: &str) -> StoredConfig {
    StoredConfig {
        email: "me@example.com".into(),
        address: address.into(),
        session_token: token.into(),
    }
}

pub fn invocation(
    path: &Path,
    overrides: Overrides,
    env: Environment,
    transport: &Arc<FakeTransport>,
) -> Invocation {
    Invocation::new(ConfigStore::at(path), env, overrides).with_transport(transport.clone())
}
