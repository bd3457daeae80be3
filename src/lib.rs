// Library root
// -----------
// The `boxee` binary is a thin layer over this crate. Everything that talks
// to the Box-ee service or touches the config file lives here.
//
// Module responsibilities:
// - `config`: the persisted `.box-ee.yaml` store.
// - `resolve`: merges arguments, config, environment and defaults into the
//   configuration for one invocation.
// - `middleware`: request editors (content type, auth header).
// - `client`: the HTTP client and its transport seam.
// - `decode`: status-driven response decoding.
// - `batch`: ordered, failure-isolated batch execution.
// - `api`: typed Box-ee endpoints and payloads.
// - `commands`: one orchestration function per CLI verb.
pub mod api;
pub mod batch;
pub mod client;
pub mod commands;
pub mod config;
pub mod decode;
pub mod error;
pub mod middleware;
pub mod resolve;

pub use error::{Error, ErrorKind, Result};
